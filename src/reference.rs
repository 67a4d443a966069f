use std::collections::HashMap;

use once_cell::sync::Lazy;
use ratatui::style::Color;

pub const TEAMS: [&str; 10] = [
    "Mumbai Indians",
    "Chennai Super Kings",
    "Royal Challengers Bangalore",
    "Kolkata Knight Riders",
    "Delhi Capitals",
    "Punjab Kings",
    "Rajasthan Royals",
    "Sunrisers Hyderabad",
    "Gujarat Titans",
    "Lucknow Super Giants",
];

pub const VENUES: [&str; 10] = [
    "Wankhede Stadium",
    "M. A. Chidambaram Stadium",
    "Eden Gardens",
    "Arun Jaitley Stadium",
    "Narendra Modi Stadium",
    "Rajiv Gandhi International Cricket Stadium",
    "M. Chinnaswamy Stadium",
    "Punjab Cricket Association Stadium",
    "Sawai Mansingh Stadium",
    "Dr. Y.S. Rajasekhara Reddy ACA-VDCA Cricket Stadium",
];

pub const DEFAULT_BATTING_COLOR: Color = Color::Rgb(0x00, 0x88, 0xFE);
pub const DEFAULT_BOWLING_COLOR: Color = Color::Rgb(0xFF, 0x80, 0x42);

static TEAM_COLORS: Lazy<HashMap<&'static str, Color>> = Lazy::new(|| {
    HashMap::from([
        ("Mumbai Indians", Color::Rgb(0x00, 0x4B, 0xA0)),
        ("Chennai Super Kings", Color::Rgb(0xFF, 0xFF, 0x00)),
        ("Royal Challengers Bangalore", Color::Rgb(0xEC, 0x1C, 0x24)),
        ("Kolkata Knight Riders", Color::Rgb(0x3A, 0x22, 0x5D)),
        ("Delhi Capitals", Color::Rgb(0x00, 0x00, 0x8B)),
        ("Punjab Kings", Color::Rgb(0xED, 0x1C, 0x24)),
        ("Rajasthan Royals", Color::Rgb(0xFF, 0x14, 0x93)),
        ("Sunrisers Hyderabad", Color::Rgb(0xFF, 0x82, 0x2A)),
        ("Gujarat Titans", Color::Rgb(0x10, 0x34, 0xA6)),
        ("Lucknow Super Giants", Color::Rgb(0xA0, 0xE6, 0xFF)),
    ])
});

/// Display color for a team, falling back when the identifier is not in the
/// catalog. Unknown teams are not an error anywhere in this crate.
pub fn team_color(name: &str, fallback: Color) -> Color {
    TEAM_COLORS.get(name).copied().unwrap_or(fallback)
}

pub fn team_abbr(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.len() <= 3 {
        return trimmed.to_uppercase();
    }
    let mut abbr = String::new();
    for part in trimmed.split_whitespace() {
        if let Some(ch) = part.chars().next() {
            abbr.push(ch);
        }
        if abbr.len() >= 3 {
            break;
        }
    }
    if abbr.len() >= 2 {
        return abbr.to_uppercase();
    }
    trimmed.chars().take(3).collect::<String>().to_uppercase()
}

/// Next catalog entry after `current`, wrapping around. Unknown identifiers
/// restart at the first entry.
pub fn next_in_catalog<'a>(catalog: &[&'a str], current: &str) -> &'a str {
    let idx = catalog.iter().position(|name| *name == current);
    match idx {
        Some(i) => catalog[(i + 1) % catalog.len()],
        None => catalog[0],
    }
}
