use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::state::{AppState, Prediction};
use crate::trend::{RunRatePoint, TrendPoint};

#[derive(Serialize)]
struct ExportPayload<'a> {
    exported_at: String,
    batting_team: &'a str,
    bowling_team: &'a str,
    venue: &'a str,
    innings: u8,
    current_over: f64,
    current_score: u32,
    wickets: u8,
    prediction: Option<Prediction>,
    win_trend: Vec<TrendPoint>,
    run_rate: Vec<RunRatePoint>,
}

/// Write the current prediction and both trend series to a timestamped JSON
/// file next to the binary. Returns the path written.
pub fn export_snapshot(state: &AppState) -> Result<String> {
    let path = format!(
        "prediction-{}.json",
        Local::now().format("%Y%m%d-%H%M%S")
    );
    export_snapshot_to(state, &path)?;
    Ok(path)
}

pub fn export_snapshot_to(state: &AppState, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let payload = ExportPayload {
        exported_at: Local::now().to_rfc3339(),
        batting_team: state.match_state.batting_team(),
        bowling_team: state.match_state.bowling_team(),
        venue: state.match_state.venue(),
        innings: state.match_state.innings(),
        current_over: state.match_state.current_over(),
        current_score: state.match_state.current_score(),
        wickets: state.match_state.wickets(),
        prediction: state.engine.committed(),
        win_trend: state.trend.points(),
        run_rate: state.run_rate.points(),
    };
    let json = serde_json::to_string_pretty(&payload).context("serialize export payload")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Instant;

    use crate::state::{Delta, apply_delta};

    #[test]
    fn export_round_trips_committed_data() {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let mut state = AppState::new(cmd_tx, 7);
        state.submit_recompute();
        let snapshot = state.match_state.snapshot();
        apply_delta(
            &mut state,
            Delta::PredictionReady {
                generation: 1,
                prediction: Prediction {
                    projected_score: 156,
                    projected_wickets: 5,
                    win_probability: 58,
                },
                snapshot,
            },
            Instant::now(),
        );

        let dir = std::env::temp_dir().join("ipl_terminal_export_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");
        export_snapshot_to(&state, &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["prediction"]["projected_score"], 156);
        assert_eq!(value["win_trend"][0]["batting_share"], 58);
        assert_eq!(value["batting_team"], "Mumbai Indians");
        fs::remove_file(&path).ok();
    }
}
