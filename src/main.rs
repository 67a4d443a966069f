use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::Rng;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph,
    Wrap,
};

use ipl_terminal::engine::spawn_compute_worker;
use ipl_terminal::export;
use ipl_terminal::predictor::HeuristicModel;
use ipl_terminal::reference::{
    DEFAULT_BATTING_COLOR, DEFAULT_BOWLING_COLOR, TEAMS, VENUES, next_in_catalog, team_abbr,
    team_color,
};
use ipl_terminal::state::{self, AppState, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    dark: bool,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
            dark: true,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '0'..='6') => {
                let runs = c.to_digit(10).unwrap_or(0);
                self.state.match_state.record_ball(runs);
                self.state.submit_recompute();
            }
            KeyCode::Char('x') => {
                self.state.match_state.record_wicket();
                self.state.submit_recompute();
            }
            KeyCode::Char('t') => {
                let next = next_in_catalog(&TEAMS, self.state.match_state.batting_team());
                self.state.match_state.set_batting_team(next);
                self.state.submit_recompute();
            }
            KeyCode::Char('T') => {
                let next = next_in_catalog(&TEAMS, self.state.match_state.bowling_team());
                self.state.match_state.set_bowling_team(next);
                self.state.submit_recompute();
            }
            KeyCode::Char('v') => {
                let next = next_in_catalog(&VENUES, self.state.match_state.venue());
                self.state.match_state.set_venue(next);
                self.state.submit_recompute();
            }
            KeyCode::Char('n') => {
                self.state.match_state.toggle_innings();
                self.state.submit_recompute();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let score = self.state.match_state.current_score();
                self.state.match_state.set_current_score(score.saturating_add(1));
                self.state.submit_recompute();
            }
            KeyCode::Char('-') => {
                let score = self.state.match_state.current_score();
                self.state.match_state.set_current_score(score.saturating_sub(1));
                self.state.submit_recompute();
            }
            KeyCode::Char('w') => {
                let wickets = self.state.match_state.wickets();
                self.state.match_state.set_wickets(wickets.saturating_add(1));
                self.state.submit_recompute();
            }
            KeyCode::Char('W') => {
                let wickets = self.state.match_state.wickets();
                self.state.match_state.set_wickets(wickets.saturating_sub(1));
                self.state.submit_recompute();
            }
            KeyCode::Char('o') | KeyCode::Right => {
                let over = self.state.match_state.current_over();
                self.state.match_state.set_current_over(over + 0.1);
                self.state.submit_recompute();
            }
            KeyCode::Char('O') | KeyCode::Left => {
                let over = self.state.match_state.current_over();
                self.state.match_state.set_current_over(over - 0.1);
                self.state.submit_recompute();
            }
            KeyCode::Char('d') => self.dark = !self.dark,
            KeyCode::Char('e') => match export::export_snapshot(&self.state) {
                Ok(path) => self.state.push_log(format!("[INFO] Exported {path}")),
                Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
            },
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let base_seed = std::env::var("PREDICT_SEED")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or_else(|| rand::thread_rng().r#gen());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (delta_tx, delta_rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_compute_worker(delta_tx, cmd_rx, Box::new(HeuristicModel));

    let mut app = App::new(AppState::new(cmd_tx, base_seed));
    app.state.submit_recompute();
    let res = run_app(&mut terminal, &mut app, delta_rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta, now);
        }
        app.state.celebration.tick(now);

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

struct Theme {
    fg: Color,
    dim: Color,
    accent: Color,
}

fn theme(dark: bool) -> Theme {
    if dark {
        Theme {
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
        }
    } else {
        Theme {
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let th = theme(app.dark);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_header(frame, app, &th, chunks[0]);
    render_status_row(frame, app, &th, chunks[1]);
    render_charts_row(frame, app, &th, chunks[2]);
    render_bottom_row(frame, app, &th, chunks[3]);
    render_footer(frame, &th, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, th: &Theme, area: Rect) {
    let now = Instant::now();
    let title = if app.state.celebration.is_active(now) {
        Line::from(vec![
            Span::styled(
                " IPL SCORE PREDICTOR ",
                Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  *** UPSET WATCH ***  ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::RAPID_BLINK),
            ),
        ])
    } else {
        Line::from(Span::styled(
            " IPL SCORE PREDICTOR ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ))
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let ms = &app.state.match_state;
    let text = Line::from(vec![
        Span::styled(
            format!(" {} ", ms.batting_team()),
            Style::default()
                .fg(team_color(ms.batting_team(), DEFAULT_BATTING_COLOR))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("vs", Style::default().fg(th.dim)),
        Span::styled(
            format!(" {} ", ms.bowling_team()),
            Style::default().fg(team_color(ms.bowling_team(), DEFAULT_BOWLING_COLOR)),
        ),
        Span::styled(
            format!("| {} | innings {} ", ms.venue(), ms.innings()),
            Style::default().fg(th.dim),
        ),
    ]);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_status_row(frame: &mut Frame, app: &App, th: &Theme, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(26),
            Constraint::Percentage(40),
        ])
        .split(area);

    let ms = &app.state.match_state;
    let facts = vec![
        Line::from(format!("Score   {}/{}", ms.current_score(), ms.wickets())),
        Line::from(format!("Over    {:.1} / 20", ms.current_over())),
        Line::from(format!(
            "Rate    {}",
            if ms.current_over() > 0.0 {
                format!("{:.2}", f64::from(ms.current_score()) / ms.current_over())
            } else {
                "--".to_string()
            }
        )),
        Line::from(format!(
            "Pending recompute: {}",
            if app.state.engine.in_flight() { "yes" } else { "no" }
        )),
    ];
    frame.render_widget(
        Paragraph::new(facts)
            .style(Style::default().fg(th.fg))
            .block(Block::default().borders(Borders::ALL).title(" Live ")),
        cols[0],
    );

    let prediction_text = if app.state.engine.in_flight() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "calculating...",
                Style::default().fg(th.dim).add_modifier(Modifier::ITALIC),
            )),
        ]
    } else if let Some(p) = app.state.engine.committed() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{}/{}", p.projected_score, p.projected_wickets),
                Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("req. rate {:.2}", f64::from(p.projected_score) / 20.0),
                Style::default().fg(th.dim),
            )),
        ]
    } else {
        vec![Line::from(""), Line::from("--")]
    };
    frame.render_widget(
        Paragraph::new(prediction_text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Projected final ")),
        cols[1],
    );

    let (label, ratio) = match app.state.engine.committed() {
        Some(p) => (
            format!(
                "{} {}%  /  {} {}%",
                team_abbr(ms.batting_team()),
                p.win_probability,
                team_abbr(ms.bowling_team()),
                100 - p.win_probability
            ),
            f64::from(p.win_probability) / 100.0,
        ),
        None => ("no prediction yet".to_string(), 0.0),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Win probability "))
        .gauge_style(Style::default().fg(team_color(ms.batting_team(), DEFAULT_BATTING_COLOR)))
        .label(label)
        .ratio(ratio);
    frame.render_widget(gauge, cols[2]);
}

fn render_charts_row(frame: &mut Frame, app: &App, th: &Theme, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_trend_chart(frame, app, th, cols[0]);
    render_run_rate_chart(frame, app, th, cols[1]);
}

fn render_trend_chart(frame: &mut Frame, app: &App, th: &Theme, area: Rect) {
    let ms = &app.state.match_state;
    let points = app.state.trend.points();
    let batting: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.index as f64, f64::from(p.batting_share)))
        .collect();
    let bowling: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (p.index as f64, f64::from(p.bowling_share)))
        .collect();

    let (x_min, x_max) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.index as f64, (last.index as f64).max(1.0)),
        _ => (0.0, 1.0),
    };

    let batting_name = team_abbr(ms.batting_team());
    let bowling_name = team_abbr(ms.bowling_team());
    let datasets = vec![
        Dataset::default()
            .name(batting_name)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(team_color(ms.batting_team(), DEFAULT_BATTING_COLOR)))
            .data(&batting),
        Dataset::default()
            .name(bowling_name)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(team_color(ms.bowling_team(), DEFAULT_BOWLING_COLOR)))
            .data(&bowling),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Win probability trend "))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(th.dim))
                .bounds([x_min, x_max]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(th.dim))
                .bounds([0.0, 100.0])
                .labels(vec!["0".into(), "50".into(), "100".into()]),
        );
    frame.render_widget(chart, area);
}

fn render_run_rate_chart(frame: &mut Frame, app: &App, th: &Theme, area: Rect) {
    let points = app.state.run_rate.points();
    let data: Vec<(f64, f64)> = points.iter().map(|p| (p.over, p.run_rate)).collect();
    let y_max = points
        .iter()
        .map(|p| p.run_rate)
        .fold(8.0_f64, f64::max)
        .ceil();

    let datasets = vec![
        Dataset::default()
            .name("run rate")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Rgb(0xFF, 0x73, 0x00)))
            .data(&data),
    ];
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Run rate "))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(th.dim))
                .bounds([0.0, state::TOTAL_OVERS])
                .labels(vec!["0".into(), "10".into(), "20".into()]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(th.dim))
                .bounds([0.0, y_max])
                .labels(vec!["0".into(), format!("{y_max:.0}").into()]),
        );
    frame.render_widget(chart, area);
}

fn render_bottom_row(frame: &mut Frame, app: &App, th: &Theme, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(36),
            Constraint::Percentage(36),
        ])
        .split(area);

    let balls = app.state.match_state.recent_balls();
    let bars: Vec<Bar> = balls
        .iter()
        .map(|runs| {
            Bar::default()
                .value(u64::from(*runs))
                .style(Style::default().fg(if *runs >= 4 { th.accent } else { th.dim }))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Recent balls "))
        .bar_width(3)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
        .max(6);
    frame.render_widget(chart, cols[0]);

    let insights: Vec<Line> = match app.state.engine.committed() {
        Some(p) => state::insight_lines(&app.state.match_state, &p)
            .into_iter()
            .map(|text| Line::from(Span::styled(text, Style::default().fg(th.fg))))
            .collect(),
        None => vec![Line::from(Span::styled(
            "No prediction committed yet.",
            Style::default().fg(th.dim),
        ))],
    };
    frame.render_widget(
        Paragraph::new(insights)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Insights ")),
        cols[1],
    );

    let lines: Vec<Line> = app
        .state
        .logs
        .iter()
        .rev()
        .take(cols[2].height.saturating_sub(2) as usize)
        .rev()
        .map(|msg| Line::from(Span::styled(msg.clone(), Style::default().fg(th.dim))))
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Console ")),
        cols[2],
    );
}

fn render_footer(frame: &mut Frame, th: &Theme, area: Rect) {
    let hints = "0-6 ball  x wicket  +/- score  w/W wickets  o/O over  t/T teams  v venue  n innings  e export  d theme  q quit";
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hints, Style::default().fg(th.dim)))),
        area,
    );
}
