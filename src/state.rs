use std::collections::VecDeque;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::celebrate::CelebrationScheduler;
use crate::engine::PredictionEngine;
use crate::trend::{RunRateSeries, TrendSeries};

pub const TOTAL_OVERS: f64 = 20.0;
pub const MAX_WICKETS: u8 = 10;
pub const RECENT_BALL_WINDOW: usize = 8;

const BALL_FRACTION: f64 = 1.0 / 6.0;

/// Authoritative live match facts. Single writer (the input layer); the
/// engine only reads it, and only at submission time.
///
/// Fields are private so every mutation goes through a clamping setter;
/// out-of-range input is absorbed, never surfaced as an error.
#[derive(Debug, Clone)]
pub struct MatchState {
    batting_team: String,
    bowling_team: String,
    venue: String,
    innings: u8,
    current_over: f64,
    current_score: u32,
    wickets: u8,
    recent_balls: VecDeque<u32>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            batting_team: "Mumbai Indians".to_string(),
            bowling_team: "Chennai Super Kings".to_string(),
            venue: "Wankhede Stadium".to_string(),
            innings: 1,
            current_over: 8.2,
            current_score: 72,
            wickets: 2,
            recent_balls: VecDeque::from([6, 4, 1, 0, 2, 1, 4]),
        }
    }

    pub fn batting_team(&self) -> &str {
        &self.batting_team
    }

    pub fn bowling_team(&self) -> &str {
        &self.bowling_team
    }

    pub fn venue(&self) -> &str {
        &self.venue
    }

    pub fn innings(&self) -> u8 {
        self.innings
    }

    pub fn current_over(&self) -> f64 {
        self.current_over
    }

    pub fn current_score(&self) -> u32 {
        self.current_score
    }

    pub fn wickets(&self) -> u8 {
        self.wickets
    }

    pub fn recent_balls(&self) -> Vec<u32> {
        self.recent_balls.iter().copied().collect()
    }

    /// Batting and bowling sides stay distinct: assigning one side the team
    /// currently held by the other swaps the two.
    pub fn set_batting_team(&mut self, name: &str) {
        if name == self.bowling_team {
            std::mem::swap(&mut self.batting_team, &mut self.bowling_team);
            return;
        }
        self.batting_team = name.to_string();
    }

    pub fn set_bowling_team(&mut self, name: &str) {
        if name == self.batting_team {
            std::mem::swap(&mut self.batting_team, &mut self.bowling_team);
            return;
        }
        self.bowling_team = name.to_string();
    }

    pub fn set_venue(&mut self, name: &str) {
        self.venue = name.to_string();
    }

    pub fn set_innings(&mut self, innings: u8) {
        self.innings = innings.clamp(1, 2);
    }

    pub fn toggle_innings(&mut self) {
        self.innings = if self.innings == 1 { 2 } else { 1 };
    }

    pub fn set_current_over(&mut self, over: f64) {
        if !over.is_finite() {
            return;
        }
        self.current_over = over.clamp(0.0, TOTAL_OVERS);
    }

    pub fn set_current_score(&mut self, score: u32) {
        self.current_score = score;
    }

    pub fn set_wickets(&mut self, wickets: u8) {
        self.wickets = wickets.min(MAX_WICKETS);
    }

    /// Score one delivery: add runs, advance the over, push into the recent
    /// window.
    pub fn record_ball(&mut self, runs: u32) {
        let runs = runs.min(6);
        self.current_score = self.current_score.saturating_add(runs);
        self.push_recent(runs);
        self.advance_ball();
    }

    /// A wicket delivery counts as a dot ball in the recent window.
    pub fn record_wicket(&mut self) {
        if self.wickets < MAX_WICKETS {
            self.wickets += 1;
        }
        self.push_recent(0);
        self.advance_ball();
    }

    /// Owned copy of the facts the scoring model consumes. Later mutation of
    /// this state does not affect a computation already submitted.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            batting_team: self.batting_team.clone(),
            bowling_team: self.bowling_team.clone(),
            innings: self.innings,
            current_over: self.current_over,
            current_score: self.current_score,
            wickets: self.wickets,
        }
    }

    fn advance_ball(&mut self) {
        self.current_over = (self.current_over + BALL_FRACTION).min(TOTAL_OVERS);
    }

    fn push_recent(&mut self, runs: u32) {
        self.recent_balls.push_back(runs);
        while self.recent_balls.len() > RECENT_BALL_WINDOW {
            self.recent_balls.pop_front();
        }
    }
}

/// Inputs of one recompute, frozen at submission time.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    pub batting_team: String,
    pub bowling_team: String,
    pub innings: u8,
    pub current_over: f64,
    pub current_score: u32,
    pub wickets: u8,
}

/// One committed projection. Immutable once produced; `win_probability` is
/// the batting side's percentage, the bowling side holds the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub projected_score: u32,
    pub projected_wickets: u8,
    pub win_probability: u8,
}

#[derive(Debug, Clone)]
pub enum ComputeCommand {
    Recompute {
        generation: u64,
        seed: u64,
        snapshot: MatchSnapshot,
    },
}

#[derive(Debug, Clone)]
pub enum Delta {
    PredictionReady {
        generation: u64,
        prediction: Prediction,
        snapshot: MatchSnapshot,
    },
    Log(String),
}

#[derive(Debug)]
pub struct AppState {
    pub match_state: MatchState,
    pub engine: PredictionEngine,
    pub trend: TrendSeries,
    pub run_rate: RunRateSeries,
    pub celebration: CelebrationScheduler,
    pub rng: StdRng,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new(cmd_tx: std::sync::mpsc::Sender<ComputeCommand>, base_seed: u64) -> Self {
        Self {
            match_state: MatchState::new(),
            engine: PredictionEngine::new(cmd_tx, base_seed),
            trend: TrendSeries::from_env(),
            run_rate: RunRateSeries::from_env(),
            celebration: CelebrationScheduler::from_env(),
            rng: StdRng::seed_from_u64(base_seed),
            logs: VecDeque::with_capacity(200),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Schedule a recompute for the current match state. Called after every
    /// input mutation; an over of zero is a normal early-match condition and
    /// keeps the last committed prediction.
    pub fn submit_recompute(&mut self) {
        if self.match_state.current_over() <= 0.0 {
            self.push_log("[INFO] Over at 0.0, keeping last prediction");
            return;
        }
        match self.engine.submit(&self.match_state) {
            Some(generation) => {
                self.push_log(format!("[INFO] Recompute #{generation} scheduled"));
            }
            None => {
                self.push_log("[WARN] Compute worker unavailable, keeping last prediction");
            }
        }
    }
}

/// Apply one worker message to the app state. Commit acceptance, trend
/// appends and the celebration draw all happen here, on the single consumer
/// thread, so readers never observe a partially updated state.
pub fn apply_delta(state: &mut AppState, delta: Delta, now: Instant) {
    match delta {
        Delta::PredictionReady {
            generation,
            prediction,
            snapshot,
        } => {
            if !state.engine.commit(generation, prediction) {
                state.push_log(format!("[INFO] Discarded stale prediction #{generation}"));
                return;
            }
            state.trend.record(prediction.win_probability);
            state
                .run_rate
                .record(snapshot.current_over, snapshot.current_score);
            state.push_log(format!(
                "[INFO] Prediction #{generation}: {}/{} ({}% {})",
                prediction.projected_score,
                prediction.projected_wickets,
                prediction.win_probability,
                snapshot.batting_team,
            ));
            if state.celebration.on_commit(&mut state.rng, now) {
                state.push_log("[ALERT] Upset watch: celebration triggered");
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

/// Three-sentence summary shown next to the charts, composed from the
/// committed prediction and the match facts. Unknown venues and teams pass
/// through as-is; the catalogs only matter for display colors.
pub fn insight_lines(state: &MatchState, prediction: &Prediction) -> [String; 3] {
    let favored = if prediction.win_probability > 50 {
        state.batting_team()
    } else {
        state.bowling_team()
    };
    [
        format!(
            "{} is projected to finish on {} with {} wickets down.",
            state.batting_team(),
            prediction.projected_score,
            prediction.projected_wickets
        ),
        format!(
            "{} has a {}% chance of winning from here.",
            state.batting_team(),
            prediction.win_probability
        ),
        format!(
            "Key factor: {} historically favors {} in similar conditions.",
            state.venue(),
            favored
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_out_of_range_input() {
        let mut state = MatchState::new();
        state.set_wickets(14);
        assert_eq!(state.wickets(), 10);
        state.set_current_over(25.0);
        assert_eq!(state.current_over(), TOTAL_OVERS);
        state.set_current_over(-1.0);
        assert_eq!(state.current_over(), 0.0);
        state.set_current_over(f64::NAN);
        assert_eq!(state.current_over(), 0.0);
        state.set_innings(7);
        assert_eq!(state.innings(), 2);
    }

    #[test]
    fn assigning_same_team_to_both_sides_swaps() {
        let mut state = MatchState::new();
        state.set_batting_team("Chennai Super Kings");
        assert_eq!(state.batting_team(), "Chennai Super Kings");
        assert_eq!(state.bowling_team(), "Mumbai Indians");

        state.set_bowling_team("Chennai Super Kings");
        assert_eq!(state.batting_team(), "Mumbai Indians");
        assert_eq!(state.bowling_team(), "Chennai Super Kings");
    }

    #[test]
    fn recent_ball_window_stays_fixed() {
        let mut state = MatchState::new();
        for runs in 0..12 {
            state.record_ball(runs % 7);
        }
        assert_eq!(state.recent_balls().len(), RECENT_BALL_WINDOW);
        // Oldest deliveries evicted first.
        assert_eq!(state.recent_balls().last().copied(), Some(11 % 7));
    }

    #[test]
    fn record_ball_advances_score_and_over() {
        let mut state = MatchState::new();
        let score = state.current_score();
        let over = state.current_over();
        state.record_ball(4);
        assert_eq!(state.current_score(), score + 4);
        assert!(state.current_over() > over);
    }

    #[test]
    fn wickets_cap_at_ten() {
        let mut state = MatchState::new();
        for _ in 0..15 {
            state.record_wicket();
        }
        assert_eq!(state.wickets(), MAX_WICKETS);
    }

    #[test]
    fn insight_lines_name_the_favored_side() {
        let state = MatchState::new();
        let p = Prediction {
            projected_score: 156,
            projected_wickets: 5,
            win_probability: 58,
        };
        let lines = insight_lines(&state, &p);
        assert!(lines[0].contains("156"));
        assert!(lines[0].contains("Mumbai Indians"));
        assert!(lines[1].contains("58%"));
        assert!(lines[2].contains("Wankhede Stadium"));
        assert!(lines[2].contains("Mumbai Indians"));

        // At 50% and below the bowling side is favored.
        let p = Prediction {
            win_probability: 50,
            ..p
        };
        let lines = insight_lines(&state, &p);
        assert!(lines[2].contains("Chennai Super Kings"));
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let mut state = MatchState::new();
        let snap = state.snapshot();
        state.record_ball(6);
        state.set_batting_team("Gujarat Titans");
        assert_eq!(snap.current_score, 72);
        assert_eq!(snap.batting_team, "Mumbai Indians");
    }
}
