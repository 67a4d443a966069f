use std::sync::mpsc;
use std::time::Instant;

use ipl_terminal::state::{AppState, Delta, MatchSnapshot, Prediction, apply_delta};

fn prediction(win: u8) -> Prediction {
    Prediction {
        projected_score: 150,
        projected_wickets: 4,
        win_probability: win,
    }
}

fn snapshot(state: &AppState) -> MatchSnapshot {
    state.match_state.snapshot()
}

#[test]
fn committed_delta_feeds_trend_and_run_rate() {
    let (cmd_tx, _cmd_rx) = mpsc::channel();
    let mut state = AppState::new(cmd_tx, 7);
    let now = Instant::now();

    state.submit_recompute();
    let snap = snapshot(&state);
    apply_delta(
        &mut state,
        Delta::PredictionReady {
            generation: 1,
            prediction: prediction(58),
            snapshot: snap,
        },
        now,
    );

    assert_eq!(state.engine.committed(), Some(prediction(58)));
    let trend = state.trend.points();
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0].batting_share, 58);
    assert_eq!(trend[0].bowling_share, 42);
    assert_eq!(state.run_rate.points().len(), 1);
}

#[test]
fn stale_delta_is_discarded_without_side_effects() {
    let (cmd_tx, _cmd_rx) = mpsc::channel();
    let mut state = AppState::new(cmd_tx, 7);
    let now = Instant::now();

    state.submit_recompute();
    state.submit_recompute();
    let snap = snapshot(&state);

    // Generation 1 completes after generation 2 was submitted.
    apply_delta(
        &mut state,
        Delta::PredictionReady {
            generation: 1,
            prediction: prediction(44),
            snapshot: snap.clone(),
        },
        now,
    );
    assert_eq!(state.engine.committed(), None);
    assert!(state.trend.is_empty());
    assert!(state.run_rate.is_empty());

    apply_delta(
        &mut state,
        Delta::PredictionReady {
            generation: 2,
            prediction: prediction(61),
            snapshot: snap,
        },
        now,
    );
    assert_eq!(state.engine.committed(), Some(prediction(61)));
    assert_eq!(state.trend.len(), 1);
}

#[test]
fn every_commit_appends_exactly_one_trend_point() {
    let (cmd_tx, _cmd_rx) = mpsc::channel();
    let mut state = AppState::new(cmd_tx, 7);
    let now = Instant::now();

    for i in 0..10u8 {
        state.submit_recompute();
        let snap = snapshot(&state);
        apply_delta(
            &mut state,
            Delta::PredictionReady {
                generation: u64::from(i) + 1,
                prediction: prediction(40 + i),
                snapshot: snap,
            },
            now,
        );
    }

    let trend = state.trend.points();
    assert_eq!(trend.len(), 10);
    for (i, point) in trend.iter().enumerate() {
        assert_eq!(point.batting_share, 40 + i as u8);
        assert_eq!(point.batting_share as u16 + point.bowling_share as u16, 100);
    }
}

#[test]
fn log_delta_lands_in_the_ring() {
    let (cmd_tx, _cmd_rx) = mpsc::channel();
    let mut state = AppState::new(cmd_tx, 7);
    apply_delta(
        &mut state,
        Delta::Log("[INFO] hello".to_string()),
        Instant::now(),
    );
    assert!(state.logs.iter().any(|msg| msg.contains("hello")));
}

#[test]
fn celebration_decisions_are_reproducible_for_a_seed() {
    let run = |seed: u64| -> Vec<String> {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let mut state = AppState::new(cmd_tx, seed);
        let now = Instant::now();
        for i in 0..40u64 {
            state.submit_recompute();
            let snap = snapshot(&state);
            apply_delta(
                &mut state,
                Delta::PredictionReady {
                    generation: i + 1,
                    prediction: prediction(50),
                    snapshot: snap,
                },
                now,
            );
        }
        state
            .logs
            .iter()
            .filter(|msg| msg.contains("celebration"))
            .cloned()
            .collect()
    };
    assert_eq!(run(21), run(21));
}
