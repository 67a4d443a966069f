use std::sync::mpsc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use ipl_terminal::engine::PredictionEngine;
use ipl_terminal::predictor::{HeuristicModel, ScoreModel};
use ipl_terminal::state::{ComputeCommand, MatchState, Prediction};

fn complete(cmd: &ComputeCommand) -> (u64, Prediction) {
    let ComputeCommand::Recompute {
        generation,
        seed,
        snapshot,
    } = cmd;
    let mut rng = StdRng::seed_from_u64(*seed);
    (*generation, HeuristicModel.predict(snapshot, &mut rng))
}

#[test]
fn reordered_completions_commit_only_the_last_submission() {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut engine = PredictionEngine::new(cmd_tx, 99);
    let mut state = MatchState::new();

    // Three rapid mutations, each one superseding the previous request.
    state.record_ball(4);
    engine.submit(&state).unwrap();
    state.record_ball(6);
    engine.submit(&state).unwrap();
    state.record_ball(1);
    let last = engine.submit(&state).unwrap();

    let commands: Vec<ComputeCommand> = cmd_rx.try_iter().collect();
    assert_eq!(commands.len(), 3);

    // Complete in the worst-case order: newest first, oldest last.
    let mut results: Vec<(u64, Prediction)> = commands.iter().map(complete).collect();
    results.reverse();

    let mut commits = 0;
    for (generation, prediction) in &results {
        if engine.commit(*generation, *prediction) {
            commits += 1;
        }
    }

    assert_eq!(commits, 1);
    let (_, expected) = complete(&commands[2]);
    assert_eq!(engine.committed(), Some(expected));
    assert_eq!(engine.latest_generation(), last);
}

#[test]
fn interleaved_submissions_and_completions_never_regress() {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut engine = PredictionEngine::new(cmd_tx, 5);
    let mut state = MatchState::new();

    let g1 = engine.submit(&state).unwrap();
    let cmd1 = cmd_rx.try_recv().unwrap();

    // A new submission lands while generation 1 is still computing.
    state.record_ball(6);
    let g2 = engine.submit(&state).unwrap();
    let cmd2 = cmd_rx.try_recv().unwrap();

    // Generation 2 finishes first and commits.
    let (_, p2) = complete(&cmd2);
    assert!(engine.commit(g2, p2));

    // Generation 1 finishing late must not overwrite the newer result.
    let (_, p1) = complete(&cmd1);
    assert!(!engine.commit(g1, p1));
    assert_eq!(engine.committed(), Some(p2));
}

#[test]
fn zero_over_keeps_previous_prediction() {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut engine = PredictionEngine::new(cmd_tx, 5);
    let mut state = MatchState::new();

    let g = engine.submit(&state).unwrap();
    let cmd = cmd_rx.try_recv().unwrap();
    let (_, p) = complete(&cmd);
    assert!(engine.commit(g, p));

    state.set_current_over(0.0);
    assert_eq!(engine.submit(&state), None);
    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(engine.committed(), Some(p));
}

#[test]
fn per_request_seeds_are_stable_across_runs() {
    let run = || {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let mut engine = PredictionEngine::new(cmd_tx, 1234);
        let state = MatchState::new();
        engine.submit(&state).unwrap();
        engine.submit(&state).unwrap();
        cmd_rx.try_iter().map(|cmd| complete(&cmd).1).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
