use rand::{Rng, RngCore};

use crate::state::{MAX_WICKETS, MatchSnapshot, Prediction, TOTAL_OVERS};

const BASE_FACTOR: f64 = 0.95;
const WICKET_PENALTY: f64 = 0.03;
const WIN_PROB_FLOOR: u8 = 40;
const WIN_PROB_CEIL: u8 = 70;

/// Pluggable scoring strategy. The engine only ever calls `predict`, so a
/// trained model can replace [`HeuristicModel`] without touching the
/// submission or commit plumbing.
///
/// All randomness comes through the supplied RNG; implementations must be
/// deterministic for a given snapshot and RNG state.
pub trait ScoreModel: Send {
    fn predict(&self, snapshot: &MatchSnapshot, rng: &mut dyn RngCore) -> Prediction;
}

/// Extrapolation heuristic standing in for a real model. The win probability
/// is a bounded placeholder draw until a calibrated model exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicModel;

impl ScoreModel for HeuristicModel {
    fn predict(&self, snapshot: &MatchSnapshot, rng: &mut dyn RngCore) -> Prediction {
        // Callers guard over > 0 at submission; an over of zero never
        // reaches a model.
        debug_assert!(snapshot.current_over > 0.0);

        let overs_factor = TOTAL_OVERS / snapshot.current_over;
        let wicket_factor = BASE_FACTOR - f64::from(snapshot.wickets) * WICKET_PENALTY;
        let raw = (f64::from(snapshot.current_score) * overs_factor * wicket_factor).round();
        // A projection never falls below the runs already on the board.
        let projected_score = (raw.max(0.0) as u32).max(snapshot.current_score);

        let wickets = f64::from(snapshot.wickets);
        let projected = wickets
            + wickets * (TOTAL_OVERS - snapshot.current_over) / snapshot.current_over;
        let projected_wickets = projected.round().min(f64::from(MAX_WICKETS)) as u8;

        let win_probability = rng.gen_range(WIN_PROB_FLOOR..=WIN_PROB_CEIL);

        Prediction {
            projected_score,
            projected_wickets,
            win_probability,
        }
    }
}
