use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::predictor::ScoreModel;
use crate::state::{ComputeCommand, Delta, MatchState, Prediction};

pub const DEFAULT_COMPUTE_LATENCY_MS: u64 = 800;

/// Front half of the recompute pipeline: hands generation-stamped snapshots
/// to the compute worker and gates commits coming back.
///
/// Submitting a new request implicitly cancels all older outstanding ones:
/// they are never aborted, the commit gate just refuses anything but the
/// latest generation. A result that loses the race is discarded, not an
/// error.
#[derive(Debug)]
pub struct PredictionEngine {
    cmd_tx: Sender<ComputeCommand>,
    base_seed: u64,
    latest_generation: u64,
    committed_generation: u64,
    committed: Option<Prediction>,
}

impl PredictionEngine {
    pub fn new(cmd_tx: Sender<ComputeCommand>, base_seed: u64) -> Self {
        Self {
            cmd_tx,
            base_seed,
            latest_generation: 0,
            committed_generation: 0,
            committed: None,
        }
    }

    /// Schedule a recompute for a snapshot of `state`. Returns the assigned
    /// generation, or `None` when the over is still at zero: the projection
    /// is not yet computable and the last committed prediction stands.
    pub fn submit(&mut self, state: &MatchState) -> Option<u64> {
        if state.current_over() <= 0.0 {
            return None;
        }
        let generation = self.latest_generation + 1;
        // Per-request seed keeps the probability draw reproducible no matter
        // which order completions arrive in.
        let seed = self.base_seed.wrapping_add(generation);
        self.cmd_tx
            .send(ComputeCommand::Recompute {
                generation,
                seed,
                snapshot: state.snapshot(),
            })
            .ok()?;
        // Counted only once the worker has the request; a hung-up worker
        // must not leave a flight pending that can never complete.
        self.latest_generation = generation;
        Some(generation)
    }

    /// Accept a completed computation only if it is the latest generation
    /// and has not committed before. Exactly one commit per surviving
    /// generation.
    pub fn commit(&mut self, generation: u64, prediction: Prediction) -> bool {
        if generation != self.latest_generation || generation == self.committed_generation {
            return false;
        }
        self.committed_generation = generation;
        self.committed = Some(prediction);
        true
    }

    pub fn committed(&self) -> Option<Prediction> {
        self.committed
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation
    }

    /// True while the latest submission has not produced a commit yet.
    pub fn in_flight(&self) -> bool {
        self.latest_generation > self.committed_generation
    }
}

/// Compute worker: sleeps the simulated model latency, runs the scoring
/// model with the request's seeded RNG, reports back as a delta. Exits when
/// either channel end hangs up.
pub fn spawn_compute_worker(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ComputeCommand>,
    model: Box<dyn ScoreModel>,
) {
    let latency = compute_latency_from_env();
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let ComputeCommand::Recompute {
                generation,
                seed,
                snapshot,
            } = cmd;
            if tx
                .send(Delta::Log(format!(
                    "[INFO] Computing prediction #{generation}"
                )))
                .is_err()
            {
                break;
            }
            thread::sleep(latency);
            let mut rng = StdRng::seed_from_u64(seed);
            let prediction = model.predict(&snapshot, &mut rng);
            if tx
                .send(Delta::PredictionReady {
                    generation,
                    prediction,
                    snapshot,
                })
                .is_err()
            {
                break;
            }
        }
    });
}

fn compute_latency_from_env() -> Duration {
    let ms = env::var("COMPUTE_LATENCY_MS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_COMPUTE_LATENCY_MS)
        .min(10_000);
    Duration::from_millis(ms)
}
