use std::env;
use std::time::{Duration, Instant};

use rand::Rng;

pub const DEFAULT_CELEBRATE_PROB: f64 = 0.10;
pub const DEFAULT_CELEBRATE_SECS: u64 = 5;

/// Transient celebration flag driven by prediction commits.
///
/// Two states: idle (`deadline` unset) and celebrating (`deadline` in the
/// future). A successful draw while celebrating restarts the timer. The
/// clock is passed in by the caller so expiry is testable without sleeping,
/// and the RNG is injected so draws are reproducible under a fixed seed.
#[derive(Debug)]
pub struct CelebrationScheduler {
    probability: f64,
    duration: Duration,
    deadline: Option<Instant>,
}

impl CelebrationScheduler {
    pub fn new(probability: f64, duration: Duration) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            duration,
            deadline: None,
        }
    }

    pub fn from_env() -> Self {
        let probability = env::var("CELEBRATE_PROB")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(DEFAULT_CELEBRATE_PROB);
        let secs = env::var("CELEBRATE_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CELEBRATE_SECS)
            .clamp(1, 60);
        Self::new(probability, Duration::from_secs(secs))
    }

    /// One uniform draw per committed prediction. Returns whether the flag
    /// was (re)triggered.
    pub fn on_commit(&mut self, rng: &mut impl Rng, now: Instant) -> bool {
        if rng.gen_bool(self.probability) {
            self.deadline = Some(now + self.duration);
            return true;
        }
        false
    }

    /// Clears the flag once the deadline passes. Called from the main loop.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.deadline
            && now >= deadline
        {
            self.deadline = None;
        }
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }
}
