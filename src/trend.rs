use std::collections::VecDeque;
use std::env;

use serde::Serialize;

pub const DEFAULT_TREND_CAP: usize = 40;

/// One committed win-probability sample. Shares always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub index: u64,
    pub batting_share: u8,
    pub bowling_share: u8,
}

/// Ordered, FIFO-capped win-probability history. Fed exclusively from
/// prediction commits; starts empty, no seeded points.
#[derive(Debug)]
pub struct TrendSeries {
    points: VecDeque<TrendPoint>,
    cap: usize,
    next_index: u64,
}

impl TrendSeries {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap.max(1)),
            cap: cap.max(1),
            next_index: 0,
        }
    }

    pub fn from_env() -> Self {
        let cap = env::var("TREND_CAP")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TREND_CAP)
            .clamp(5, 500);
        Self::new(cap)
    }

    pub fn record(&mut self, batting_share: u8) {
        let batting_share = batting_share.min(100);
        self.points.push_back(TrendPoint {
            index: self.next_index,
            batting_share,
            bowling_share: 100 - batting_share,
        });
        self.next_index += 1;
        while self.points.len() > self.cap {
            self.points.pop_front();
        }
    }

    /// Owned snapshot for renderers; recording later never mutates a
    /// sequence handed out here.
    pub fn points(&self) -> Vec<TrendPoint> {
        self.points.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<TrendPoint> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Auxiliary derived metric: run rate at each commit's snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunRatePoint {
    pub over: f64,
    pub run_rate: f64,
}

#[derive(Debug)]
pub struct RunRateSeries {
    points: VecDeque<RunRatePoint>,
    cap: usize,
}

impl RunRateSeries {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap.max(1)),
            cap: cap.max(1),
        }
    }

    pub fn from_env() -> Self {
        let cap = env::var("TREND_CAP")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TREND_CAP)
            .clamp(5, 500);
        Self::new(cap)
    }

    pub fn record(&mut self, over: f64, score: u32) {
        if !(over > 0.0) {
            return;
        }
        self.points.push_back(RunRatePoint {
            over,
            run_rate: f64::from(score) / over,
        });
        while self.points.len() > self.cap {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> Vec<RunRatePoint> {
        self.points.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
