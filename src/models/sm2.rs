//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Each card has an easiness factor (EF) that adjusts based on performance
//! - Quality grades 0-2: repetitions reset and the card is due again in 1 day
//! - Quality grades 3-5: interval grows progressively (1 day → 6 days → EF multiplier)
//! - EF is adjusted after every review and never falls below 1.3
//!
//! Intervals are rounded with `f64::round` (half away from zero) and capped at
//! [`MAX_INTERVAL_DAYS`].

use serde::{Deserialize, Serialize};

pub const MIN_EASINESS_FACTOR: f64 = 1.3;

/// Longest interval ever scheduled (100 years).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Recall grade for a single review, always within 0..=5.
///
/// 0 = complete blackout, 1 = wrong but familiar, 2 = wrong but easy once shown,
/// 3 = correct with serious difficulty, 4 = correct after hesitation, 5 = perfect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: Quality = Quality(5);

    /// Clamps any integer into 0..=5. Out-of-range grades are never rejected.
    pub fn clamped(raw: i64) -> Self {
        Quality(raw.clamp(0, 5) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 >= 3
    }
}

/// Outcome of one SM-2 step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sm2Step {
    pub easiness_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
}

/// Computes the next (EF, interval, repetitions) triple for a review.
pub fn update(quality: Quality, easiness_factor: f64, interval: u32, repetitions: u32) -> Sm2Step {
    let penalty = f64::from(5 - quality.value());
    let new_ef =
        (easiness_factor + (0.1 - penalty * (0.08 + penalty * 0.02))).max(MIN_EASINESS_FACTOR);

    if !quality.is_success() {
        return Sm2Step {
            easiness_factor: new_ef,
            interval: 1,
            repetitions: 0,
        };
    }

    let new_interval = match repetitions {
        0 => 1,
        1 => 6,
        _ => (f64::from(interval) * new_ef)
            .round()
            .clamp(1.0, f64::from(MAX_INTERVAL_DAYS)) as u32,
    };

    Sm2Step {
        easiness_factor: new_ef,
        interval: new_interval,
        repetitions: repetitions.saturating_add(1),
    }
}

/// Interval each grade 0..=5 would produce from the given state.
pub fn preview_intervals(easiness_factor: f64, interval: u32, repetitions: u32) -> [u32; 6] {
    let mut out = [0; 6];
    for (grade, slot) in out.iter_mut().enumerate() {
        *slot = update(Quality::clamped(grade as i64), easiness_factor, interval, repetitions).interval;
    }
    out
}
