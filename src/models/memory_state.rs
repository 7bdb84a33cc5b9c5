//! Per-card spaced repetition state. One record per flashcard, owned by it.
use super::sm2::{self, Quality};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EASINESS_FACTOR: f64 = 2.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub card_id: i64,
    pub easiness_factor: f64,
    /// Days between the last successful review and the next one.
    pub interval: u32,
    /// Consecutive reviews graded 3 or higher.
    pub repetitions: u32,
    pub next_review: DateTime<Utc>,
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Fresh state for a card created at `now`; immediately due.
    pub fn new(card_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            card_id,
            easiness_factor: DEFAULT_EASINESS_FACTOR,
            interval: 0,
            repetitions: 0,
            next_review: now,
            last_reviewed: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// State after a review graded `quality` at `now`.
    pub fn reviewed(&self, quality: Quality, now: DateTime<Utc>) -> Self {
        let step = sm2::update(quality, self.easiness_factor, self.interval, self.repetitions);

        Self {
            card_id: self.card_id,
            easiness_factor: step.easiness_factor,
            interval: step.interval,
            repetitions: step.repetitions,
            next_review: now
                .checked_add_signed(Duration::days(i64::from(step.interval)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            last_reviewed: Some(now),
        }
    }
}
