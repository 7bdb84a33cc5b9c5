//! Review recording: runs one SM-2 step against a stored memory state.

use crate::database::ReviewStore;
use crate::error::{Error, Result};
use crate::models::{DueCard, Quality};
use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, warn};
use serde::Serialize;

/// What a recorded review produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub card_id: i64,
    pub easiness_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub next_review: DateTime<Utc>,
}

/// Grades `card_id` with `quality` (clamped to 0..=5) at `now` and persists
/// the new state. `now` is truncated to whole seconds, the resolution stores
/// keep. Fails with `Error::CardNotFound` for unknown cards.
pub fn record_review<S: ReviewStore>(
    store: &mut S,
    card_id: i64,
    quality: i64,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome> {
    let now = now.trunc_subsecs(0);
    let grade = Quality::clamped(quality);
    if i64::from(grade.value()) != quality {
        debug!("quality {quality} for card {card_id} clamped to {}", grade.value());
    }

    let state = store.update_state(card_id, |current| current.reviewed(grade, now))?;
    debug!(
        "card {card_id}: q={} ef={:.2} interval={}d reps={} next={}",
        grade.value(),
        state.easiness_factor,
        state.interval,
        state.repetitions,
        state.next_review
    );

    Ok(ReviewOutcome {
        card_id,
        easiness_factor: state.easiness_factor,
        interval: state.interval,
        repetitions: state.repetitions,
        next_review: state.next_review,
    })
}

/// Like [`record_review`], re-running on `Error::Conflict` up to `attempts` times.
pub fn record_review_with_retry<S: ReviewStore>(
    store: &mut S,
    card_id: i64,
    quality: i64,
    now: DateTime<Utc>,
    attempts: u32,
) -> Result<ReviewOutcome> {
    let mut attempt = 1;
    loop {
        match record_review(store, card_id, quality, now) {
            Err(Error::Conflict(id)) if attempt < attempts => {
                warn!("conflict on card {id}, retrying ({attempt}/{attempts})");
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Cards of `deck_id` that are due at `now`, earliest first.
pub fn due_cards<S: ReviewStore>(store: &S, deck_id: i64, now: DateTime<Utc>) -> Result<Vec<DueCard>> {
    store.query_due(deck_id, now)
}
