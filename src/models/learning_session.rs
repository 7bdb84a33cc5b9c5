//! Learning session management for spaced repetition practice.
//! Handles multi-round review of a deck's due cards; every grade is recorded
//! through the scheduler.

use super::{DueCard, Quality};
use crate::database::ReviewStore;
use crate::error::Result;
use crate::scheduler::{self, ReviewOutcome};
use chrono::{DateTime, Utc};

/// Manages a learning session with multiple review rounds.
/// Cards that aren't mastered (grade < 3) are repeated in subsequent rounds.
pub struct LearningSession {
    pub deck_id: i64,
    pub cards: Vec<DueCard>,
    learned: Vec<bool>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_answer: bool,
    pub round_number: usize,
}

impl LearningSession {
    /// Starts a session over the cards of `deck_id` that are due at `now`.
    pub fn start<S: ReviewStore>(store: &S, deck_id: i64, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self::new_from_due_cards(deck_id, scheduler::due_cards(store, deck_id, now)?))
    }

    pub fn new_from_due_cards(deck_id: i64, cards: Vec<DueCard>) -> Self {
        let indices: Vec<usize> = (0..cards.len()).collect();

        Self {
            deck_id,
            learned: vec![false; cards.len()],
            cards,
            current_round_cards: indices,
            current_index: 0,
            show_answer: false,
            round_number: 1,
        }
    }

    pub fn current_card(&self) -> Option<&DueCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.cards.get(idx))
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_answer = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with cards that weren't mastered (grade < 3).
    /// If no cards remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| !self.learned[idx])
            .collect();

        if !failed.is_empty() {
            self.current_round_cards = failed;
            self.current_index = 0;
            self.show_answer = false;
            self.round_number += 1;
        }
    }

    /// Grades the current card and records the review in `store`.
    /// Returns `None` when there is no current card.
    pub fn grade_current_card<S: ReviewStore>(
        &mut self,
        store: &mut S,
        quality: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewOutcome>> {
        let Some(&idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(None);
        };
        let card_id = self.cards[idx].flashcard.id;

        let outcome = scheduler::record_review(store, card_id, quality, now)?;
        self.learned[idx] = Quality::clamped(quality).is_success();
        self.cards[idx].state = store.load_state(card_id)?;

        Ok(Some(outcome))
    }

    pub fn learned_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| self.learned[idx])
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    /// Returns true when all cards in the current round have been mastered.
    pub fn is_completed(&self) -> bool {
        self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
