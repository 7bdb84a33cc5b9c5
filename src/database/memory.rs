//! Map-backed store, handy for tests and for embedding the scheduler
//! without SQLite.

use super::ReviewStore;
use crate::error::{Error, Result};
use crate::models::{DueCard, Flashcard, MemoryState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemoryStore {
    cards: BTreeMap<i64, DueCard>,
    next_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a card with a fresh memory state due at `now`.
    pub fn add_flashcard(
        &mut self,
        deck_id: i64,
        question: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Flashcard {
        self.next_id += 1;
        let flashcard = Flashcard {
            id: self.next_id,
            deck_id,
            question: question.to_string(),
            answer: answer.to_string(),
        };
        let state = MemoryState::new(flashcard.id, now);
        self.cards.insert(
            flashcard.id,
            DueCard {
                flashcard: flashcard.clone(),
                state,
            },
        );
        flashcard
    }

    pub fn remove_flashcard(&mut self, card_id: i64) -> Option<Flashcard> {
        self.cards.remove(&card_id).map(|c| c.flashcard)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl ReviewStore for InMemoryStore {
    fn load_state(&self, card_id: i64) -> Result<MemoryState> {
        self.cards
            .get(&card_id)
            .map(|c| c.state.clone())
            .ok_or(Error::CardNotFound(card_id))
    }

    fn save_state(&mut self, state: &MemoryState) -> Result<()> {
        let entry = self
            .cards
            .get_mut(&state.card_id)
            .ok_or(Error::CardNotFound(state.card_id))?;
        entry.state = state.clone();
        Ok(())
    }

    fn query_due(&self, deck_id: i64, now: DateTime<Utc>) -> Result<Vec<DueCard>> {
        let mut due: Vec<DueCard> = self
            .cards
            .values()
            .filter(|c| c.flashcard.deck_id == deck_id && c.state.is_due(now))
            .cloned()
            .collect();
        // BTreeMap iteration is already in id order, so a stable sort keeps ties by id
        due.sort_by_key(|c| c.state.next_review);
        Ok(due)
    }
}
