//! Storage for decks, flashcards and their memory states.
//!
//! The scheduler only talks to storage through [`ReviewStore`]; [`SqliteStore`]
//! is the persistent backend and [`InMemoryStore`] keeps everything in a map.

pub mod db;
pub mod memory;

pub use db::{SqliteStore, StudyStats};
pub use memory::InMemoryStore;

use crate::error::Result;
use crate::models::{DueCard, MemoryState};
use chrono::{DateTime, Utc};

pub trait ReviewStore {
    /// Fails with `Error::CardNotFound` if the card has no state.
    fn load_state(&self, card_id: i64) -> Result<MemoryState>;

    /// Overwrites the state of `state.card_id`. Fails with `Error::CardNotFound`
    /// if the card does not exist.
    fn save_state(&mut self, state: &MemoryState) -> Result<()>;

    /// Cards of `deck_id` with `next_review <= now`, earliest first,
    /// ties ordered by card id.
    fn query_due(&self, deck_id: i64, now: DateTime<Utc>) -> Result<Vec<DueCard>>;

    /// Read-modify-write of one card's state. Backends that can be shared
    /// between writers must make this atomic.
    fn update_state<F>(&mut self, card_id: i64, f: F) -> Result<MemoryState>
    where
        F: FnOnce(&MemoryState) -> MemoryState,
        Self: Sized,
    {
        let next = f(&self.load_state(card_id)?);
        self.save_state(&next)?;
        Ok(next)
    }
}
