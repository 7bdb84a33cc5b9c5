//! Flashcard is a pair <question, answer> belonging to one deck
use super::MemoryState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: i64,
    pub deck_id: i64,
    pub question: String,
    pub answer: String,
}

/// A card together with its scheduling state, as returned by the due query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DueCard {
    pub flashcard: Flashcard,
    pub state: MemoryState,
}
