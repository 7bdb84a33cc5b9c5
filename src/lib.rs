pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod scheduler;

pub use config::Config;
pub use database::{InMemoryStore, ReviewStore, SqliteStore};
pub use error::{Error, Result};
pub use models::{Deck, DueCard, Flashcard, LearningSession, MemoryState, Quality};
pub use scheduler::{ReviewOutcome, record_review};
