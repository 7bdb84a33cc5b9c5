//! Crate-wide error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Card not found: {0}")]
    CardNotFound(i64),

    #[error("Deck not found: {0}")]
    DeckNotFound(i64),

    /// Another writer holds the record; retry with fresh state.
    #[error("Concurrent update conflict on card {0}")]
    Conflict(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps SQLite busy/locked failures on `card_id` to `Conflict`.
    pub(crate) fn from_write(err: rusqlite::Error, card_id: i64) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                Error::Conflict(card_id)
            }
            _ => Error::Database(err),
        }
    }
}
