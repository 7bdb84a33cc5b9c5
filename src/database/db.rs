//! SQLite storage for the flashcard application
//!
//! Handles schema initialization, CRUD operations for decks and flashcards,
//! and persistence of the per-card SM-2 memory state. Timestamps are stored
//! as unix seconds so the due query compares absolute instants.

use super::ReviewStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Deck, DueCard, Flashcard, MemoryState};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS decks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS flashcards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        deck_id INTEGER NOT NULL,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE,
        UNIQUE(deck_id, question)
    );

    CREATE TABLE IF NOT EXISTS memory_states (
        card_id INTEGER PRIMARY KEY,
        easiness_factor REAL NOT NULL DEFAULT 2.5,
        interval_days INTEGER NOT NULL DEFAULT 0,
        repetitions INTEGER NOT NULL DEFAULT 0,
        next_review INTEGER NOT NULL,
        last_reviewed INTEGER,
        FOREIGN KEY (card_id) REFERENCES flashcards(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_memory_states_next_review
        ON memory_states(next_review);

    CREATE TABLE IF NOT EXISTS app_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    INSERT OR IGNORE INTO app_state (key, value) VALUES ('day_offset', '0');
";

const STATE_COLUMNS: &str =
    "card_id, easiness_factor, interval_days, repetitions, next_review, last_reviewed";

const DUE_CARD_COLUMNS: &str = "f.id, f.deck_id, f.question, f.answer,
    m.card_id, m.easiness_factor, m.interval_days, m.repetitions, m.next_review, m.last_reviewed";

/// Aggregate review statistics across all decks.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StudyStats {
    pub total_studied: i64,
    pub due_now: i64,
    /// Mean easiness factor of reviewed cards, 0.0 when nothing was reviewed.
    pub average_easiness: f64,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database configured in `config`.
    pub fn open(config: &Config) -> Result<Self> {
        let conn = Connection::open(&config.database_path)?;
        conn.busy_timeout(config.busy_timeout)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Creates tables for decks, flashcards, memory states and app state.
    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // ==================== Clock ====================

    /// Wall clock shifted by the simulated day offset, at second precision.
    pub fn current_time(&self) -> Result<DateTime<Utc>> {
        let offset: String = self.conn.query_row(
            "SELECT value FROM app_state WHERE key = 'day_offset'",
            [],
            |row| row.get(0),
        )?;
        let days = offset
            .parse::<i64>()
            .map_err(|e| Error::Config(format!("bad day_offset '{offset}': {e}")))?;

        Ok(Utc::now().trunc_subsecs(0) + Duration::days(days))
    }

    /// Advances the simulated clock by 24 hours (for testing spaced repetition)
    pub fn advance_day(&self) -> Result<()> {
        self.conn.execute(
            "UPDATE app_state SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT)
             WHERE key = 'day_offset'",
            [],
        )?;
        debug!("simulated clock advanced by one day");
        Ok(())
    }

    // ==================== Deck Operations ====================

    pub fn create_deck(&self, name: &str, description: &str) -> Result<Deck> {
        let created_at = self.current_time()?;
        self.conn.execute(
            "INSERT INTO decks (name, description, created_at) VALUES (?1, ?2, ?3)",
            params![name, description, created_at.timestamp()],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("deck '{name}' created with id {id}");

        Ok(Deck {
            id,
            name: name.to_string(),
            description: description.to_string(),
            created_at,
        })
    }

    pub fn get_deck(&self, deck_id: i64) -> Result<Deck> {
        self.conn
            .query_row(
                "SELECT id, name, description, created_at FROM decks WHERE id = ?1",
                params![deck_id],
                deck_from_row,
            )
            .optional()?
            .ok_or(Error::DeckNotFound(deck_id))
    }

    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description, created_at FROM decks ORDER BY id")?;
        let decks = stmt
            .query_map([], deck_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(decks)
    }

    /// Deletes a deck; its flashcards and memory states go with it.
    pub fn delete_deck(&self, deck_id: i64) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM decks WHERE id = ?1", params![deck_id])?;
        if removed == 0 {
            return Err(Error::DeckNotFound(deck_id));
        }
        info!("deck {deck_id} deleted");
        Ok(())
    }

    // ==================== Card Operations ====================

    /// Adds a flashcard to a deck together with its initial memory state.
    ///
    /// If the deck already has a card with the same question, that card is
    /// returned unchanged.
    pub fn add_flashcard(&mut self, deck_id: i64, question: &str, answer: &str) -> Result<Flashcard> {
        let now = self.current_time()?;
        let tx = self.conn.transaction()?;

        let deck_exists = tx
            .query_row("SELECT 1 FROM decks WHERE id = ?1", params![deck_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !deck_exists {
            return Err(Error::DeckNotFound(deck_id));
        }

        tx.execute(
            "INSERT OR IGNORE INTO flashcards (deck_id, question, answer) VALUES (?1, ?2, ?3)",
            params![deck_id, question, answer],
        )?;

        let flashcard = tx.query_row(
            "SELECT id, deck_id, question, answer FROM flashcards
             WHERE deck_id = ?1 AND question = ?2",
            params![deck_id, question],
            flashcard_from_row,
        )?;

        let state = MemoryState::new(flashcard.id, now);
        tx.execute(
            "INSERT OR IGNORE INTO memory_states
             (card_id, easiness_factor, interval_days, repetitions, next_review, last_reviewed)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
            params![
                state.card_id,
                state.easiness_factor,
                state.interval,
                state.repetitions,
                state.next_review.timestamp()
            ],
        )?;
        tx.commit()?;

        debug!("card {} added to deck {deck_id}", flashcard.id);
        Ok(flashcard)
    }

    pub fn list_flashcards(&self, deck_id: i64) -> Result<Vec<Flashcard>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, deck_id, question, answer FROM flashcards WHERE deck_id = ?1 ORDER BY id",
        )?;
        let cards = stmt
            .query_map(params![deck_id], flashcard_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// All cards of a deck with their memory states, in id order.
    pub fn list_cards_with_state(&self, deck_id: i64) -> Result<Vec<DueCard>> {
        let sql = format!(
            "SELECT {DUE_CARD_COLUMNS}
             FROM flashcards f
             JOIN memory_states m ON f.id = m.card_id
             WHERE f.deck_id = ?1
             ORDER BY f.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![deck_id], due_card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    pub fn delete_flashcard(&self, card_id: i64) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM flashcards WHERE id = ?1", params![card_id])?;
        if removed == 0 {
            return Err(Error::CardNotFound(card_id));
        }
        Ok(())
    }

    // ==================== Statistics ====================

    pub fn study_stats(&self, now: DateTime<Utc>) -> Result<StudyStats> {
        let (total_studied, average): (i64, Option<f64>) = self.conn.query_row(
            "SELECT COUNT(*), AVG(easiness_factor) FROM memory_states
             WHERE last_reviewed IS NOT NULL",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let due_now: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM memory_states WHERE next_review <= ?1",
            params![now.timestamp()],
            |row| row.get(0),
        )?;

        Ok(StudyStats {
            total_studied,
            due_now,
            average_easiness: average.unwrap_or(0.0),
        })
    }
}

impl ReviewStore for SqliteStore {
    fn load_state(&self, card_id: i64) -> Result<MemoryState> {
        load_state_on(&self.conn, card_id)
    }

    fn save_state(&mut self, state: &MemoryState) -> Result<()> {
        save_state_on(&self.conn, state)
    }

    /// Returns cards where next_review <= now, ordered by next_review (oldest first).
    fn query_due(&self, deck_id: i64, now: DateTime<Utc>) -> Result<Vec<DueCard>> {
        let sql = format!(
            "SELECT {DUE_CARD_COLUMNS}
             FROM flashcards f
             JOIN memory_states m ON f.id = m.card_id
             WHERE f.deck_id = ?1 AND m.next_review <= ?2
             ORDER BY m.next_review ASC, f.id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![deck_id, now.timestamp()], due_card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// Runs the read-modify-write inside an IMMEDIATE transaction so two
    /// connections cannot interleave updates of the same card.
    fn update_state<F>(&mut self, card_id: i64, f: F) -> Result<MemoryState>
    where
        F: FnOnce(&MemoryState) -> MemoryState,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| Error::from_write(e, card_id))?;

        let next = f(&load_state_on(&tx, card_id)?);
        save_state_on(&tx, &next)?;
        tx.commit().map_err(|e| Error::from_write(e, card_id))?;

        Ok(next)
    }
}

fn load_state_on(conn: &Connection, card_id: i64) -> Result<MemoryState> {
    conn.query_row(
        &format!("SELECT {STATE_COLUMNS} FROM memory_states WHERE card_id = ?1"),
        params![card_id],
        |row| state_from_row(row, 0),
    )
    .optional()?
    .ok_or(Error::CardNotFound(card_id))
}

fn save_state_on(conn: &Connection, state: &MemoryState) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE memory_states
             SET easiness_factor = ?1, interval_days = ?2, repetitions = ?3,
                 next_review = ?4, last_reviewed = ?5
             WHERE card_id = ?6",
            params![
                state.easiness_factor,
                state.interval,
                state.repetitions,
                state.next_review.timestamp(),
                state.last_reviewed.map(|t| t.timestamp()),
                state.card_id
            ],
        )
        .map_err(|e| Error::from_write(e, state.card_id))?;

    if updated == 0 {
        return Err(Error::CardNotFound(state.card_id));
    }
    Ok(())
}

fn from_unix(idx: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}

fn deck_from_row(row: &Row) -> rusqlite::Result<Deck> {
    Ok(Deck {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: from_unix(3, row.get(3)?)?,
    })
}

fn flashcard_from_row(row: &Row) -> rusqlite::Result<Flashcard> {
    Ok(Flashcard {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
    })
}

/// Reads the six memory-state columns starting at `start`.
fn state_from_row(row: &Row, start: usize) -> rusqlite::Result<MemoryState> {
    let last_reviewed = match row.get::<_, Option<i64>>(start + 5)? {
        Some(secs) => Some(from_unix(start + 5, secs)?),
        None => None,
    };
    Ok(MemoryState {
        card_id: row.get(start)?,
        easiness_factor: row.get(start + 1)?,
        interval: row.get(start + 2)?,
        repetitions: row.get(start + 3)?,
        next_review: from_unix(start + 4, row.get(start + 4)?)?,
        last_reviewed,
    })
}

fn due_card_from_row(row: &Row) -> rusqlite::Result<DueCard> {
    Ok(DueCard {
        flashcard: flashcard_from_row(row)?,
        state: state_from_row(row, 4)?,
    })
}
