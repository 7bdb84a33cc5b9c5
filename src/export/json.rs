//! JSON import/export module for flashcard decks.
//! A deck is exported together with its cards and their memory states, so an
//! import resumes the review schedule where the export left it.

use crate::database::{ReviewStore, SqliteStore};
use crate::error::Result;
use crate::models::{Deck, DueCard, MemoryState};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckExport {
    pub deck: Deck,
    pub cards: Vec<DueCard>,
}

/// Collects a deck and all of its cards with their states.
pub fn export_deck(store: &SqliteStore, deck_id: i64) -> Result<DeckExport> {
    Ok(DeckExport {
        deck: store.get_deck(deck_id)?,
        cards: store.list_cards_with_state(deck_id)?,
    })
}

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(export: &DeckExport, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.flush()?;
    info!(
        "deck '{}' exported to '{}'",
        export.deck.name,
        path.as_ref().display()
    );
    Ok(())
}

/// Reads a deck export from a JSON file.
pub fn import_json(path: impl AsRef<Path>) -> Result<DeckExport> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let export: DeckExport = serde_json::from_reader(reader)?;
    Ok(export)
}

/// Recreates an exported deck as a new deck in `store`, keeping each card's
/// memory state. Ids are reassigned.
pub fn import_deck(store: &mut SqliteStore, export: &DeckExport) -> Result<Deck> {
    let deck = store.create_deck(&export.deck.name, &export.deck.description)?;

    for card in &export.cards {
        let created = store.add_flashcard(deck.id, &card.flashcard.question, &card.flashcard.answer)?;
        store.save_state(&MemoryState {
            card_id: created.id,
            ..card.state.clone()
        })?;
    }

    info!(
        "deck '{}' imported with {} cards",
        deck.name,
        export.cards.len()
    );
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::scheduler::record_review;
    use std::fs;

    fn create_test_store() -> (SqliteStore, Deck) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let deck = store.create_deck("Test Deck", "greetings").unwrap();
        store.add_flashcard(deck.id, "hello", "cześć").unwrap();
        store.add_flashcard(deck.id, "goodbye", "do widzenia").unwrap();
        (store, deck)
    }

    #[test]
    fn test_export_json_to_path() {
        let (store, deck) = create_test_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");

        let export = export_deck(&store, deck.id).unwrap();
        export_json_to_path(&export, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"easiness_factor\""));
        assert!(text.contains("do widzenia"));
    }

    #[test]
    fn test_export_missing_deck() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(export_deck(&store, 3), Err(Error::DeckNotFound(3))));
    }

    #[test]
    fn test_import_keeps_schedule() {
        let (mut store, deck) = create_test_store();
        let now = store.current_time().unwrap();
        let card_id = store.list_flashcards(deck.id).unwrap()[0].id;
        record_review(&mut store, card_id, 5, now).unwrap();
        record_review(&mut store, card_id, 5, now).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        export_json_to_path(&export_deck(&store, deck.id).unwrap(), &path).unwrap();

        let mut target = SqliteStore::open_in_memory().unwrap();
        let imported = import_deck(&mut target, &import_json(&path).unwrap()).unwrap();
        assert_eq!(imported.name, "Test Deck");
        assert_eq!(imported.description, "greetings");

        let cards = target.list_cards_with_state(imported.id).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].flashcard.question, "hello");
        assert_eq!(cards[0].state.repetitions, 2);
        assert_eq!(cards[0].state.interval, 6);
        assert_eq!(cards[1].state.repetitions, 0);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_json("nonexistent_file_xyz123.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_json(&path), Err(Error::Json(_))));
    }
}
