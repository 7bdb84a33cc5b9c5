//! Question/answer exports for spreadsheets and Anki. Review state is not
//! included; use the JSON export to move schedules between databases.

use super::DeckExport;
use crate::error::Result;
use csv::WriterBuilder;
use log::info;
use std::io::Write;

/// CSV with a `Question,Answer` header row.
pub fn write_csv<W: Write>(export: &DeckExport, writer: W) -> Result<()> {
    let mut out = WriterBuilder::new().from_writer(writer);
    out.write_record(["Question", "Answer"])?;
    for card in &export.cards {
        out.write_record([&card.flashcard.question, &card.flashcard.answer])?;
    }
    out.flush()?;
    info!("deck '{}' written as CSV", export.deck.name);
    Ok(())
}

/// One `question<TAB>answer` line per card, no header. Fields holding tabs,
/// quotes or newlines are quoted, which Anki's importer accepts.
pub fn write_anki<W: Write>(export: &DeckExport, writer: W) -> Result<()> {
    let mut out = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);
    for card in &export.cards {
        out.write_record([&card.flashcard.question, &card.flashcard.answer])?;
    }
    out.flush()?;
    info!("deck '{}' written as Anki text", export.deck.name);
    Ok(())
}
