pub mod json;
pub mod tabular;

pub use json::{DeckExport, export_deck, export_json_to_path, import_json, import_deck};
pub use tabular::{write_anki, write_csv};

use crate::error::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// File formats a deck can be exported to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Deck, cards and memory states; can be imported again.
    Json,
    /// `Question,Answer` header followed by one row per card.
    Csv,
    /// Tab-separated question/answer lines for Anki's text importer.
    Anki,
}

/// Writes `export` to `path` in the given format.
pub fn export_to_path(export: &DeckExport, format: ExportFormat, path: impl AsRef<Path>) -> Result<()> {
    match format {
        ExportFormat::Json => export_json_to_path(export, path),
        ExportFormat::Csv => write_csv(export, BufWriter::new(File::create(path)?)),
        ExportFormat::Anki => write_anki(export, BufWriter::new(File::create(path)?)),
    }
}
