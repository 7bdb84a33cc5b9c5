use clap::{Parser, Subcommand, ValueEnum};
use flashcards_srs::export::{self, ExportFormat};
use flashcards_srs::models::sm2;
use flashcards_srs::scheduler::{self, record_review_with_retry};
use flashcards_srs::{Config, LearningSession, Result, SqliteStore};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const REVIEW_ATTEMPTS: u32 = 3;

#[derive(Parser)]
#[command(name = "flashcards", about = "Flashcard decks with SM-2 spaced repetition")]
struct Cli {
    /// SQLite database file (overrides FLASHCARDS_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (overrides FLASHCARDS_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new deck
    AddDeck {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Add a question/answer card to a deck
    AddCard {
        deck_id: i64,
        question: String,
        answer: String,
    },
    /// List decks
    Decks,
    /// List cards of a deck with their schedule
    Cards { deck_id: i64 },
    /// List cards that are due now
    Due { deck_id: i64 },
    /// Record a review grade (0-5) for a card
    Review { card_id: i64, quality: i64 },
    /// Interactively study the due cards of a deck
    Study { deck_id: i64 },
    /// Show review statistics
    Stats,
    /// Move the simulated clock forward by one day
    AdvanceDay,
    /// Export a deck (JSON keeps review state; CSV and Anki hold question/answer only)
    Export {
        deck_id: i64,
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
    },
    /// Import a deck from a JSON export
    Import { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
    Anki,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Anki => ExportFormat::Anki,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(level) = cli.log {
        config.log_level = level;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, command: Command) -> Result<()> {
    let mut store = SqliteStore::open(config)?;

    match command {
        Command::AddDeck { name, description } => {
            let deck = store.create_deck(&name, &description)?;
            println!("Deck '{}' created with id {}", deck.name, deck.id);
        }
        Command::AddCard {
            deck_id,
            question,
            answer,
        } => {
            let card = store.add_flashcard(deck_id, &question, &answer)?;
            println!("Card {} added", card.id);
        }
        Command::Decks => {
            for deck in store.list_decks()? {
                let count = store.list_flashcards(deck.id)?.len();
                println!("{:>4}  {} ({} cards)", deck.id, deck.name, count);
            }
        }
        Command::Cards { deck_id } => {
            store.get_deck(deck_id)?;
            for card in store.list_cards_with_state(deck_id)? {
                println!(
                    "{:>4}  {}  [ef {:.2}, {}d, reps {}, next {}]",
                    card.flashcard.id,
                    card.flashcard.question,
                    card.state.easiness_factor,
                    card.state.interval,
                    card.state.repetitions,
                    card.state.next_review.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Due { deck_id } => {
            let now = store.current_time()?;
            for card in scheduler::due_cards(&store, deck_id, now)? {
                println!(
                    "{:>4}  {}  (due {})",
                    card.flashcard.id,
                    card.flashcard.question,
                    card.state.next_review.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Review { card_id, quality } => {
            let now = store.current_time()?;
            let outcome = record_review_with_retry(&mut store, card_id, quality, now, REVIEW_ATTEMPTS)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Study { deck_id } => study(&mut store, deck_id)?,
        Command::Stats => {
            let now = store.current_time()?;
            println!("{}", serde_json::to_string_pretty(&store.study_stats(now)?)?);
        }
        Command::AdvanceDay => {
            store.advance_day()?;
            println!("Current date: {}", store.current_time()?.format("%Y-%m-%d"));
        }
        Command::Export {
            deck_id,
            path,
            format,
        } => {
            let deck = export::export_deck(&store, deck_id)?;
            export::export_to_path(&deck, format.into(), &path)?;
            println!("Exported {} cards to {}", deck.cards.len(), path.display());
        }
        Command::Import { path } => {
            let deck = export::import_deck(&mut store, &export::import_json(&path)?)?;
            println!("Deck '{}' imported with id {}", deck.name, deck.id);
        }
    }

    Ok(())
}

/// Terminal study loop: show question, wait, show answer, read a grade.
fn study(store: &mut SqliteStore, deck_id: i64) -> Result<()> {
    let deck = store.get_deck(deck_id)?;
    let now = store.current_time()?;
    let mut session = LearningSession::start(&*store, deck_id, now)?;
    if session.total_count() == 0 {
        println!("Nothing due in '{}'", deck.name);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut round = 0;

    while !session.is_completed() {
        if session.round_number != round {
            round = session.round_number;
            println!("\n{}", session.phase_message());
        }
        let Some(card) = session.current_card().cloned() else {
            break;
        };
        let state = &card.state;
        let preview = sm2::preview_intervals(state.easiness_factor, state.interval, state.repetitions);

        println!("\nQ: {}", card.flashcard.question);
        print!("(enter to reveal) ");
        io::stdout().flush()?;
        if lines.next().transpose()?.is_none() {
            return Ok(());
        }
        session.toggle_answer();
        println!("A: {}", card.flashcard.answer);
        println!(
            "Grade 0-5 (intervals: {}):",
            preview.map(|d| format!("{d}d")).join(" ")
        );

        let quality = loop {
            let Some(line) = lines.next().transpose()? else {
                return Ok(());
            };
            match parse_grade(&line) {
                Some(quality) => break quality,
                None => println!("Enter a number from 0 to 5:"),
            }
        };
        if let Some(outcome) = session.grade_current_card(store, quality, now)? {
            println!("Next review in {} day(s)", outcome.interval);
        }
        session.next_card();
    }

    println!("\nSession complete: {} cards learned", session.cards.len());
    Ok(())
}

/// Integer grade typed by the user; out-of-range values are clamped later.
fn parse_grade(line: &str) -> Option<i64> {
    line.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grade() {
        assert_eq!(parse_grade("4"), Some(4));
        assert_eq!(parse_grade("  0 \n"), Some(0));
        assert_eq!(parse_grade("9"), Some(9));
        assert_eq!(parse_grade("-1"), Some(-1));
    }

    #[test]
    fn test_non_numeric_input_is_not_a_grade() {
        assert_eq!(parse_grade(""), None);
        assert_eq!(parse_grade("   "), None);
        assert_eq!(parse_grade("fiev"), None);
        assert_eq!(parse_grade("4.5"), None);
    }

    #[test]
    fn test_export_format_flag() {
        let cli = Cli::parse_from(["flashcards", "export", "3", "out.csv", "--format", "csv"]);
        match cli.command {
            Command::Export { deck_id, format, .. } => {
                assert_eq!(deck_id, 3);
                assert_eq!(ExportFormat::from(format), ExportFormat::Csv);
            }
            _ => panic!("expected export command"),
        }

        let cli = Cli::parse_from(["flashcards", "export", "3", "out.json"]);
        assert!(matches!(
            cli.command,
            Command::Export { format: FormatArg::Json, .. }
        ));
    }
}
