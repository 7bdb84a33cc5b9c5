pub mod deck;
pub mod flashcard;
pub mod learning_session;
pub mod memory_state;
pub mod sm2;

pub use deck::Deck;
pub use flashcard::{DueCard, Flashcard};
pub use learning_session::LearningSession;
pub use memory_state::MemoryState;
pub use sm2::{Quality, Sm2Step};
