//! Row structs for the tracker database.

pub mod card;
pub mod cursor;
pub mod deck;

pub use card::CardRecord;
pub use cursor::CursorRow;
pub use deck::{CreateDeck, DeckEntryRow, DeckRow, NewDeckEntry};
