//! Repositories for the tracker database.

pub mod card_repo;
pub mod cursor_repo;
pub mod deck_repo;

pub use card_repo::CardRepo;
pub use cursor_repo::CursorRepo;
pub use deck_repo::DeckRepo;
