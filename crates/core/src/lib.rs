//! `arenatrack-core` -- domain types and pure logic for the tracker.
//!
//! This crate has no I/O: everything here is deterministic and reentrant.
//! It provides:
//!
//! - The card identity model and the three-keyed [`cards::index::CardIndex`]
//!   that unifies identities across external card sources.
//! - The textual deck format codec ([`deck::codec`]) and the deck matcher.
//! - Typed log events ([`log`]), the record assembler that delimits the
//!   raw client log stream, and the record parser.
//! - Mana cost parsing and payability ([`mana`]).

pub mod cards;
pub mod deck;
pub mod log;
pub mod mana;
pub mod types;
