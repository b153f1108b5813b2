//! Deck model and the textual deck format.

pub mod codec;
pub mod matcher;

use serde::{Deserialize, Serialize};

/// Deck sub-list as encoded in deck text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Main,
    Sideboard,
    Command,
    Unknown,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Sideboard => "sideboard",
            Self::Command => "command",
            Self::Unknown => "unknown",
        }
    }

    /// Encoding order: main first, then sideboard, command, unknown.
    pub const ORDERED: [Section; 4] = [
        Section::Main,
        Section::Sideboard,
        Section::Command,
        Section::Unknown,
    ];
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of a stored deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckSource {
    /// Entered by hand.
    Manual,
    /// Imported from deck text or an external site.
    Import,
    /// Derived from a `DeckSubmission` log event.
    Log,
}

impl DeckSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Import => "import",
            Self::Log => "log",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(Self::Manual),
            "import" => Some(Self::Import),
            "log" => Some(Self::Log),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeckSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a deck: a card reference with quantity and section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    /// Card name as written in the deck text.
    pub name: String,
    /// Verbatim set / collector-number suffix (e.g. `"|VMA"` or
    /// `" (MH3) 123"`), kept as provenance; not required for resolution.
    pub provenance: Option<String>,
    pub quantity: u32,
    pub section: Section,
}

/// A deck as decoded from or encoded to deck text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    /// Leading format/version marker line, preserved verbatim.
    pub header: Option<String>,
    /// Entries in text order, grouped by section.
    pub entries: Vec<DeckEntry>,
}

impl DeckList {
    /// Entries belonging to one section, in insertion order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = &DeckEntry> {
        self.entries.iter().filter(move |e| e.section == section)
    }

    /// Total number of cards (quantities summed) in one section.
    pub fn count(&self, section: Section) -> u32 {
        self.section(section).map(|e| e.quantity).sum()
    }
}
