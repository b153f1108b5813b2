//! Compact textual deck format codec.
//!
//! One card per line as `<quantity> <name> [set-suffix]`, with an optional
//! leading format marker and explicit section marker lines. `encode` is
//! deterministic: sections in [`Section::ORDERED`] order, insertion order
//! within a section. For any text `t` previously produced by `encode`,
//! `encode(decode(t)) == t` byte for byte; for any deck `d` whose entries
//! are grouped in encoding order, `decode(encode(d)) == d`.

use std::sync::OnceLock;

use regex::Regex;

use crate::deck::{DeckEntry, DeckList, Section};

/// Malformed deck text. Decoding rejects the whole input; there is no
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line {line}: quantity must be a positive integer, got '{token}'")]
    InvalidQuantity { line: usize, token: String },

    #[error("line {line}: unrecognized deck line: '{text}'")]
    UnrecognizedLine { line: usize, text: String },
}

/// Decode deck text into an ordered entry list.
pub fn decode(text: &str) -> Result<DeckList, FormatError> {
    let mut deck = DeckList::default();
    let mut section = Section::Main;
    let mut seen_content = false;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        // Blank and comment lines never carry section meaning.
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        if let Some(marker) = section_marker(line) {
            section = marker;
            seen_content = true;
            continue;
        }

        if !seen_content && deck.header.is_none() && is_header_marker(line) {
            deck.header = Some(line.to_string());
            continue;
        }

        let entry = parse_card_line(line, line_no, section)?;
        deck.entries.push(entry);
        seen_content = true;
    }

    Ok(deck)
}

/// Encode a deck back to text. Deterministic; the fixed point of
/// [`decode`] for its own output.
pub fn encode(deck: &DeckList) -> String {
    let mut out = String::new();
    if let Some(header) = &deck.header {
        out.push_str(header);
        out.push('\n');
    }
    for section in Section::ORDERED {
        let mut wrote_marker = section == Section::Main;
        for entry in deck.section(section) {
            if !wrote_marker {
                out.push_str(section_heading(section));
                out.push('\n');
                wrote_marker = true;
            }
            out.push_str(&entry.quantity.to_string());
            out.push(' ');
            out.push_str(&entry.name);
            if let Some(provenance) = &entry.provenance {
                out.push_str(provenance);
            }
            out.push('\n');
        }
    }
    out
}

/// Marker line emitted before a non-main section.
fn section_heading(section: Section) -> &'static str {
    match section {
        Section::Main => "",
        Section::Sideboard => "Sideboard",
        Section::Command => "Commander",
        Section::Unknown => "Unknown",
    }
}

/// Recognize explicit section marker lines, bare (`Sideboard`) or
/// bracketed (`[Sideboard]`). Unrecognized bracketed markers map to
/// [`Section::Unknown`] rather than failing the deck.
fn section_marker(line: &str) -> Option<Section> {
    let bracketed = line.starts_with('[') && line.ends_with(']');
    let word = if bracketed {
        line[1..line.len() - 1].trim()
    } else {
        line
    };
    match word.to_ascii_lowercase().as_str() {
        "deck" | "main" | "mainboard" | "maindeck" => Some(Section::Main),
        "sideboard" | "side" => Some(Section::Sideboard),
        "commander" | "commanders" | "command" => Some(Section::Command),
        "companion" | "unknown" => Some(Section::Unknown),
        _ if bracketed => Some(Section::Unknown),
        _ => None,
    }
}

/// Leading format/version marker, e.g. `Format: vintage`.
fn is_header_marker(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("format:") || lower.starts_with("version:")
}

fn parse_card_line(line: &str, line_no: usize, section: Section) -> Result<DeckEntry, FormatError> {
    let (token, rest) = match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => {
            return Err(FormatError::UnrecognizedLine {
                line: line_no,
                text: line.to_string(),
            })
        }
    };

    // Accept a plain integer or the common `4x` spelling.
    let digits = token.strip_suffix(['x', 'X']).unwrap_or(token);
    let quantity = if digits.chars().all(|c| c.is_ascii_digit()) && !digits.is_empty() {
        digits
            .parse::<u32>()
            .map_err(|_| FormatError::InvalidQuantity {
                line: line_no,
                token: token.to_string(),
            })?
    } else if token.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+') {
        // Looks numeric but is not a plain positive integer ("2.5", "-1").
        return Err(FormatError::InvalidQuantity {
            line: line_no,
            token: token.to_string(),
        });
    } else {
        return Err(FormatError::UnrecognizedLine {
            line: line_no,
            text: line.to_string(),
        });
    };
    if quantity == 0 {
        return Err(FormatError::InvalidQuantity {
            line: line_no,
            token: token.to_string(),
        });
    }

    let (name, provenance) = split_provenance(rest);
    if name.is_empty() {
        return Err(FormatError::UnrecognizedLine {
            line: line_no,
            text: line.to_string(),
        });
    }

    Ok(DeckEntry {
        name,
        provenance,
        quantity,
        section,
    })
}

/// Split the trailing set / collector-number suffix off a card name.
/// The suffix is kept verbatim (separator included) as provenance.
fn split_provenance(rest: &str) -> (String, Option<String>) {
    if let Some(pos) = rest.find('|') {
        let name = rest[..pos].trim_end().to_string();
        return (name, Some(rest[pos..].to_string()));
    }
    if let Some(caps) = paren_suffix_re().captures(rest) {
        let name = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let provenance = caps.get(2).map(|m| m.as_str().to_string());
        return (name, provenance);
    }
    (rest.to_string(), None)
}

/// Trailing ` (SET)` or ` (SET) 123` suffix.
fn paren_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.*\S)(\s+\([A-Za-z0-9]{2,6}\)(?:\s+[A-Za-z0-9-]+)?)$")
            .expect("suffix pattern is valid")
    })
}
