//! Type-line parsing.
//!
//! Splits a printed type line (`"Legendary Creature — Time Lord Doctor"`)
//! into supertypes, types, and subtypes.

/// Supertypes recognized on a type line.
const SUPER_TYPES: &[&str] = &["Basic", "Host", "Legendary", "Ongoing", "Snow", "World"];

/// Subtypes that contain a space and must not be split on whitespace.
const MULTI_WORD_SUB_TYPES: &[&str] = &["Time Lord"];

/// A type line split into its components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTypeLine {
    pub super_types: Vec<String>,
    pub types: Vec<String>,
    pub sub_types: Vec<String>,
}

impl ParsedTypeLine {
    pub fn is_land(&self) -> bool {
        self.types.iter().any(|t| t == "Land")
    }
}

/// Parse a printed type line.
///
/// Plane cards carry their entire subtype as one phrase; everything else
/// splits subtypes on whitespace, with the multi-word special cases
/// re-joined afterwards.
pub fn parse_type_line(type_line: &str) -> ParsedTypeLine {
    let mut parsed = ParsedTypeLine::default();
    if type_line.trim().is_empty() {
        return parsed;
    }

    let (head, tail) = match type_line.split_once('—') {
        Some((head, tail)) => (head, Some(tail)),
        None => (type_line, None),
    };

    if let Some(tail) = tail {
        if type_line.starts_with("Plane") {
            parsed.sub_types.push(tail.trim().to_string());
        } else {
            let mut joined = tail.to_string();
            for special in MULTI_WORD_SUB_TYPES {
                if joined.contains(special) {
                    joined = joined.replace(special, &special.replace(' ', "\u{0}"));
                }
            }
            parsed.sub_types = joined
                .split_whitespace()
                .map(|part| part.replace('\u{0}', " "))
                .collect();
        }
    }

    for word in head.split_whitespace() {
        if SUPER_TYPES.contains(&word) {
            parsed.super_types.push(word.to_string());
        } else {
            parsed.types.push(word.to_string());
        }
    }

    parsed
}
