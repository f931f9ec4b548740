//! Normalizes the separators and combinators in a reading.

use crate::options::RecognizedSets;
use std::ops::Range;

pub const SEPARATOR: char = '.';
pub const COMBINATOR: char = '+';

/// A separator or a combinator in a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    Separator,
    Combinator,
}

/// A single character of a reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// The byte range of the character in the original reading.
    pub range: Range<usize>,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Char(char),
    Marker(Marker),
}

fn marker(c: char, sets: &RecognizedSets) -> Option<Marker> {
    if sets.is_separator(c) {
        Some(Marker::Separator)
    } else if sets.is_combinator(c) {
        Some(Marker::Combinator)
    } else {
        None
    }
}

/// Splits the reading into tokens, one per character.
pub fn tokenize(reading: &str, sets: &RecognizedSets) -> Vec<Token> {
    reading
        .char_indices()
        .map(|(idx, c)| Token {
            range: idx..idx + c.len_utf8(),
            kind: match marker(c, sets) {
                Some(marker) => TokenKind::Marker(marker),
                None => TokenKind::Char(c),
            },
        })
        .collect()
}

/// Replaces every separator in the reading with `.` and every combinator with `+`.
pub fn normalize(reading: &str, sets: &RecognizedSets) -> String {
    reading
        .chars()
        .map(|c| match marker(c, sets) {
            Some(Marker::Separator) => SEPARATOR,
            Some(Marker::Combinator) => COMBINATOR,
            None => c,
        })
        .collect()
}
