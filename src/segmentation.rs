//! Classifies the characters of a body and walks it one character at a time.

use crate::utils;

/// The class of a character in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharClass {
    /// Kanji, each of which gets its own slice of the reading.
    Logographic,
    /// Kana, which is expected to appear as is in the reading.
    Syllabic,
    /// Anything else. Never corresponds to anything in the reading.
    Other,
}

/// Classifies a single character.
pub fn classify(c: char) -> CharClass {
    if utils::is_kanji(c) {
        CharClass::Logographic
    } else if utils::is_kana(c) {
        CharClass::Syllabic
    } else {
        CharClass::Other
    }
}

/// What the pattern allows in the reading right before a character of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Boundary {
    None,
    /// Between two kanji: an optional separator or combinator whose presence is captured.
    Captured,
    /// Between kanji and kana: an optional separator or combinator.
    Optional,
    /// When entering a run of other characters: an optional separator.
    SeparatorOnly,
}

/// A single character of the body along with its place in the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Step<'a> {
    /// The character as a slice of the body.
    pub text: &'a str,
    pub c: char,
    pub class: CharClass,
    /// The class of the previous character, `CharClass::Other` at the start of the body.
    pub previous: CharClass,
    pub boundary: Boundary,
}

/// Iterator over the characters of a body.
/// Both the pattern compiler and the decoder walk the body through this iterator
/// so that captures line up with the characters that produced them.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    rest: &'a str,
    previous: CharClass,
}

impl<'a> Walk<'a> {
    pub fn new(body: &'a str) -> Self {
        Self {
            rest: body,
            previous: CharClass::Other,
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = Step<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.rest.chars().next()?;
        let len = c.len_utf8();
        let text = &self.rest[..len];
        self.rest = &self.rest[len..];

        let class = classify(c);
        let previous = self.previous;
        let boundary = match (previous, class) {
            (CharClass::Logographic, CharClass::Logographic) => Boundary::Captured,
            (CharClass::Syllabic, CharClass::Logographic)
            | (CharClass::Logographic, CharClass::Syllabic) => Boundary::Optional,
            (CharClass::Logographic | CharClass::Syllabic, CharClass::Other) => {
                Boundary::SeparatorOnly
            }
            _ => Boundary::None,
        };
        self.previous = class;

        Some(Step {
            text,
            c,
            class,
            previous,
            boundary,
        })
    }
}
