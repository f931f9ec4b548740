//! Options and the character sets derived from them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_SEPARATORS: &[char] = &['.', '．', '。', '・', '|', '｜', '/', '／'];
const DEFAULT_COMBINATORS: &[char] = &['+', '＋'];
const DEFAULT_FALLBACK_PARENS: &str = "【】";

/// Caller-supplied options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Characters that split the reading between kanji in addition to whitespace and `.．。・|｜/／`.
    pub extra_separators: String,
    /// Characters that mark a kanji boundary without splitting the reading, in addition to `+＋`.
    pub extra_combinators: String,
    /// The opening and closing parentheses shown around readings where ruby is unsupported.
    /// An empty string leaves them out.
    pub fallback_parens: String,
    /// Language tag for the `lang` attribute of rendered ruby.
    pub lang: Option<String>,
    /// Whether kana in the body matches the reading regardless of hiragana and katakana.
    pub kana_insensitive: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            extra_separators: String::new(),
            extra_combinators: String::new(),
            fallback_parens: DEFAULT_FALLBACK_PARENS.to_string(),
            lang: None,
            kana_insensitive: false,
        }
    }
}

impl Options {
    /// Returns the opening and closing fallback parentheses, if any.
    pub(crate) fn parens(&self) -> Result<Option<(char, char)>> {
        let mut chars = self.fallback_parens.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (None, _, _) => Ok(None),
            (Some(open), Some(close), None) => Ok(Some((open, close))),
            _ => Err(Error::FallbackParens(self.fallback_parens.clone())),
        }
    }
}

/// The characters recognised as separators and combinators in readings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RecognizedSets {
    extra_separators: Vec<char>,
    extra_combinators: Vec<char>,
}

impl RecognizedSets {
    /// Extends the default sets with the extra characters in the options.
    pub fn new(options: &Options) -> Result<Self> {
        let extra_separators = options.extra_separators.chars().collect::<Vec<_>>();
        let extra_combinators = options.extra_combinators.chars().collect::<Vec<_>>();

        let sets = Self {
            extra_separators,
            extra_combinators,
        };
        if let Some(c) = sets
            .extra_separators
            .iter()
            .copied()
            .find(|&c| sets.is_combinator(c))
        {
            return Err(Error::AmbiguousMarker(c));
        }
        if let Some(c) = sets
            .extra_combinators
            .iter()
            .copied()
            .find(|&c| is_default_separator(c))
        {
            return Err(Error::AmbiguousMarker(c));
        }
        Ok(sets)
    }

    pub fn is_separator(&self, c: char) -> bool {
        is_default_separator(c) || self.extra_separators.contains(&c)
    }

    pub fn is_combinator(&self, c: char) -> bool {
        DEFAULT_COMBINATORS.contains(&c) || self.extra_combinators.contains(&c)
    }
}

fn is_default_separator(c: char) -> bool {
    c.is_whitespace() || DEFAULT_SEPARATORS.contains(&c)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_sets() {
        let sets = RecognizedSets::default();
        for c in [' ', '\t', '　', '.', '．', '。', '・', '|', '｜', '/', '／'] {
            assert!(sets.is_separator(c), "{c:?}");
            assert!(!sets.is_combinator(c), "{c:?}");
        }
        for c in ['+', '＋'] {
            assert!(sets.is_combinator(c));
            assert!(!sets.is_separator(c));
        }
        assert!(!sets.is_separator('_'));
        assert!(!sets.is_combinator('*'));
    }

    #[test]
    fn extends_sets() {
        let options = Options {
            extra_separators: "_-\\]".to_string(),
            extra_combinators: "*".to_string(),
            ..Options::default()
        };
        let sets = RecognizedSets::new(&options).unwrap();
        for c in ['_', '-', '\\', ']', '.'] {
            assert!(sets.is_separator(c));
        }
        assert!(sets.is_combinator('*'));
        assert!(sets.is_combinator('+'));
    }

    #[test]
    fn rejects_ambiguous_markers() {
        let options = Options {
            extra_separators: "+".to_string(),
            ..Options::default()
        };
        assert_eq!(
            RecognizedSets::new(&options),
            Err(Error::AmbiguousMarker('+'))
        );

        let options = Options {
            extra_combinators: "・".to_string(),
            ..Options::default()
        };
        assert_eq!(
            RecognizedSets::new(&options),
            Err(Error::AmbiguousMarker('・'))
        );

        let options = Options {
            extra_separators: "_".to_string(),
            extra_combinators: "_".to_string(),
            ..Options::default()
        };
        assert_eq!(
            RecognizedSets::new(&options),
            Err(Error::AmbiguousMarker('_'))
        );
    }

    #[test]
    fn parses_parens() {
        assert_eq!(Options::default().parens(), Ok(Some(('【', '】'))));
        let options = Options {
            fallback_parens: String::new(),
            ..Options::default()
        };
        assert_eq!(options.parens(), Ok(None));
        let options = Options {
            fallback_parens: "(".to_string(),
            ..Options::default()
        };
        assert_eq!(
            options.parens(),
            Err(Error::FallbackParens("(".to_string()))
        );
    }

    #[test]
    fn deserializes_partial_options() {
        let options: Options =
            serde_json::from_str(r#"{"extraSeparators": "_", "lang": "ja-JP"}"#).unwrap();
        assert_eq!(
            options,
            Options {
                extra_separators: "_".to_string(),
                lang: Some("ja-JP".to_string()),
                ..Options::default()
            }
        );
    }
}
