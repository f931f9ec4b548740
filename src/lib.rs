#![doc = include_str!("../README.md")]

mod error;
mod furigana;
mod options;
mod pattern;
mod reading;
mod segmentation;
mod utils;

pub use self::error::{Error, Result};
pub use self::furigana::{Furigana, FuriganaSegment, Kind, Ruby, Style};
pub use self::options::{Options, RecognizedSets};
pub use self::reading::normalize;
pub use self::segmentation::{classify, CharClass};
use pattern::{Capture, Pattern, SearchEnd};
use reading::{Marker, Token, TokenKind};
use segmentation::Walk;
use std::{borrow::Cow, ops::ControlFlow, slice};
use tracing::{debug, trace};

const EMPHASIS_MARKERS: [char; 2] = ['*', '＊'];
const DISABLE_MARKERS: [char; 2] = ['=', '＝'];
const DEFAULT_EMPHASIS_MARK: &str = "●";

/// Distributes readings over bodies according to a fixed set of options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Engine {
    sets: RecognizedSets,
    kana_insensitive: bool,
    style: Style,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            sets: RecognizedSets::default(),
            kana_insensitive: false,
            style: Style::DEFAULT,
        }
    }
}

impl Engine {
    /// Validates the options.
    pub fn new(options: &Options) -> Result<Self> {
        let sets = RecognizedSets::new(options)?;
        let parens = options.parens()?;
        Ok(Self {
            sets,
            kana_insensitive: options.kana_insensitive,
            style: Style {
                parens,
                lang: options.lang.clone(),
            },
        })
    }

    /// The separators and combinators recognized in readings.
    pub fn sets(&self) -> &RecognizedSets {
        &self.sets
    }

    /// How this engine renders ruby.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Like `produce_segments`, but returns `None` if the body or the reading is blank.
    pub fn annotate<'a>(&self, body: &'a str, reading: &'a str) -> Option<Furigana<'a>> {
        if body.trim().is_empty() || reading.trim().is_empty() {
            return None;
        }
        Some(self.produce_segments(body, reading))
    }

    /// Renders the body and the reading as HTML ruby, or returns `None` if either is blank.
    pub fn render(&self, body: &str, reading: &str) -> Option<String> {
        self.annotate(body, reading)
            .map(|furigana| furigana.ruby(&self.style).to_string())
    }

    /// Splits the body into segments, each with its part of the reading.
    ///
    /// A reading starting with `=` or `＝` applies the rest of the reading to the whole body as is,
    /// and one starting with `*` or `＊` puts emphasis dots on every character of the body.
    /// Otherwise the reading is aligned with the kanji in the body.
    /// Expects both the body and the reading to be non-blank.
    pub fn produce_segments<'a>(&self, body: &'a str, reading: &'a str) -> Furigana<'a> {
        let mut chars = reading.chars();
        match chars.next() {
            Some(c) if DISABLE_MARKERS.contains(&c) => {
                trace!(body, reading, "pattern matching disabled");
                Furigana::verbatim(body, chars.as_str())
            }
            Some(c) if EMPHASIS_MARKERS.contains(&c) => emphasize(body, reading),
            _ => self.align(body, reading),
        }
    }

    /// Aligns the reading with the kanji in the body.
    /// Falls back to applying the whole reading to the whole body
    /// if the two don't match or if they match in too many ways.
    pub fn align<'a>(&self, body: &'a str, reading: &'a str) -> Furigana<'a> {
        let Some(pattern) = Pattern::compile(body, self.kana_insensitive) else {
            debug!(body, "no kanji or kana to align");
            return Furigana::verbatim(body, reading);
        };
        let tokens = reading::tokenize(reading, &self.sets);

        // kanji without a marker between them are split if all matches agree on the result
        let mut split = Candidate::Empty;
        let search = pattern.search(&tokens, |captures| {
            split.offer(|| decode(body, reading, &tokens, captures));
            if split.is_ambiguous() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        if search.matches == 0 {
            debug!(body, reading, "reading doesn't match the body");
            return Furigana::verbatim(body, reading);
        }
        if let (Candidate::Unique(segments), SearchEnd::Exhausted) = (split, search.end) {
            return Furigana {
                segments,
                kind: Kind::Aligned,
            };
        }

        // otherwise fused, if the matches with the fewest separators inside runs of kanji agree
        let pattern = pattern.fused();
        let runs = pattern.runs();
        let mut fused = Ranked::default();
        let search = pattern.search(&tokens, |captures| {
            let separators = groups(captures) - runs;
            fused.offer(separators, || decode(body, reading, &tokens, captures));
            if fused.is_settled() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        match (fused.candidate, search.end) {
            (_, SearchEnd::LimitReached) => {
                debug!(body, reading, matches = search.matches, "too many ways to match");
                Furigana::verbatim(body, reading)
            }
            (Candidate::Unique(segments), _) => {
                trace!(body, reading, "fused kanji without markers");
                Furigana {
                    segments,
                    kind: Kind::Aligned,
                }
            }
            _ => {
                debug!(body, reading, matches = search.matches, "ambiguous reading");
                Furigana::verbatim(body, reading)
            }
        }
    }

    /// Returns a displayable ruby rendering in the style of this engine.
    pub fn ruby<'f, 'a>(&'f self, furigana: &'f Furigana<'a>) -> Ruby<'f, 'a> {
        furigana.ruby(&self.style)
    }
}

/// Splits the body into segments using the default options.
pub fn produce_segments<'a>(body: &'a str, reading: &'a str) -> Furigana<'a> {
    Engine::default().produce_segments(body, reading)
}

/// Gives every character of the body the reading without its first character as an emphasis mark,
/// or `●` if nothing is left.
pub fn emphasize<'a>(body: &'a str, reading: &'a str) -> Furigana<'a> {
    let mut chars = reading.chars();
    chars.next();
    let mark = match chars.as_str() {
        "" => DEFAULT_EMPHASIS_MARK,
        mark => mark,
    };

    let segments = body
        .char_indices()
        .map(|(idx, c)| FuriganaSegment {
            segment: &body[idx..idx + c.len_utf8()],
            furigana: Cow::Borrowed(mark),
        })
        .collect();
    Furigana {
        segments,
        kind: Kind::EmphasisDots,
    }
}

// the segments all matches so far agree on
#[derive(Default)]
enum Candidate<'a> {
    #[default]
    Empty,
    Unique(Vec<FuriganaSegment<'a>>),
    Ambiguous,
}

impl<'a> Candidate<'a> {
    fn offer<F>(&mut self, decode: F)
    where
        F: FnOnce() -> Vec<FuriganaSegment<'a>>,
    {
        match self {
            Self::Empty => *self = Self::Unique(decode()),
            Self::Unique(segments) => {
                if *segments != decode() {
                    *self = Self::Ambiguous;
                }
            }
            Self::Ambiguous => {}
        }
    }

    fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous)
    }
}

// the segments the best ranked matches so far agree on, lower ranks being better
#[derive(Default)]
struct Ranked<'a> {
    rank: usize,
    candidate: Candidate<'a>,
}

impl<'a> Ranked<'a> {
    fn offer<F>(&mut self, rank: usize, decode: F)
    where
        F: FnOnce() -> Vec<FuriganaSegment<'a>>,
    {
        if matches!(self.candidate, Candidate::Empty) || rank < self.rank {
            self.rank = rank;
            self.candidate = Candidate::Unique(decode());
        } else if rank == self.rank {
            self.candidate.offer(decode);
        }
    }

    // no later match can resolve the ambiguity
    fn is_settled(&self) -> bool {
        self.candidate.is_ambiguous() && self.rank == 0
    }
}

// a run split by a separator captures one more group
fn groups(captures: &[Capture]) -> usize {
    captures
        .iter()
        .filter(|c| matches!(c, Capture::Group { .. }))
        .count()
}

// a segment that may still be extended
struct Pending<'a> {
    start: usize,
    end: usize,
    furigana: Cow<'a, str>,
}

impl<'a> Pending<'a> {
    fn finish(self, body: &'a str) -> FuriganaSegment<'a> {
        FuriganaSegment {
            segment: &body[self.start..self.end],
            furigana: self.furigana,
        }
    }
}

// walks the body again, assigning the captures to the characters they were captured for
fn decode<'a>(
    body: &'a str,
    reading: &'a str,
    tokens: &[Token],
    captures: &[Capture],
) -> Vec<FuriganaSegment<'a>> {
    let mut captures = captures.iter();
    let mut segments = vec![];
    let mut current: Option<Pending<'a>> = None;
    // kanji still covered by the last captured group
    let mut grouped = 0;
    let mut offset = 0;

    for step in Walk::new(body) {
        let start = offset;
        offset += step.text.len();

        let (extend, furigana) = match step.class {
            CharClass::Logographic if grouped > 0 => {
                grouped -= 1;
                (true, Cow::Borrowed(""))
            }
            CharClass::Logographic => match captures.next() {
                // only kanji after kanji are preceded by a boundary
                Some(Capture::Boundary(marker)) => (
                    *marker == Some(Marker::Combinator),
                    Cow::Borrowed(next_reading(&mut captures, reading)),
                ),
                Some(Capture::Reading(range)) => (false, Cow::Borrowed(&reading[range.clone()])),
                Some(Capture::Group { kanji, tokens: group }) => {
                    grouped = kanji - 1;
                    (false, group_reading(reading, &tokens[group.clone()]))
                }
                None => unreachable!("ran out of captures at {:?}", step.text),
            },
            // kana and other characters ride along until the next kanji,
            // but never share a segment with the kanji before them
            CharClass::Syllabic | CharClass::Other => {
                (step.previous != CharClass::Logographic, Cow::Borrowed(""))
            }
        };

        if extend {
            if let Some(pending) = current.as_mut() {
                pending.end = offset;
                if !furigana.is_empty() {
                    pending.furigana.to_mut().push_str(&furigana);
                }
                continue;
            }
        }
        let next = Pending {
            start,
            end: offset,
            furigana,
        };
        segments.extend(current.replace(next).map(|pending| pending.finish(body)));
    }

    segments.extend(current.map(|pending| pending.finish(body)));
    segments
}

fn next_reading<'a>(captures: &mut slice::Iter<'_, Capture>, reading: &'a str) -> &'a str {
    match captures.next() {
        Some(Capture::Reading(range)) => &reading[range.clone()],
        capture => unreachable!("expected a kanji reading, got {capture:?}"),
    }
}

// the reading of a group without its combinators
fn group_reading<'a>(reading: &'a str, tokens: &[Token]) -> Cow<'a, str> {
    let chars = || {
        tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Char(_)))
    };
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) if chars().count() == tokens.len() => {
            Cow::Borrowed(&reading[first.range.start..last.range.end])
        }
        _ => Cow::Owned(chars().map(|t| &reading[t.range.clone()]).collect()),
    }
}
