use std::{borrow::Cow, fmt::Display};

/// Furigana distributed over a body.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Furigana<'a> {
    /// The segments of the body in order. Their concatenation is the original body.
    pub segments: Vec<FuriganaSegment<'a>>,
    /// How the segments were produced.
    pub kind: Kind,
}

impl<'a> Furigana<'a> {
    /// The whole reading applied to the whole body.
    pub fn verbatim(body: &'a str, reading: &'a str) -> Self {
        Self {
            segments: vec![FuriganaSegment {
                segment: body,
                furigana: Cow::Borrowed(reading),
            }],
            kind: Kind::Verbatim,
        }
    }

    /// Returns a displayable ruby rendering that uses the given style.
    pub fn ruby<'f>(&'f self, style: &'f Style) -> Ruby<'f, 'a> {
        Ruby {
            furigana: self,
            style,
        }
    }
}

/// Prints the body with its furigana using HTML ruby tags and the default style.
impl Display for Furigana<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.ruby(&Style::DEFAULT), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuriganaSegment<'a> {
    /// A segment of the original body.
    pub segment: &'a str,
    /// The furigana corresponding to the segment.
    /// Empty for segments that need no furigana, such as kana.
    pub furigana: Cow<'a, str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// The reading was matched against the body and split between its kanji.
    Aligned,
    /// The reading applies to the whole body as is.
    Verbatim,
    /// Each character of the body carries the same emphasis mark.
    EmphasisDots,
}

/// How ruby is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Style {
    /// Shown around the furigana where ruby is unsupported.
    pub parens: Option<(char, char)>,
    pub lang: Option<String>,
}

impl Style {
    pub const DEFAULT: Self = Self {
        parens: Some(('【', '】')),
        lang: None,
    };
}

impl Default for Style {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// HTML ruby rendering of furigana.
#[derive(Debug, Clone, Copy)]
pub struct Ruby<'f, 'a> {
    furigana: &'f Furigana<'a>,
    style: &'f Style,
}

impl Display for Ruby<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<ruby")?;
        if let Some(lang) = &self.style.lang {
            write!(f, " lang=\"{}\"", Escaped(lang))?;
        }
        write!(f, ">")?;
        for segment in &self.furigana.segments {
            write!(f, "{}", Escaped(segment.segment))?;
            let furigana = Escaped(&segment.furigana);
            match (self.furigana.kind, self.style.parens) {
                (Kind::EmphasisDots, _) | (_, None) => write!(f, "<rt>{}</rt>", furigana)?,
                _ if segment.furigana.is_empty() => write!(f, "<rt></rt>")?,
                (_, Some((open, close))) => {
                    let (mut open_buf, mut close_buf) = ([0; 4], [0; 4]);
                    write!(
                        f,
                        "<rp>{}</rp><rt>{}</rt><rp>{}</rp>",
                        Escaped(open.encode_utf8(&mut open_buf)),
                        furigana,
                        Escaped(close.encode_utf8(&mut close_buf)),
                    )?
                }
            }
        }
        write!(f, "</ruby>")?;
        Ok(())
    }
}

struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rest = self.0;
        while let Some(idx) = rest.find(|c: char| matches!(c, '&' | '<' | '>' | '"')) {
            f.write_str(&rest[..idx])?;
            let escaped = match rest.as_bytes()[idx] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                _ => "&quot;",
            };
            f.write_str(escaped)?;
            rest = &rest[idx + 1..];
        }
        f.write_str(rest)
    }
}
