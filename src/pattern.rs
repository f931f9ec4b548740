//! Compiles a body into a pattern and matches it against readings.

use crate::{
    reading::{Marker, Token, TokenKind},
    segmentation::{Boundary, CharClass, Walk},
    utils,
};
use std::ops::{ControlFlow, Range};

/// Matching stops after this many matches, which is treated as too ambiguous to align.
pub const MATCH_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    /// Captures one or more characters that aren't separators or combinators.
    Reading,
    /// An optional separator or combinator.
    Boundary { captured: bool },
    /// An optional separator.
    SeparatorOnly,
    /// Kana that must appear in the reading as is.
    Literal(char),
    /// Captures the reading of this many consecutive kanji,
    /// split into groups only where the reading has a separator.
    Run(usize),
}

/// A captured part of a reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capture {
    /// The byte range of the reading claimed by a kanji.
    Reading(Range<usize>),
    /// The marker between two kanji, if any.
    Boundary(Option<Marker>),
    /// The token range of the reading claimed by a group of kanji in a run.
    Group { kanji: usize, tokens: Range<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEnd {
    /// Every match was visited.
    Exhausted,
    /// The visitor asked to stop.
    Stopped,
    /// Hit `MATCH_LIMIT`.
    LimitReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Search {
    pub matches: usize,
    pub end: SearchEnd,
}

/// A pattern compiled from a body, valid only for that body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    nodes: Vec<Node>,
    kana_insensitive: bool,
}

impl Pattern {
    /// Returns `None` when the body has no kanji or kana.
    pub fn compile(body: &str, kana_insensitive: bool) -> Option<Self> {
        let mut nodes = vec![];
        let mut matchable = false;
        for step in Walk::new(body) {
            match step.boundary {
                Boundary::None => {}
                Boundary::Captured => nodes.push(Node::Boundary { captured: true }),
                Boundary::Optional => nodes.push(Node::Boundary { captured: false }),
                Boundary::SeparatorOnly => nodes.push(Node::SeparatorOnly),
            }
            match step.class {
                CharClass::Logographic => {
                    nodes.push(Node::Reading);
                    matchable = true;
                }
                CharClass::Syllabic => {
                    nodes.push(Node::Literal(step.c));
                    matchable = true;
                }
                // other characters say nothing about the reading
                CharClass::Other => {}
            }
        }

        if matchable {
            Some(Self {
                nodes,
                kana_insensitive,
            })
        } else {
            None
        }
    }

    /// The same pattern with every run of consecutive kanji matched as a whole.
    /// Its matches capture groups instead of the reading of each kanji,
    /// so ways of dividing a reading inside a group are not told apart.
    pub fn fused(&self) -> Self {
        let mut nodes = vec![];
        for &node in &self.nodes {
            match node {
                // only ever found between two kanji
                Node::Boundary { captured: true } => {}
                Node::Reading => match nodes.last_mut() {
                    Some(Node::Run(kanji)) => *kanji += 1,
                    _ => nodes.push(Node::Run(1)),
                },
                node => nodes.push(node),
            }
        }
        Self {
            nodes,
            kana_insensitive: self.kana_insensitive,
        }
    }

    /// The number of runs of kanji, which only a fused pattern has.
    pub fn runs(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Run(_)))
            .count()
    }

    /// Visits every way the pattern matches the whole reading.
    /// The captures are given in the order the body was walked in.
    pub fn search<F>(&self, tokens: &[Token], visit: F) -> Search
    where
        F: FnMut(&[Capture]) -> ControlFlow<()>,
    {
        let mut matcher = Matcher {
            pattern: self,
            tokens,
            dead: vec![false; self.nodes.len() * (tokens.len() + 1)],
            captures: vec![],
            matches: 0,
            visit,
        };
        let end = match matcher.run(0, 0) {
            Ok(_) => SearchEnd::Exhausted,
            Err(Stop::Visitor) => SearchEnd::Stopped,
            Err(Stop::Limit) => SearchEnd::LimitReached,
        };
        Search {
            matches: matcher.matches,
            end,
        }
    }
}

enum Stop {
    Visitor,
    Limit,
}

struct Matcher<'p, 't, F> {
    pattern: &'p Pattern,
    tokens: &'t [Token],
    // (node, position) states known to have no way to finish the match
    dead: Vec<bool>,
    captures: Vec<Capture>,
    matches: usize,
    visit: F,
}

impl<F> Matcher<'_, '_, F>
where
    F: FnMut(&[Capture]) -> ControlFlow<()>,
{
    // returns whether any match was found from this state
    fn run(&mut self, node: usize, pos: usize) -> Result<bool, Stop> {
        let Some(&current) = self.pattern.nodes.get(node) else {
            // anchored at the end, leftover reading is not a match
            if pos != self.tokens.len() {
                return Ok(false);
            }
            self.matches += 1;
            if (self.visit)(&self.captures).is_break() {
                return Err(Stop::Visitor);
            }
            if self.matches >= MATCH_LIMIT {
                return Err(Stop::Limit);
            }
            return Ok(true);
        };

        let state = node * (self.tokens.len() + 1) + pos;
        if self.dead[state] {
            return Ok(false);
        }

        let found = match current {
            Node::Reading => {
                let available = self.tokens[pos..]
                    .iter()
                    .take_while(|t| matches!(t.kind, TokenKind::Char(_)))
                    .count();
                let mut found = false;
                // longest first
                for end in (pos + 1..=pos + available).rev() {
                    let range = self.tokens[pos].range.start..self.tokens[end - 1].range.end;
                    self.captures.push(Capture::Reading(range));
                    let res = self.run(node + 1, end);
                    self.captures.pop();
                    found |= res?;
                }
                found
            }
            Node::Boundary { captured } => {
                let mut found = false;
                if let Some(marker) = self.marker_at(pos) {
                    found |= self.optional(node, pos + 1, captured.then_some(Some(marker)))?;
                }
                found |= self.optional(node, pos, captured.then_some(None))?;
                found
            }
            Node::SeparatorOnly => {
                let mut found = false;
                if self.marker_at(pos) == Some(Marker::Separator) {
                    found |= self.run(node + 1, pos + 1)?;
                }
                found |= self.run(node + 1, pos)?;
                found
            }
            Node::Literal(kana) => match self.tokens.get(pos).map(|t| t.kind) {
                Some(TokenKind::Char(c)) if self.literal_matches(kana, c) => {
                    self.run(node + 1, pos + 1)?
                }
                _ => false,
            },
            Node::Run(kanji) => self.group(node, pos, kanji)?,
        };

        if !found {
            self.dead[state] = true;
        }
        Ok(found)
    }

    // continues after an optional boundary, capturing it if needed
    fn optional(
        &mut self,
        node: usize,
        pos: usize,
        capture: Option<Option<Marker>>,
    ) -> Result<bool, Stop> {
        match capture {
            Some(marker) => {
                self.captures.push(Capture::Boundary(marker));
                let res = self.run(node + 1, pos);
                self.captures.pop();
                res
            }
            None => self.run(node + 1, pos),
        }
    }

    // matches the next group of a run that still has `kanji` kanji left
    fn group(&mut self, node: usize, pos: usize, kanji: usize) -> Result<bool, Stop> {
        let available = self.tokens[pos..]
            .iter()
            .take_while(|t| t.kind != TokenKind::Marker(Marker::Separator))
            .count();
        let mut found = false;
        // longest first, then the largest group first
        for end in (pos + 1..=pos + available).rev() {
            let Some((chars, combinators)) = group_shape(&self.tokens[pos..end]) else {
                continue;
            };
            // every kanji needs a character and every combinator ends a kanji
            for size in (combinators + 1..=chars.min(kanji)).rev() {
                self.captures.push(Capture::Group {
                    kanji: size,
                    tokens: pos..end,
                });
                let res = if size == kanji {
                    self.run(node + 1, end)
                } else if self.marker_at(end) == Some(Marker::Separator) {
                    self.group(node, end + 1, kanji - size)
                } else {
                    Ok(false)
                };
                self.captures.pop();
                found |= res?;
            }
        }
        Ok(found)
    }

    fn marker_at(&self, pos: usize) -> Option<Marker> {
        match self.tokens.get(pos)?.kind {
            TokenKind::Marker(marker) => Some(marker),
            TokenKind::Char(_) => None,
        }
    }

    fn literal_matches(&self, kana: char, c: char) -> bool {
        kana == c || self.pattern.kana_insensitive && utils::kana_equivalent(kana, c)
    }
}

// counts the characters and combinators of a group,
// which can't start or end with a combinator or have two in a row
fn group_shape(tokens: &[Token]) -> Option<(usize, usize)> {
    let (mut chars, mut combinators) = (0, 0);
    let mut after_char = false;
    for token in tokens {
        match token.kind {
            TokenKind::Char(_) => {
                chars += 1;
                after_char = true;
            }
            TokenKind::Marker(_) if after_char => {
                combinators += 1;
                after_char = false;
            }
            TokenKind::Marker(_) => return None,
        }
    }
    after_char.then_some((chars, combinators))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{options::RecognizedSets, reading::tokenize};

    // collects every match as readable strings
    fn collect(pattern: &Pattern, reading: &str) -> Vec<Vec<String>> {
        let tokens = tokenize(reading, &RecognizedSets::default());
        let mut found = vec![];
        pattern.search(&tokens, |captures| {
            found.push(
                captures
                    .iter()
                    .map(|c| match c {
                        Capture::Reading(range) => reading[range.clone()].to_string(),
                        Capture::Boundary(Some(Marker::Separator)) => ".".to_string(),
                        Capture::Boundary(Some(Marker::Combinator)) => "+".to_string(),
                        Capture::Boundary(None) => String::new(),
                        Capture::Group { kanji, tokens: group } => {
                            let text = &reading
                                [tokens[group.start].range.start..tokens[group.end - 1].range.end];
                            format!("{text}/{kanji}")
                        }
                    })
                    .collect(),
            );
            ControlFlow::Continue(())
        });
        found
    }

    fn matches(body: &str, reading: &str) -> Vec<Vec<String>> {
        collect(&Pattern::compile(body, false).unwrap(), reading)
    }

    fn fused_matches(body: &str, reading: &str) -> Vec<Vec<String>> {
        collect(&Pattern::compile(body, false).unwrap().fused(), reading)
    }

    #[test]
    fn compiles_nothing_for_other() {
        assert!(Pattern::compile("cat", false).is_none());
        assert!(Pattern::compile("！？", false).is_none());
        assert!(Pattern::compile("だ", false).is_some());
    }

    #[test]
    fn compiles_nodes() {
        let pattern = Pattern::compile("猫！だw", false).unwrap();
        assert_eq!(
            pattern.nodes,
            vec![
                Node::Reading,
                Node::SeparatorOnly,
                Node::Literal('だ'),
                Node::SeparatorOnly,
            ]
        );
    }

    #[test]
    fn matches_kanji_and_kana() {
        assert_eq!(matches("食べる", "たべる"), vec![vec!["た"]]);
        assert_eq!(matches("取り返す", "とりかえす"), vec![vec!["と", "かえ"]]);
    }

    #[test]
    fn matches_separated_kanji() {
        assert_eq!(matches("漢字", "かん.じ"), vec![vec!["かん", ".", "じ"]]);
        assert_eq!(matches("漢字", "kan・ji"), vec![vec!["kan", ".", "ji"]]);
    }

    #[test]
    fn enumerates_ambiguous_matches_longest_first() {
        assert_eq!(
            matches("漢字", "かんじ"),
            vec![vec!["かん", "", "じ"], vec!["か", "", "んじ"]]
        );
    }

    #[test]
    fn anchors_both_ends() {
        assert!(matches("猫だ", "ねこだよ").is_empty());
        assert!(matches("は猫", "これはねこ").is_empty());
    }

    #[test]
    fn consumes_separator_before_other() {
        assert_eq!(
            matches("猫！？可", "ねこ.か"),
            vec![vec!["ねこ", "か"]]
        );
        // only separators are allowed there
        assert!(matches("猫！？可", "ねこ+か").is_empty());
    }

    #[test]
    fn literal_is_exact_unless_insensitive() {
        let tokens = tokenize("たベる", &RecognizedSets::default());
        let exact = Pattern::compile("食べる", false).unwrap();
        assert_eq!(exact.search(&tokens, |_| ControlFlow::Continue(())).matches, 0);
        let insensitive = Pattern::compile("食べる", true).unwrap();
        assert_eq!(
            insensitive
                .search(&tokens, |_| ControlFlow::Continue(()))
                .matches,
            1
        );
    }

    #[test]
    fn stops_at_limit() {
        let body = "犬".repeat(12);
        let reading = "い".repeat(24);
        let pattern = Pattern::compile(&body, false).unwrap();
        let tokens = tokenize(&reading, &RecognizedSets::default());
        let search = pattern.search(&tokens, |_| ControlFlow::Continue(()));
        assert_eq!(search.end, SearchEnd::LimitReached);
        assert_eq!(search.matches, MATCH_LIMIT);
    }

    #[test]
    fn stops_when_asked() {
        let pattern = Pattern::compile("漢字", false).unwrap();
        let tokens = tokenize("かんじ", &RecognizedSets::default());
        let search = pattern.search(&tokens, |_| ControlFlow::Break(()));
        assert_eq!(
            search,
            Search {
                matches: 1,
                end: SearchEnd::Stopped
            }
        );
    }

    #[test]
    fn fuses_kanji_runs() {
        let pattern = Pattern::compile("東京特許許可局で働く", false).unwrap();
        assert_eq!(pattern.runs(), 0);
        assert_eq!(pattern.fused().runs(), 2);
        assert_eq!(
            pattern.fused().nodes,
            vec![
                Node::Run(7),
                Node::Boundary { captured: false },
                Node::Literal('で'),
                Node::Boundary { captured: false },
                Node::Run(1),
                Node::Boundary { captured: false },
                Node::Literal('く'),
            ]
        );
    }

    #[test]
    fn matches_runs_as_a_whole() {
        assert_eq!(fused_matches("漢字", "かんじ"), vec![vec!["かんじ/2"]]);
        assert_eq!(
            fused_matches("可愛い犬", "か+わい.い.いぬ"),
            vec![vec!["か+わい/2", "いぬ/1"]]
        );
        // a combinator ends a kanji, so two of them need three kanji
        assert!(fused_matches("可愛", "か+わ+い").is_empty());
    }

    #[test]
    fn splits_runs_only_at_separators() {
        assert_eq!(
            fused_matches("漢字", "かん.じ"),
            vec![vec!["かん/1", "じ/1"]]
        );
        // the separator is either the one after 猫 or the one between 可 and 愛
        assert_eq!(
            matches("猫！？可愛い！！！w", "ねこ.かわいい").len(),
            3
        );
        assert_eq!(
            fused_matches("猫！？可愛い！！！w", "ねこ.かわいい"),
            vec![vec!["ねこ/1", "かわい/2"], vec!["ね/1", "こ/1", "かわい/1"]]
        );
    }

    #[test]
    fn fused_runs_stay_below_limit() {
        let body = "犬".repeat(12);
        let reading = "い".repeat(24);
        let pattern = Pattern::compile(&body, false).unwrap().fused();
        let tokens = tokenize(&reading, &RecognizedSets::default());
        let search = pattern.search(&tokens, |_| ControlFlow::Continue(()));
        assert_eq!(
            search,
            Search {
                matches: 1,
                end: SearchEnd::Exhausted
            }
        );
    }
}
