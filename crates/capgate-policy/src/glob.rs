//! Glob patterns for resource paths and action names.
//!
//! Supported syntax:
//! - `*` - any run of characters except `/`
//! - `**` - any run of characters including `/`; as a whole segment
//!   followed by `/` (`a/**/b`) it may also match zero segments
//! - `?` - exactly one character except `/`
//! - `[abc]`, `[a-z]`, `[!a]`, `[^a]` - one character from a class (never `/`)
//! - `@(a|b)` - exactly one alternative
//! - `?(a|b)` - zero or one alternative
//! - `+(a|b)` - one or more alternatives
//! - `*(a|b)` - zero or more alternatives
//! - `!(a|b)` - any run within one segment that matches no alternative
//! - `\x` - the literal character `x`
//!
//! Malformed constructs (an unclosed `[` or group) are taken literally, so
//! compiling a pattern never fails.

use std::collections::BTreeSet;

/// Characters that make a pattern worth compiling.
const META: [char; 5] = ['*', '?', '[', '(', '\\'];

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Glob {
    source: String,
    tokens: Vec<Token>,
    literal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyChar,
    Star,
    Globstar,
    GlobstarSegment,
    Class(CharClass),
    Group(ExtGroup),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CharClass {
    negated: bool,
    items: Vec<ClassItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtGroup {
    kind: GroupKind,
    alternatives: Vec<Vec<Token>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    Not,
    ExactlyOne,
    OneOrMore,
    ZeroOrMore,
    ZeroOrOne,
}

impl GroupKind {
    fn from_prefix(c: char) -> Option<Self> {
        match c {
            '!' => Some(Self::Not),
            '@' => Some(Self::ExactlyOne),
            '+' => Some(Self::OneOrMore),
            '*' => Some(Self::ZeroOrMore),
            '?' => Some(Self::ZeroOrOne),
            _ => None,
        }
    }
}

impl Glob {
    /// Compile a pattern.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let literal = Self::is_literal_pattern(pattern);
        let tokens = if literal {
            Vec::new()
        } else {
            let chars: Vec<char> = pattern.chars().collect();
            parse(&chars)
        };
        Self {
            source: pattern.to_string(),
            tokens,
            literal,
        }
    }

    /// Whether a pattern has no glob syntax and can be compared by equality.
    #[must_use]
    pub fn is_literal_pattern(pattern: &str) -> bool {
        !pattern.contains(META)
    }

    /// Check a candidate string against this pattern.
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        if self.literal {
            return self.source == candidate;
        }
        let text: Vec<char> = candidate.chars().collect();
        match_ends(&self.tokens, &text, 0).contains(&text.len())
    }

    /// The original pattern string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern is a plain string.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.literal
    }
}

impl std::fmt::Display for Glob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Match a candidate against a pattern without caching.
///
/// Prefer [`crate::PathMatcher`] on hot paths; it memoizes compilation.
#[must_use]
pub fn matches(candidate: &str, pattern: &str) -> bool {
    if Glob::is_literal_pattern(pattern) {
        return candidate == pattern;
    }
    Glob::new(pattern).is_match(candidate)
}

// -- Parsing --

fn parse(mut rest: &[char]) -> Vec<Token> {
    let mut tokens = Vec::new();

    while let Some((&c, tail)) = rest.split_first() {
        if let Some(kind) = GroupKind::from_prefix(c)
            && let Some(('(', body)) = tail.split_first()
            && let Some((group, after)) = parse_group(kind, body)
        {
            tokens.push(Token::Group(group));
            rest = after;
            continue;
        }

        match c {
            '\\' => match tail.split_first() {
                Some((&escaped, after)) => {
                    tokens.push(Token::Literal(escaped));
                    rest = after;
                },
                None => {
                    tokens.push(Token::Literal('\\'));
                    rest = tail;
                },
            },
            '*' => {
                let run = rest.iter().take_while(|&&ch| ch == '*').count();
                let after = &rest[run..];
                if run == 1 {
                    tokens.push(Token::Star);
                    rest = after;
                } else if at_segment_start(&tokens)
                    && let Some(('/', after_slash)) = after.split_first()
                {
                    tokens.push(Token::GlobstarSegment);
                    rest = after_slash;
                } else {
                    tokens.push(Token::Globstar);
                    rest = after;
                }
            },
            '?' => {
                tokens.push(Token::AnyChar);
                rest = tail;
            },
            '[' => {
                if let Some((class, after)) = parse_class(tail) {
                    tokens.push(Token::Class(class));
                    rest = after;
                } else {
                    tokens.push(Token::Literal('['));
                    rest = tail;
                }
            },
            _ => {
                tokens.push(Token::Literal(c));
                rest = tail;
            },
        }
    }

    tokens
}

fn at_segment_start(tokens: &[Token]) -> bool {
    tokens.last().is_none_or(|token| *token == Token::Literal('/'))
}

/// Parse a class body (after `[`). Returns `None` if the class never closes.
fn parse_class(input: &[char]) -> Option<(CharClass, &[char])> {
    let (negated, mut rest) = match input.split_first() {
        Some(('!' | '^', body)) => (true, body),
        _ => (false, input),
    };

    let mut items = Vec::new();
    let mut first = true;
    loop {
        let (&c, tail) = rest.split_first()?;
        // A leading `]` is a member, not the terminator.
        if c == ']' && !first {
            return Some((CharClass { negated, items }, tail));
        }
        first = false;

        let (c, tail) = if c == '\\' {
            let (&escaped, after) = tail.split_first()?;
            (escaped, after)
        } else {
            (c, tail)
        };

        if let ['-', hi, after @ ..] = tail
            && *hi != ']'
        {
            items.push(ClassItem::Range(c, *hi));
            rest = after;
        } else {
            items.push(ClassItem::Char(c));
            rest = tail;
        }
    }
}

/// Parse a group body (after `(`). Returns `None` if the group never closes.
fn parse_group(kind: GroupKind, input: &[char]) -> Option<(ExtGroup, &[char])> {
    let mut alternatives = Vec::new();
    let mut depth: usize = 0;
    let mut escaped = false;
    let mut start = 0;

    for (index, &c) in input.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => depth = depth.saturating_add(1),
            ')' if depth > 0 => depth = depth.saturating_sub(1),
            ')' => {
                alternatives.push(parse(&input[start..index]));
                let after = &input[index.saturating_add(1)..];
                return Some((ExtGroup { kind, alternatives }, after));
            },
            '|' if depth == 0 => {
                alternatives.push(parse(&input[start..index]));
                start = index.saturating_add(1);
            },
            _ => {},
        }
    }

    None
}

// -- Matching --
//
// Matching tracks the set of text offsets reachable after each token rather
// than backtracking, so repeated groups like `+(a|aa)` stay polynomial.

/// Offsets into the candidate reachable after some prefix of a pattern.
type Positions = BTreeSet<usize>;

fn segment_len(text: &[char]) -> usize {
    text.iter().position(|&c| c == '/').unwrap_or(text.len())
}

/// All offsets at which `tokens`, started at `start`, can finish.
fn match_ends(tokens: &[Token], text: &[char], start: usize) -> Positions {
    let mut current = Positions::from([start]);
    for token in tokens {
        if current.is_empty() {
            break;
        }
        let mut next = Positions::new();
        for &at in &current {
            step(token, text, at, &mut next);
        }
        current = next;
    }
    current
}

fn step(token: &Token, text: &[char], at: usize, out: &mut Positions) {
    let rest = &text[at..];
    let one = at.saturating_add(1);

    match token {
        Token::Literal(expected) => {
            if rest.first() == Some(expected) {
                out.insert(one);
            }
        },
        Token::AnyChar => {
            if rest.first().is_some_and(|&c| c != '/') {
                out.insert(one);
            }
        },
        Token::Class(class) => {
            if rest.first().is_some_and(|&c| c != '/' && class.contains(c)) {
                out.insert(one);
            }
        },
        Token::Star => out.extend((0..=segment_len(rest)).map(|n| at.saturating_add(n))),
        Token::Globstar => out.extend(at..=text.len()),
        Token::GlobstarSegment => {
            out.insert(at);
            out.extend(
                rest.iter()
                    .enumerate()
                    .filter(|&(_, &c)| c == '/')
                    .map(|(n, _)| at.saturating_add(n).saturating_add(1)),
            );
        },
        Token::Group(group) => group.step(text, at, out),
    }
}

impl CharClass {
    fn contains(&self, c: char) -> bool {
        let hit = self.items.iter().any(|item| match *item {
            ClassItem::Char(member) => member == c,
            ClassItem::Range(lo, hi) => lo <= c && c <= hi,
        });
        hit != self.negated
    }
}

impl ExtGroup {
    fn step(&self, text: &[char], at: usize, out: &mut Positions) {
        match self.kind {
            GroupKind::ExactlyOne => out.extend(self.match_once(text, at)),
            GroupKind::ZeroOrOne => {
                out.insert(at);
                out.extend(self.match_once(text, at));
            },
            GroupKind::OneOrMore => out.extend(self.match_repeated(text, at)),
            GroupKind::ZeroOrMore => {
                out.insert(at);
                out.extend(self.match_repeated(text, at));
            },
            GroupKind::Not => {
                let seg = segment_len(&text[at..]);
                for n in 0..=seg {
                    let end = at.saturating_add(n);
                    if !self.match_whole(&text[..end], at) {
                        out.insert(end);
                    }
                }
            },
        }
    }

    fn match_once(&self, text: &[char], at: usize) -> Positions {
        self.alternatives
            .iter()
            .flat_map(|alt| match_ends(alt, text, at))
            .collect()
    }

    /// One or more repetitions; each repetition must consume input.
    fn match_repeated(&self, text: &[char], at: usize) -> Positions {
        let mut reached = Positions::new();
        let mut frontier = vec![at];
        while let Some(from) = frontier.pop() {
            for end in self.match_once(text, from) {
                if end > from && reached.insert(end) {
                    frontier.push(end);
                }
            }
        }
        reached
    }

    /// Whether some alternative consumes exactly `text[at..]`.
    fn match_whole(&self, text: &[char], at: usize) -> bool {
        self.alternatives
            .iter()
            .any(|alt| match_ends(alt, text, at).contains(&text.len()))
    }
}
