//! Annotation syntax
//!
//! Field annotations are compact rule lists:
//!
//! ```text
//! tag    ::= token (',' token)*
//! token  ::= name | name '(' params ')'
//! params ::= param (',' param)*
//! ```
//!
//! Commas split tokens only at parenthesis depth zero. Inside a token the
//! parenthesized body is split on every comma, so a nested group such as
//! `tokA((x,y))` yields the raw fragments `(x` and `y)`. There is no quoting
//! or escaping. The tokens `dive`, `alloc` and `-` are reserved.

pub mod cache;

pub use cache::{AnnotationCache, AnnotationKey, AnnotationKind};

use std::fmt;

/// Descend into a nested record or into every element of a collection.
pub const DIVE: &str = "dive";

/// Allocate an empty collection behind a null pointer.
pub const ALLOC: &str = "alloc";

/// Explicitly disables the annotation.
pub const DISABLED: &str = "-";

/// One decoded annotation token: a rule name and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedRule {
    /// Rule name, trimmed.
    pub name: String,
    /// Parameters in declaration order, trimmed.
    pub params: Vec<String>,
}

impl ParsedRule {
    /// Creates a parsed rule.
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Returns true for `dive`, `alloc` and `-`.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }
}

impl fmt::Display for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}({})", self.name, self.params.join(","))
        }
    }
}

/// Returns true for the reserved tokens `dive`, `alloc` and `-`.
#[must_use]
pub fn is_reserved(token: &str) -> bool {
    matches!(token, DIVE | ALLOC | DISABLED)
}

/// Returns true when the annotation is exactly the `dive` token.
#[must_use]
pub fn is_dive(raw: &str) -> bool {
    raw.trim() == DIVE
}

/// Parses a raw annotation into its rule tokens.
///
/// Empty and disabled (`-`) annotations parse to an empty list. Empty tokens
/// from leading, trailing or doubled commas are dropped, as are empty
/// parameters.
#[must_use]
pub fn parse_annotation(raw: &str) -> Vec<ParsedRule> {
    let raw = raw.trim();
    if raw.is_empty() || raw == DISABLED {
        return Vec::new();
    }

    split_top_level(raw)
        .into_iter()
        .filter_map(parse_token)
        .collect()
}

fn split_top_level(raw: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    tokens.push(&raw[start..]);
    tokens
}

fn parse_token(token: &str) -> Option<ParsedRule> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let Some(open) = token.find('(') else {
        return Some(ParsedRule::new(token, Vec::new()));
    };

    let name = token[..open].trim();
    let rest = &token[open + 1..];
    let body = rest.strip_suffix(')').unwrap_or(rest);
    let params = body
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();

    Some(ParsedRule::new(name, params))
}
