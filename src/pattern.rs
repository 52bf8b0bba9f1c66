//! Patterns and the matcher contract.
//!
//! The resolution engine never looks inside a pattern. It only needs two
//! things from one:
//!
//! - whether it is *final-only* (skipped while the transcript is still an
//!   interim guess), and
//! - an answer from a [`PatternMatcher`] to "does this pattern match this
//!   hypothesis?".
//!
//! A production deployment plugs its own phrase grammar in behind
//! [`PatternMatcher`]. [`WordMatcher`] is the bundled matcher: it understands
//! ordered word sequences and regular expressions, which is enough for the
//! companion catalog, the CLI and the tests.

use std::fmt;

use regex::Regex;

use crate::error::MatchError;

/// What a pattern looks for.
#[derive(Debug, Clone)]
enum PatternKind {
    /// Normalized words that must appear in this order (not necessarily
    /// adjacent) in the hypothesis.
    Words(Vec<String>),
    /// A regular expression tested against the raw hypothesis.
    Regex(Regex),
}

#[derive(Debug, Clone)]
pub struct Pattern {
    kind: PatternKind,
    final_only: bool,
}

impl Pattern {
    /// Build a word-sequence pattern, e.g. `Pattern::words("good question")`.
    pub fn words(phrase: &str) -> Self {
        Pattern { kind: PatternKind::Words(tokenize(phrase)), final_only: false }
    }

    pub fn regex(re: Regex) -> Self {
        Pattern { kind: PatternKind::Regex(re), final_only: false }
    }

    /// Only consider this pattern once the recognizer has confirmed the
    /// transcript. Useful for short phrases that interim guesses hallucinate.
    pub fn final_only(mut self) -> Self {
        self.final_only = true;
        self
    }

    pub fn is_final_only(&self) -> bool {
        self.final_only
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PatternKind::Words(words) => write!(f, "\"{}\"", words.join(" "))?,
            PatternKind::Regex(re) => write!(f, "/{}/", re.as_str())?,
        }
        if self.final_only {
            f.write_str(" (final)")?;
        }
        Ok(())
    }
}

/// Answers "does `pattern` match `hypothesis`?".
///
/// Implementations must be pure: the resolver may ask the same question
/// several times during one resolution. A returned error aborts the
/// resolution attempt.
pub trait PatternMatcher {
    fn matches(&self, hypothesis: &str, pattern: &Pattern) -> Result<bool, MatchError>;
}

impl<M: PatternMatcher + ?Sized> PatternMatcher for &M {
    fn matches(&self, hypothesis: &str, pattern: &Pattern) -> Result<bool, MatchError> {
        (**self).matches(hypothesis, pattern)
    }
}

/// The bundled matcher: ordered word subsequences and regexes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordMatcher;

impl PatternMatcher for WordMatcher {
    fn matches(&self, hypothesis: &str, pattern: &Pattern) -> Result<bool, MatchError> {
        Ok(match &pattern.kind {
            PatternKind::Words(words) => contains_in_order(&tokenize(hypothesis), words),
            PatternKind::Regex(re) => re.is_match(hypothesis),
        })
    }
}

/// Lowercase and split on whitespace, trimming punctuation around each word.
///
/// Apostrophes inside words are kept ("that's"), and typographic apostrophes
/// are folded to ASCII so recognizers that emit either spelling agree.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_in_order(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut wanted = needle.iter().peekable();
    for word in haystack {
        if wanted.peek().is_some_and(|w| *w == word) {
            wanted.next();
        }
    }
    wanted.peek().is_none()
}
