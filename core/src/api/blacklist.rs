//! Textual keyword blacklist.
//!
//! The blacklist is checked against the raw source before tokenizing. It is a
//! heuristic: a forbidden word inside a string literal is still rejected, and
//! it offers no protection beyond the words it lists.

use std::collections::BTreeSet;

use crate::parser::Span;

/// Identifiers rejected by default.
pub const DEFAULT_BLACKLIST: [&str; 8] = [
    "constructor",
    "__proto__",
    "prototype",
    "this",
    "window",
    "global",
    "eval",
    "Function",
];

/// A set of identifiers that may not appear anywhere in an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blacklist {
    words: BTreeSet<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        DEFAULT_BLACKLIST.into_iter().collect()
    }
}

impl Blacklist {
    /// A blacklist that rejects nothing.
    pub fn empty() -> Self {
        Self {
            words: BTreeSet::new(),
        }
    }

    /// Add a word. Empty words are ignored.
    pub fn insert(&mut self, word: impl Into<String>) -> bool {
        let word = word.into();
        !word.is_empty() && self.words.insert(word)
    }

    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Find the first blacklisted word that appears in `source` as a whole
    /// word, returning it with its byte span.
    pub fn find_in(&self, source: &str) -> Option<(&str, Span)> {
        self.words
            .iter()
            .filter_map(|word| {
                find_word(source, word).map(|start| (word.as_str(), Span(start..start + word.len())))
            })
            .min_by_key(|(_, span)| span.start())
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut blacklist = Blacklist::empty();
        blacklist.extend(iter);
        blacklist
    }
}

impl<S: Into<String>> Extend<S> for Blacklist {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word);
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte offset of the first occurrence of `word` bounded by non-word
/// characters (or the ends of `source`).
fn find_word(source: &str, word: &str) -> Option<usize> {
    source.match_indices(word).map(|(start, _)| start).find(|&start| {
        let before = source[..start].chars().next_back();
        let after = source[start + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}
