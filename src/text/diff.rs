//! Bounded token-set diff between two canonical texts
//!
//! The diff is advisory: it tells a reviewer which words appeared or
//! disappeared, not where. Repeat counts are ignored and each segment is cut
//! at `max_items` tokens.

use std::collections::BTreeSet;

/// Summary emitted when both token sets are equal
pub const NO_DIFFERENCE: &str = "NO_DIFFERENCE";

/// Added and removed tokens between two texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDiff<'a> {
    removed: Vec<&'a str>,
    added: Vec<&'a str>,
}

impl<'a> TokenDiff<'a> {
    /// Compute the set differences of the whitespace-separated tokens
    pub fn between(old: &'a str, new: &'a str) -> Self {
        let old_tokens = token_set(old);
        let new_tokens = token_set(new);

        Self {
            removed: old_tokens.difference(&new_tokens).copied().collect(),
            added: new_tokens.difference(&old_tokens).copied().collect(),
        }
    }

    /// Tokens only present in the old text, in codepoint order
    pub fn removed(&self) -> &[&'a str] {
        &self.removed
    }

    /// Tokens only present in the new text, in codepoint order
    pub fn added(&self) -> &[&'a str] {
        &self.added
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Render as `REMOVED: [..] | ADDED: [..]`, keeping at most `max_items`
    /// tokens per segment
    pub fn summary(&self, max_items: usize) -> String {
        if self.is_empty() {
            return NO_DIFFERENCE.to_string();
        }

        let mut out = String::new();
        if !self.removed.is_empty() {
            out.push_str("REMOVED: ");
            push_limited(&mut out, &self.removed, max_items);
        }
        if !self.removed.is_empty() && !self.added.is_empty() {
            out.push_str(" | ");
        }
        if !self.added.is_empty() {
            out.push_str("ADDED: ");
            push_limited(&mut out, &self.added, max_items);
        }
        out
    }
}

/// Diff two canonical texts and render the bounded summary
pub fn diff_tokens(old: &str, new: &str, max_items: usize) -> String {
    TokenDiff::between(old, new).summary(max_items)
}

fn token_set(text: &str) -> BTreeSet<&str> {
    text.split_whitespace().collect()
}

fn push_limited(out: &mut String, tokens: &[&str], max_items: usize) {
    out.push('[');
    for (i, token) in tokens.iter().take(max_items).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(token);
    }
    out.push(']');
}
