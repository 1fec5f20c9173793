//! Text canonicalization
//!
//! Extracted document text is noisy: renderers emit invisible characters,
//! split words into spaced letters, shift decimal separators and, above all,
//! do not guarantee a stable reading order. Normalization reduces a raw
//! extraction to a canonical form that compares equal for logically identical
//! content:
//!
//! 1. invisible characters removed, non-breaking spaces made ordinary
//! 2. lowercase, whitespace collapsed and trimmed
//! 3. numeric repair (`3560,25` -> `3560.25`, `3560 ,25` -> `3560,25`)
//! 4. letter-fragmentation repair (`e u r` -> `eur`)
//! 5. tokens sorted by codepoint and rejoined with single spaces
//!
//! Sorting can bring tokens next to each other that steps 3 and 4 would have
//! joined, and step 3 does not revisit its own replacements, so the pass is
//! repeated until the output no longer changes. Every repeat that changes
//! anything removes a token or a comma, which bounds the loop.

use regex::Regex;
use std::sync::LazyLock;

/// `<digit>,<digit>`
static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]),([0-9])").expect("Invalid decimal regex"));

/// `<digit> <separator>`
static DIGIT_SPACE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9])\s+([.,])").expect("Invalid separator regex"));

/// `<separator> <digit>`
static SEPARATOR_SPACE_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,])\s+([0-9])").expect("Invalid separator regex"));

/// Canonicalize raw extracted text
///
/// Deterministic and idempotent; blank input yields an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut current = normalize_pass(raw);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One application of all five steps
fn normalize_pass(text: &str) -> String {
    let text = remove_invisible_characters(text);
    let text = collapse_whitespace(&text);
    let text = repair_numbers(&text);
    let text = merge_letter_fragments(&text);
    canonicalize(&text)
}

fn remove_invisible_characters(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => Some(' '),
            '\u{200B}' | '\u{00AD}' | '\u{FEFF}' => None,
            other => Some(other),
        })
        .collect()
}

/// Lowercase and collapse every whitespace run (line breaks included) to one
/// space, trimming both ends
fn collapse_whitespace(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn repair_numbers(text: &str) -> String {
    let text = DECIMAL_COMMA.replace_all(text, "$1.$2");
    let text = DIGIT_SPACE_SEPARATOR.replace_all(&text, "$1$2");
    SEPARATOR_SPACE_DIGIT.replace_all(&text, "$1$2").into_owned()
}

/// Join runs of two or more single-letter tokens
///
/// Single left-to-right pass. Only tokens that are exactly one `a`-`z`
/// letter take part; a merged run never absorbs a longer token.
fn merge_letter_fragments(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run = String::new();

    for token in text.split(' ') {
        if is_single_letter(token) {
            run.push_str(token);
            continue;
        }
        if !run.is_empty() {
            out.push(std::mem::take(&mut run));
        }
        out.push(token.to_string());
    }
    if !run.is_empty() {
        out.push(run);
    }

    out.join(" ")
}

fn is_single_letter(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 1 && bytes[0].is_ascii_lowercase()
}

/// Sort tokens so the result no longer depends on extraction order
fn canonicalize(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t  "), "");
        assert_eq!(normalize("\u{200B}\u{FEFF}"), "");
    }

    #[test]
    fn test_invisible_characters() {
        assert_eq!(normalize("foo\u{00A0}bar"), "bar foo");
        assert_eq!(normalize("soft\u{00AD}ware"), "software");
        assert_eq!(normalize("\u{FEFF}zero\u{200B}width"), "zerowidth");
        assert_eq!(normalize("one\u{2007}two\u{202F}three"), "one three two");
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(normalize("  Hello\r\n\r\nWORLD\tAgain  "), "again hello world");
    }

    #[test]
    fn test_decimal_repair() {
        assert_eq!(normalize("total 3560,25"), "3560.25 total");
        // A single pass is non-overlapping; the repeat picks up the rest
        assert_eq!(repair_numbers("1,2,3"), "1.2,3");
        assert_eq!(normalize("1,2,3"), "1.2.3");
    }

    #[test]
    fn test_separator_spacing() {
        assert_eq!(repair_numbers("3560 ,25"), "3560,25");
        assert_eq!(repair_numbers("3560, 25"), "3560,25");
        assert_eq!(repair_numbers("3560 . 25"), "3560.25");
        assert_eq!(normalize("3560 ,25"), normalize("3560,25"));
        assert_eq!(normalize("3560, 25"), "3560.25");
    }

    #[test]
    fn test_letter_fragments() {
        assert_eq!(normalize("E U R"), "eur");
        assert_eq!(normalize("amount E U R"), "amount eur");
    }

    #[test]
    fn test_letter_fragments_multiple_runs() {
        // Each run merges on its own; longer tokens break a run
        assert_eq!(merge_letter_fragments("a b cd e f"), "ab cd ef");
        assert_eq!(merge_letter_fragments("x y z w"), "xyzw");
        assert_eq!(merge_letter_fragments("ab c d"), "ab cd");
        assert_eq!(merge_letter_fragments("a bc d"), "a bc d");
        assert_eq!(merge_letter_fragments("a 1 b"), "a 1 b");
    }

    #[test]
    fn test_letter_fragments_ignore_non_ascii_letters() {
        assert_eq!(merge_letter_fragments("é a b"), "é ab");
    }

    #[test]
    fn test_canonical_order() {
        assert_eq!(normalize("zeta alpha mid"), "alpha mid zeta");
        assert_eq!(normalize("B a"), "ba");
    }

    #[test]
    fn test_word_order_insensitive() {
        let a = normalize("Invoice number 42 total 3560,25 EUR");
        let b = normalize("total 3560,25 EUR Invoice number 42");
        assert_eq!(a, b);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Invoice number 42 total 3560,25 EUR",
            "a 1 b",
            "x . 5 y",
            "1 0.",
            "E U R and G B P",
            "  mixed\u{00A0}Case \r\n text 1 , 2 ",
            "",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_sorting_exposes_new_fragments() {
        // "a" and "b" only become adjacent after sorting
        assert_eq!(normalize("a 1 b"), "1 ab");
    }
}
