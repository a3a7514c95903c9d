// Sanitizer — strips promotional/prohibited language from keyword text.
//
// Marketplaces reject listings that carry promotional wording ("무료 배송",
// "특가", ...) or decorative symbols. Words are removed as case-insensitive
// substrings (Korean compounds don't respect word boundaries), longest
// first so that a phrase goes before any shorter word inside it. Symbols
// are removed as one literal character class, then whitespace is
// normalized.

pub mod seeds;
pub mod text;

use std::collections::HashSet;

use serde::Serialize;

use self::text::{collapse_spaces, remove_ignore_case};

/// What a single sanitize call did to its input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanitizeAudit {
    pub original: String,
    pub sanitized: String,
    /// Prohibited words whose removal changed the text, in removal order.
    pub removed_words: Vec<String>,
    /// Prohibited symbols that were present, in lexicon order.
    pub removed_symbols: Vec<String>,
    pub changed: bool,
}

/// Order prohibited words for removal: longest first (by characters),
/// equal lengths in lexicographic order. Empty and duplicate entries drop.
pub fn removal_order(words: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered: Vec<String> = words
        .iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect();
    ordered.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });
    ordered
}

/// The symbol lexicon as individual characters, first-seen order.
fn symbol_chars(symbols: &[String]) -> Vec<char> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .flat_map(|s| s.chars())
        .filter(|c| !c.is_whitespace() && seen.insert(*c))
        .collect()
}

/// Remove prohibited words and symbols from `text` and normalize spacing.
///
/// The pass repeats until the text stops changing, so a removal that
/// brings two fragments together into a new prohibited match is handled
/// too. This makes the function idempotent:
/// `sanitize(sanitize(x).0) == sanitize(x).0`.
pub fn sanitize(text: &str, words: &[String], symbols: &[String]) -> (String, SanitizeAudit) {
    let original = text.trim().to_string();
    let ordered_words = removal_order(words);
    let symbol_set = symbol_chars(symbols);

    let mut removed_words: Vec<String> = Vec::new();
    let mut removed_symbols: Vec<String> = Vec::new();
    let mut current = original.clone();

    loop {
        let before = current.clone();

        for word in &ordered_words {
            let (next, count) = remove_ignore_case(&current, word);
            if count > 0 {
                current = next;
                if !removed_words.contains(word) {
                    removed_words.push(word.clone());
                }
            }
        }

        let present: Vec<char> = symbol_set
            .iter()
            .copied()
            .filter(|c| current.contains(*c))
            .collect();
        if !present.is_empty() {
            current = current.chars().filter(|c| !present.contains(c)).collect();
            for c in present {
                let symbol = c.to_string();
                if !removed_symbols.contains(&symbol) {
                    removed_symbols.push(symbol);
                }
            }
        }

        current = collapse_spaces(&current);
        if current == before {
            break;
        }
    }

    let audit = SanitizeAudit {
        changed: original != current,
        original,
        sanitized: current.clone(),
        removed_words,
        removed_symbols,
    };
    (current, audit)
}

/// Remove empty bracket pairs ("[]", "[ ]") that removals leave behind.
pub fn strip_empty_brackets(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '[' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == ']' {
                i = j + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    text::clean_term(&out)
}
