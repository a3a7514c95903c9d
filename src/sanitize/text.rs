// Text helpers shared by the sanitizer, the config resolver, and scoring.
//
// Matching here is case-insensitive per character (`char::to_lowercase`),
// which leaves Hangul untouched and folds Latin letters.

/// Punctuation that never has a space in front of it after normalization.
pub const TIGHT_PUNCTUATION: &[char] = &[',', '.', '/', '~', '-', '_', ':', ';'];

/// Trim and collapse internal whitespace runs to single spaces.
pub fn clean_term(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace, drop spaces before tight punctuation, and trim.
///
/// Whitespace after punctuation is already a single space once runs are
/// collapsed; no space is inserted where there was none.
pub fn collapse_spaces(text: &str) -> String {
    let collapsed = clean_term(text);
    let chars: Vec<char> = collapsed.chars().collect();
    let mut out = String::with_capacity(collapsed.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' && chars.get(i + 1).is_some_and(|n| TIGHT_PUNCTUATION.contains(n)) {
            continue;
        }
        out.push(c);
    }
    out.trim().to_string()
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn matches_at(haystack: &[char], at: usize, needle: &[char]) -> bool {
    at + needle.len() <= haystack.len()
        && haystack[at..at + needle.len()]
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b))
}

/// Case-insensitive substring test. An empty needle never matches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return false;
    }
    let hay: Vec<char> = haystack.chars().collect();
    (0..hay.len()).any(|i| matches_at(&hay, i, &needle))
}

/// Remove every non-overlapping case-insensitive occurrence of `needle`,
/// scanning left to right. Returns the new text and the number removed.
pub fn remove_ignore_case(text: &str, needle: &str) -> (String, usize) {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return (text.to_string(), 0);
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut removed = 0;
    let mut i = 0;
    while i < chars.len() {
        if matches_at(&chars, i, &needle) {
            removed += 1;
            i += needle.len();
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    (out, removed)
}

/// Trimmed, case-insensitive equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Spreadsheet-style truthiness: 1/true/t/yes/y/on.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "t" | "yes" | "y" | "on"
    )
}

/// Parse a weight cell. Unparseable or non-finite gives `None`;
/// negative values clamp to 0.
pub fn parse_weight(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0))
}
