// Intent tokens — an insertion-ordered token → weight table.

use serde::Serialize;

use super::defaults::DEFAULT_TOKENS;
use crate::sanitize::text::{clean_term, parse_weight};

/// Ordered mapping of token text to a strictly positive weight.
///
/// Re-inserting a token updates its weight in place, keeping the position
/// of its first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenTable {
    entries: Vec<(String, f64)>,
}

impl TokenTable {
    /// The built-in token table.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (token, weight) in DEFAULT_TOKENS {
            table.insert(token, *weight);
        }
        table
    }

    /// Insert or update a token. Blank tokens and weights that are not
    /// strictly positive and finite are ignored.
    pub fn insert(&mut self, token: &str, weight: f64) {
        let token = clean_term(token);
        if token.is_empty() || !weight.is_finite() || weight <= 0.0 {
            return;
        }
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((token, weight)),
        }
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Short "token:weight, ..." preview for logs and banners.
    pub fn preview(&self, limit: usize) -> String {
        if self.entries.is_empty() {
            return "(none)".to_string();
        }
        self.entries
            .iter()
            .take(limit)
            .map(|(t, w)| format!("{t}:{w:.2}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Parse a command-line token list such as `"빅사이즈:1.2;임산부:0.9,하객:0.7"`.
///
/// Items are separated by `;` or `,`; each item is `token:weight`. Items
/// without a colon, with an unparseable weight, or with weight ≤ 0 are skipped.
pub fn parse_token_list(raw: &str) -> TokenTable {
    let mut table = TokenTable::default();
    for item in raw.split([';', ',']) {
        let Some((token, weight)) = item.split_once(':') else {
            continue;
        };
        if let Some(weight) = parse_weight(weight) {
            table.insert(token, weight);
        }
    }
    table
}
