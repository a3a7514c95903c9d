// Prohibited lexicon — banned words and symbols, defaults plus extras.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::defaults::{DEFAULT_SYMBOLS, DEFAULT_WORDS};
use crate::sanitize::text::clean_term;

/// Banned words (whitespace-normalized) and banned single-character symbols,
/// both de-duplicated in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    pub words: Vec<String>,
    pub symbols: Vec<String>,
}

#[derive(Deserialize)]
struct LexiconFile {
    #[serde(default)]
    words: Vec<String>,
    #[serde(default)]
    symbols: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon, normalizing and de-duplicating both lists.
    pub fn new(words: impl IntoIterator<Item = String>, symbols: impl IntoIterator<Item = String>) -> Self {
        let mut lexicon = Self {
            words: Vec::new(),
            symbols: Vec::new(),
        };
        lexicon.extend(words, symbols);
        lexicon
    }

    /// The built-in Korean marketplace lexicon.
    pub fn builtin() -> Self {
        Self::new(
            DEFAULT_WORDS.iter().map(|w| w.to_string()),
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()),
        )
    }

    /// Load the default lexicon from a JSON file shaped like
    /// `{"words": [...], "symbols": [...]}`. Missing or invalid files fall
    /// back to the built-in lexicon.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No lexicon file, using built-in lexicon");
                return Self::builtin();
            }
        };
        match serde_json::from_str::<LexiconFile>(raw.trim_start_matches('\u{feff}')) {
            Ok(file) => Self::new(file.words, file.symbols),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid lexicon JSON, using built-in lexicon");
                Self::builtin()
            }
        }
    }

    /// Union with extra entries. Existing entries keep their position;
    /// words compare case-insensitively after whitespace normalization.
    pub fn merged_with(&self, extra_words: &[String], extra_symbols: &[String]) -> Self {
        let mut merged = self.clone();
        merged.extend(extra_words.iter().cloned(), extra_symbols.iter().cloned());
        merged
    }

    fn extend(&mut self, words: impl IntoIterator<Item = String>, symbols: impl IntoIterator<Item = String>) {
        let mut seen_words: HashSet<String> = self.words.iter().map(|w| w.to_lowercase()).collect();
        for word in words {
            let word = clean_term(&word);
            if !word.is_empty() && seen_words.insert(word.to_lowercase()) {
                self.words.push(word);
            }
        }

        // Symbols are a literal character class: multi-character entries
        // contribute each of their characters.
        let mut seen_symbols: HashSet<String> = self.symbols.iter().cloned().collect();
        for entry in symbols {
            for c in entry.chars().filter(|c| !c.is_whitespace()) {
                let symbol = c.to_string();
                if seen_symbols.insert(symbol.clone()) {
                    self.symbols.push(symbol);
                }
            }
        }
    }
}
