// The spreadsheet config surface — header-delimited blocks in a free grid.
//
// Operators keep several small tables on one sheet: a key/value block for
// weights, a token/weight/enabled block for intent tokens, and word/enabled
// and symbol/enabled blocks for lexicon extras. A block is found by its
// header cells anywhere in the grid and runs until the first blank row.

use std::path::Path;

use tracing::{debug, warn};

use super::tokens::TokenTable;
use crate::sanitize::text::{clean_term, eq_ignore_case, is_truthy, parse_weight};
use crate::table;

pub const WEIGHT_KEY_INTENT: &str = "W_intent";
pub const WEIGHT_KEY_COMPETITION: &str = "W_competition";

/// A headerless grid of config cells.
#[derive(Debug, Clone, Default)]
pub struct ConfigSheet {
    grid: Vec<Vec<String>>,
}

impl ConfigSheet {
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        Self { grid }
    }

    /// Load the config grid. A missing or unreadable file gives an empty
    /// sheet, so every setting falls through to the next tier.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No config sheet, using defaults");
            return Self::default();
        }
        match table::read_grid(path) {
            Ok(grid) => Self { grid },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable config sheet, using defaults");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.iter().all(|row| row.iter().all(|c| c.trim().is_empty()))
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.grid
            .get(row)
            .and_then(|r| r.get(col))
            .map(|c| c.trim())
            .unwrap_or("")
    }

    fn width(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Position (row, col) of the first cell of a header sequence.
    pub fn find_header(&self, header: &[&str]) -> Option<(usize, usize)> {
        let width = self.width();
        if header.is_empty() || width < header.len() {
            return None;
        }
        for row in 0..self.grid.len() {
            for col in 0..=(width - header.len()) {
                let hit = header
                    .iter()
                    .enumerate()
                    .all(|(k, name)| eq_ignore_case(self.cell(row, col + k), name));
                if hit {
                    return Some((row, col));
                }
            }
        }
        None
    }

    /// Rows under a header, `header.len()` cells wide, up to the first
    /// row where all of those cells are blank.
    pub fn block(&self, header: &[&str]) -> Vec<Vec<String>> {
        let Some((row0, col0)) = self.find_header(header) else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for row in (row0 + 1)..self.grid.len() {
            let cells: Vec<String> = (0..header.len())
                .map(|k| self.cell(row, col0 + k).to_string())
                .collect();
            if cells.iter().all(|c| c.is_empty()) {
                break;
            }
            rows.push(cells);
        }
        rows
    }

    /// Weights as written on the sheet: `(W_intent, W_competition)`.
    ///
    /// The key/value block is consulted first. A weight still missing is
    /// looked up by a literal scan for its key cell, taking the numeric
    /// neighbour to the right, else the one below.
    pub fn weights(&self) -> (Option<f64>, Option<f64>) {
        let mut intent = None;
        let mut competition = None;

        for row in self.block(&["key", "value"]) {
            let Some(value) = parse_weight(&row[1]) else {
                continue;
            };
            if eq_ignore_case(&row[0], WEIGHT_KEY_INTENT) {
                intent = Some(value);
            } else if eq_ignore_case(&row[0], WEIGHT_KEY_COMPETITION) {
                competition = Some(value);
            }
        }

        if intent.is_none() {
            intent = self.scan_literal(WEIGHT_KEY_INTENT);
        }
        if competition.is_none() {
            competition = self.scan_literal(WEIGHT_KEY_COMPETITION);
        }
        (intent, competition)
    }

    fn scan_literal(&self, key: &str) -> Option<f64> {
        for (row, cells) in self.grid.iter().enumerate() {
            for col in 0..cells.len() {
                if !eq_ignore_case(self.cell(row, col), key) {
                    continue;
                }
                let found = parse_weight(self.cell(row, col + 1))
                    .or_else(|| parse_weight(self.cell(row + 1, col)));
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }

    /// Enabled tokens with a positive weight. `enabled` defaults to true
    /// when the cell is blank.
    pub fn tokens(&self) -> TokenTable {
        let mut tokens = TokenTable::default();
        for row in self.block(&["token", "weight", "enabled"]) {
            let token = clean_term(&row[0]);
            if token.is_empty() {
                continue;
            }
            let weight = parse_weight(&row[1]).unwrap_or(0.0);
            let enabled = row[2].is_empty() || is_truthy(&row[2]);
            if enabled && weight > 0.0 {
                tokens.insert(&token, weight);
            }
        }
        tokens
    }

    /// Extra prohibited words from the `word`/`enabled` block.
    pub fn extra_words(&self) -> Vec<String> {
        self.enabled_entries(&["word", "enabled"])
    }

    /// Extra prohibited symbols from the `symbol`/`enabled` block.
    pub fn extra_symbols(&self) -> Vec<String> {
        self.enabled_entries(&["symbol", "enabled"])
    }

    fn enabled_entries(&self, header: &[&str]) -> Vec<String> {
        self.block(header)
            .into_iter()
            .filter(|row| !row[0].is_empty() && (row[1].is_empty() || is_truthy(&row[1])))
            .map(|row| clean_term(&row[0]))
            .collect()
    }
}
