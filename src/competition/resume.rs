// Resume index — (seed, keyword) pairs already present in the output.
//
// Loaded once before a run; the aggregator skips any pair found here and
// adds each pair it writes, so an interrupted run picks up where it left off.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::table::columns::ColumnResolver;
use crate::table::{canon_seed, read_csv, Table};

/// Keyword column names an existing competition file may use.
const OUTPUT_KEYWORD_COLUMNS: &[&str] = &["related_sanitized", "keyword", "term", "query", "keyword_sanitized"];

#[derive(Debug, Clone, Default)]
pub struct ResumeIndex {
    keys: HashSet<(String, String)>,
}

impl ResumeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from an existing output file. A missing file is an
    /// empty index; an unreadable one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let table = read_csv(path)
            .with_context(|| format!("Failed to read existing competition output {}", path.display()))?;
        let index = Self::from_table(&table);
        info!(path = %path.display(), done = index.len(), "Loaded resume index");
        Ok(index)
    }

    pub fn from_table(table: &Table) -> Self {
        let mut index = Self::new();
        let seed_col = ColumnResolver::seed().resolve(table);
        let keyword_col = ColumnResolver::exact(OUTPUT_KEYWORD_COLUMNS)
            .resolve(table)
            .or_else(|| ColumnResolver::keyword().resolve(table));
        let Some(keyword_col) = keyword_col else {
            return index;
        };

        for row in 0..table.len() {
            let seed = seed_col.map(|c| table.cell(row, c)).unwrap_or("");
            index.insert(seed, table.cell(row, keyword_col));
        }
        index
    }

    fn key(seed: &str, keyword: &str) -> (String, String) {
        (canon_seed(seed), keyword.trim().to_string())
    }

    pub fn contains(&self, seed: &str, keyword: &str) -> bool {
        self.keys.contains(&Self::key(seed, keyword))
    }

    /// Record a pair; returns false if it was already present.
    pub fn insert(&mut self, seed: &str, keyword: &str) -> bool {
        let (seed, keyword) = Self::key(seed, keyword);
        if keyword.is_empty() {
            return false;
        }
        self.keys.insert((seed, keyword))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
