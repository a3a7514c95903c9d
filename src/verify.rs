// Output verification and duplicate repair for the score table.
//
// `verify` checks the invariants downstream consumers rely on: required
// columns, numeric cells that parse, scores within [0, 100], and unique
// keys. `dedupe_by_best_score` repairs a table that fails the last check.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::table::{ensure_parent_dir, parse_number, read_csv, Table};

pub const REQUIRED_COLUMNS: &[&str] = &[
    "keyword",
    "keyword_sanitized",
    "comp_combined",
    "intent_norm",
    "competition_norm",
    "score",
];

pub const NUMERIC_COLUMNS: &[&str] = &["comp_combined", "intent_norm", "competition_norm", "score"];

/// How many duplicate keys the report lists.
const DUPLICATE_SAMPLE: usize = 10;

/// Row count of one pipeline artifact, `None` when it could not be read.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactCount {
    pub name: String,
    pub path: PathBuf,
    pub rows: Option<usize>,
}

impl ArtifactCount {
    pub fn of(name: &str, path: &Path) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            rows: read_csv(path).ok().map(|t| t.len()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub artifacts: Vec<ArtifactCount>,
    pub issues: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn to_markdown(&self) -> String {
        let mut lines = vec!["# Verify Report".to_string(), String::new(), "## Artifacts".to_string()];
        for a in &self.artifacts {
            let rows = a.rows.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
            lines.push(format!("- {}: {} rows={}", a.name, a.path.display(), rows));
        }
        lines.push(String::new());
        lines.push("## Result".to_string());
        if self.is_ok() {
            lines.push("- OK (no issues)".to_string());
        } else {
            lines.push("- Issues found:".to_string());
            lines.extend(self.issues.iter().map(|i| format!("  - {i}")));
        }
        lines.join("\n") + "\n"
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, self.to_markdown())
            .with_context(|| format!("Failed to write verify report {}", path.display()))
    }
}

/// Key columns: (seed, keyword) when both exist, else keyword alone.
fn key_columns(table: &Table) -> Option<Vec<usize>> {
    let keyword = table.column_index("keyword")?;
    Some(match table.column_index("seed") {
        Some(seed) => vec![seed, keyword],
        None => vec![keyword],
    })
}

fn row_key(table: &Table, row: usize, cols: &[usize]) -> Vec<String> {
    cols.iter().map(|&c| table.cell(row, c).to_string()).collect()
}

/// Check a score table's invariants.
pub fn check_scores(table: &Table) -> Vec<String> {
    let mut issues = Vec::new();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| table.column_index(c).is_none())
        .collect();
    if !missing.is_empty() {
        issues.push(format!("missing columns: [{}]", missing.join(", ")));
    }

    for name in NUMERIC_COLUMNS {
        let Some(col) = table.column_index(name) else {
            continue;
        };
        let bad = (0..table.len()).filter(|&r| parse_number(table.cell(r, col)).is_none()).count();
        if bad > 0 {
            issues.push(format!("non-numeric or NaN values in {name}: {bad} row(s)"));
        }
    }

    if let Some(col) = table.column_index("score") {
        let out_of_range = (0..table.len())
            .filter_map(|r| parse_number(table.cell(r, col)))
            .filter(|s| !(0.0..=100.0).contains(s))
            .count();
        if out_of_range > 0 {
            issues.push(format!("score outside 0..100: {out_of_range} row(s)"));
        }
    }

    match key_columns(table) {
        None => issues.push("cannot determine key columns (need 'keyword' or 'seed'+'keyword')".to_string()),
        Some(cols) => {
            let mut seen = HashSet::new();
            let mut duplicates: Vec<String> = Vec::new();
            for row in 0..table.len() {
                let key = row_key(table, row, &cols);
                if !seen.insert(key.clone()) {
                    duplicates.push(key.join(" / "));
                }
            }
            if !duplicates.is_empty() {
                let by = if cols.len() == 2 { "seed+keyword" } else { "keyword" };
                let sample: Vec<&str> = duplicates.iter().take(DUPLICATE_SAMPLE).map(String::as_str).collect();
                issues.push(format!(
                    "duplicated keys by {by}: count={} (e.g. {})",
                    duplicates.len(),
                    sample.join("; ")
                ));
            }
        }
    }

    issues
}

/// Verify the score table and count every artifact.
pub fn verify(scores: &Path, artifacts: &[(&str, PathBuf)]) -> Result<VerifyReport> {
    let table = read_csv(scores).with_context(|| format!("Failed to read score table {}", scores.display()))?;
    Ok(VerifyReport {
        artifacts: artifacts.iter().map(|(name, path)| ArtifactCount::of(name, path)).collect(),
        issues: check_scores(&table),
    })
}

/// Keep the highest-scoring row per key; ties keep the earlier row.
/// Rows come out ordered by score, descending.
pub fn dedupe_by_best_score(table: &Table) -> Result<Table> {
    let Some(cols) = key_columns(table) else {
        anyhow::bail!("'keyword' column missing in score table");
    };
    let score_col = table.column_index("score");
    let score = |row: usize| {
        score_col
            .and_then(|c| parse_number(table.cell(row, c)))
            .unwrap_or(f64::NEG_INFINITY)
    };

    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|&a, &b| score(b).total_cmp(&score(a)));

    let mut out = Table::new(table.headers.clone());
    let mut seen = HashSet::new();
    for row in order {
        if seen.insert(row_key(table, row, &cols)) {
            out.push_row(table.rows[row].clone());
        }
    }
    Ok(out)
}
