// Seed loading and batch sanitization.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{sanitize, strip_empty_brackets, SanitizeAudit};
use crate::models::SeedRecord;
use crate::resolve::lexicon::Lexicon;
use crate::table::{read_csv, Table};

/// Read the seed table. `keyword` is required (any case), `category` is
/// optional. Duplicate keywords are kept; a seed's identity is its row.
pub fn load_seeds(path: &Path) -> Result<Vec<SeedRecord>> {
    let table = read_csv(path).with_context(|| format!("Failed to load seeds from {}", path.display()))?;
    seeds_from_table(&table).with_context(|| format!("Invalid seed table {}", path.display()))
}

/// Build seed records from an already-parsed table.
pub fn seeds_from_table(table: &Table) -> Result<Vec<SeedRecord>> {
    let Some(keyword_col) = table.column_index("keyword") else {
        anyhow::bail!(
            "Seed table must contain a 'keyword' column (case-insensitive); found columns: [{}]",
            table.headers.join(", ")
        );
    };
    if table.is_empty() {
        anyhow::bail!("Seed table is empty. Provide at least one row.");
    }
    let category_col = table.column_index("category");

    let seeds: Vec<SeedRecord> = (0..table.len())
        .map(|row| {
            let original = table.cell(row, keyword_col).to_string();
            SeedRecord {
                index: row,
                sanitized: original.clone(),
                original,
                category: category_col
                    .map(|c| table.cell(row, c).to_string())
                    .unwrap_or_default(),
            }
        })
        .collect();

    info!(
        rows = seeds.len(),
        duplicates = duplicate_count(&seeds),
        "Loaded seeds"
    );
    Ok(seeds)
}

/// Rows whose keyword text repeats an earlier row.
pub fn duplicate_count(seeds: &[SeedRecord]) -> usize {
    let unique: HashSet<&str> = seeds.iter().map(|s| s.original.as_str()).collect();
    seeds.len() - unique.len()
}

/// Sanitize every seed against the lexicon, returning updated records and
/// one audit per seed in input order.
pub fn sanitize_seeds(
    seeds: &[SeedRecord],
    lexicon: &Lexicon,
    strip_brackets: bool,
) -> (Vec<SeedRecord>, Vec<SanitizeAudit>) {
    seeds
        .iter()
        .map(|seed| {
            let (mut clean, mut audit) = sanitize(&seed.original, &lexicon.words, &lexicon.symbols);
            if strip_brackets {
                clean = strip_empty_brackets(&clean);
                audit.changed = audit.original != clean;
                audit.sanitized = clean.clone();
            }
            let record = SeedRecord {
                sanitized: clean,
                ..seed.clone()
            };
            (record, audit)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_csv;

    #[test]
    fn test_missing_keyword_column_lists_columns() {
        let table = parse_csv("term,category\n니트,top\n").unwrap();
        let err = seeds_from_table(&table).unwrap_err().to_string();
        assert!(err.contains("'keyword'"));
        assert!(err.contains("term, category"));
    }

    #[test]
    fn test_duplicates_preserved_and_category_optional() {
        let table = parse_csv("Keyword\n니트\n니트\n원피스\n").unwrap();
        let seeds = seeds_from_table(&table).unwrap();
        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds[1].index, 1);
        assert_eq!(seeds[1].category, "");
        assert_eq!(duplicate_count(&seeds), 1);
    }

    #[test]
    fn test_empty_table_is_error() {
        let table = parse_csv("keyword\n").unwrap();
        assert!(seeds_from_table(&table).is_err());
    }

    #[test]
    fn test_sanitize_seeds_flags_changes() {
        let table = parse_csv("keyword\n무료 배송 니트\n니트\n").unwrap();
        let seeds = seeds_from_table(&table).unwrap();
        let lexicon = Lexicon::new(vec!["무료 배송".to_string()], Vec::new());
        let (clean, audits) = sanitize_seeds(&seeds, &lexicon, false);
        assert_eq!(clean[0].sanitized, "니트");
        assert_eq!(clean[1].sanitized, "니트");
        assert!(audits[0].changed);
        assert!(!audits[1].changed);
    }

    #[test]
    fn test_strip_brackets_after_removal() {
        let table = parse_csv("keyword\n[특가] 니트\n").unwrap();
        let seeds = seeds_from_table(&table).unwrap();
        let lexicon = Lexicon::new(vec!["특가".to_string()], Vec::new());
        let (clean, audits) = sanitize_seeds(&seeds, &lexicon, true);
        assert_eq!(clean[0].sanitized, "니트");
        assert_eq!(audits[0].sanitized, "니트");
    }
}
