// Column inference for tables with unpredictable headers.
//
// Keyword and seed columns are located by a chain of strategies, each of
// which either names a column or passes: exact header match against a
// priority list, then substring match, then a scorer that looks at the
// cell values themselves. The first strategy to answer wins.

use std::collections::HashSet;

use super::{parse_number, Table};

/// Header names that identify the candidate keyword, in priority order.
pub const KEYWORD_CANDIDATES: &[&str] = &[
    "related_sanitized",
    "keyword_sanitized",
    "keyword",
    "related_keyword",
    "expanded_keyword",
    "related_original",
    "expanded",
    "expansion",
    "suggest",
    "suggestion",
    "candidate",
    "variant",
    "term",
    "query",
    "kw",
    "text",
    "title",
    "확장키워드",
    "확장_키워드",
    "추천어",
    "연관키워드",
];

/// Substrings that mark a header as probably holding keywords.
pub const KEYWORD_SUBSTRINGS: &[&str] = &[
    "keyword", "related", "query", "term", "title", "suggest", "expand", "연관", "추천", "확장",
];

/// Header names that identify the seed a keyword was expanded from.
pub const SEED_CANDIDATES: &[&str] = &[
    "seed",
    "seed_index",
    "root",
    "parent",
    "group",
    "source_seed",
    "seed_name",
];

pub const SEED_SUBSTRINGS: &[&str] = &["seed", "parent", "root", "group"];

/// Columns the heuristic scorer never picks, even if they look textual.
pub const NON_KEYWORD_COLUMNS: &[&str] = &[
    "seed",
    "seed_index",
    "category",
    "cat",
    "idx",
    "id",
    "index",
    "group",
    "count",
    "rank",
    "source",
    "timestamp",
    "ts",
    "scraped_at",
    "score",
];

pub const NON_KEYWORD_PREFIXES: &[&str] = &["comp_", "unnamed"];

/// Only the first rows of a table are inspected by the heuristic scorer.
pub const HEURISTIC_SAMPLE_ROWS: usize = 50;
/// Share of the length score kept even for a completely empty column.
pub const FILL_BASE: f64 = 0.5;
/// Share of the length score that scales with the fill ratio.
pub const FILL_WEIGHT: f64 = 0.5;
/// Bonus per distinct non-empty value in the sample.
pub const UNIQUENESS_WEIGHT: f64 = 0.05;

/// One way of locating a column. Returns the column index, or `None` to
/// let the next strategy try.
pub trait ColumnStrategy {
    fn detect(&self, table: &Table) -> Option<usize>;
}

/// Case-insensitive exact header match. Earlier candidates win.
pub struct ExactMatch {
    pub candidates: &'static [&'static str],
}

impl ColumnStrategy for ExactMatch {
    fn detect(&self, table: &Table) -> Option<usize> {
        self.candidates
            .iter()
            .find_map(|candidate| table.column_index(candidate))
    }
}

/// First header (in table order) containing any of the substrings.
pub struct SubstringMatch {
    pub substrings: &'static [&'static str],
}

impl ColumnStrategy for SubstringMatch {
    fn detect(&self, table: &Table) -> Option<usize> {
        table.headers.iter().position(|header| {
            let lower = header.to_lowercase();
            self.substrings.iter().any(|sub| lower.contains(sub))
        })
    }
}

/// Value-based scorer: prefers long, well-filled, varied text columns.
///
/// `score = avg_len * (FILL_BASE + FILL_WEIGHT * fill) + UNIQUENESS_WEIGHT * distinct`
///
/// Purely numeric columns and the known non-keyword columns are skipped.
/// Ties go to the leftmost column.
pub struct ValueHeuristic {
    pub sample_rows: usize,
}

impl Default for ValueHeuristic {
    fn default() -> Self {
        Self {
            sample_rows: HEURISTIC_SAMPLE_ROWS,
        }
    }
}

impl ValueHeuristic {
    fn is_excluded(header: &str) -> bool {
        let lower = header.trim().to_lowercase();
        lower.is_empty()
            || NON_KEYWORD_COLUMNS.contains(&lower.as_str())
            || NON_KEYWORD_PREFIXES.iter().any(|p| lower.starts_with(p))
    }

    /// Score one column, or `None` when it cannot hold keywords at all.
    pub fn column_score(&self, table: &Table, col: usize) -> Option<f64> {
        let sampled = table.len().min(self.sample_rows);
        if sampled == 0 {
            return None;
        }

        let non_empty: Vec<&str> = (0..sampled)
            .map(|row| table.cell(row, col).trim())
            .filter(|v| !v.is_empty())
            .collect();
        if non_empty.is_empty() {
            return None;
        }
        if non_empty.iter().all(|v| parse_number(v).is_some()) {
            return None;
        }

        let total_len: usize = non_empty.iter().map(|v| v.chars().count()).sum();
        let avg_len = total_len as f64 / non_empty.len() as f64;
        let fill = non_empty.len() as f64 / sampled as f64;
        let distinct = non_empty.iter().collect::<HashSet<_>>().len() as f64;

        Some(avg_len * (FILL_BASE + FILL_WEIGHT * fill) + UNIQUENESS_WEIGHT * distinct)
    }
}

impl ColumnStrategy for ValueHeuristic {
    fn detect(&self, table: &Table) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (col, header) in table.headers.iter().enumerate() {
            if Self::is_excluded(header) {
                continue;
            }
            if let Some(score) = self.column_score(table, col) {
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((col, score));
                }
            }
        }
        best.map(|(col, _)| col)
    }
}

/// An ordered chain of strategies; the first one to find a column wins.
#[derive(Default)]
pub struct ColumnResolver {
    strategies: Vec<Box<dyn ColumnStrategy>>,
}

impl ColumnResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, strategy: impl ColumnStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Exact match only.
    pub fn exact(candidates: &'static [&'static str]) -> Self {
        Self::new().then(ExactMatch { candidates })
    }

    /// Exact names, then header substrings, then the value heuristic.
    pub fn keyword() -> Self {
        Self::new()
            .then(ExactMatch {
                candidates: KEYWORD_CANDIDATES,
            })
            .then(SubstringMatch {
                substrings: KEYWORD_SUBSTRINGS,
            })
            .then(ValueHeuristic::default())
    }

    /// Exact names, then header substrings. Seeds are optional, so there
    /// is no value-based guess.
    pub fn seed() -> Self {
        Self::new()
            .then(ExactMatch {
                candidates: SEED_CANDIDATES,
            })
            .then(SubstringMatch {
                substrings: SEED_SUBSTRINGS,
            })
    }

    pub fn resolve(&self, table: &Table) -> Option<usize> {
        self.strategies.iter().find_map(|s| s.detect(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(headers.iter().copied());
        for row in rows {
            t.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        t
    }

    #[test]
    fn test_exact_match_respects_priority_not_header_order() {
        let t = table(&["keyword", "related_sanitized"], &[]);
        assert_eq!(ColumnResolver::keyword().resolve(&t), Some(1));
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let t = table(&["id", "KEYWORD "], &[]);
        assert_eq!(ColumnResolver::keyword().resolve(&t), Some(1));
    }

    #[test]
    fn test_substring_match_when_no_exact_name() {
        let t = table(&["id", "my_search_query_col"], &[]);
        assert_eq!(ColumnResolver::keyword().resolve(&t), Some(1));
    }

    #[test]
    fn test_heuristic_prefers_long_text_and_skips_numeric() {
        let t = table(
            &["id", "code", "name", "label"],
            &[
                &["1", "101", "빅사이즈 롱 원피스", "a"],
                &["2", "102", "임산부 홈웨어 세트", "b"],
            ],
        );
        assert_eq!(ColumnResolver::keyword().resolve(&t), Some(2));
    }

    #[test]
    fn test_heuristic_never_picks_blacklisted_columns() {
        let t = table(&["category", "seed"], &[&["아주 긴 카테고리 이름", "x"]]);
        assert_eq!(ColumnResolver::keyword().resolve(&t), None);
    }

    #[test]
    fn test_heuristic_tie_goes_to_leftmost() {
        let t = table(&["a", "b"], &[&["xy", "zw"]]);
        assert_eq!(ValueHeuristic::default().detect(&t), Some(0));
    }

    #[test]
    fn test_column_score_formula() {
        let t = table(&["a"], &[&["abcd"], &[""], &["ab"], &["ab"]]);
        // avg_len = 8/3, fill = 3/4, distinct = 2
        let expected = (8.0 / 3.0) * (0.5 + 0.5 * 0.75) + 0.05 * 2.0;
        let got = ValueHeuristic::default().column_score(&t, 0).unwrap();
        assert!((got - expected).abs() < 1e-9);
    }

    #[test]
    fn test_seed_resolver_falls_back_to_substring() {
        let t = table(&["my_seed_label", "keyword"], &[]);
        assert_eq!(ColumnResolver::seed().resolve(&t), Some(0));
        let none = table(&["keyword", "category"], &[]);
        assert_eq!(ColumnResolver::seed().resolve(&none), None);
    }
}
