// Data models — the records that flow between pipeline stages.
//
// Each stage writes its records to a flat CSV file, and later stages read
// them back through column inference, so the header names here are the
// stable contract between stages.

use serde::{Deserialize, Serialize};

use crate::sanitize::SanitizeAudit;
use crate::table::{format_float, Table};

/// One input seed. Identity is positional: duplicate texts are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub index: usize,
    pub original: String,
    pub sanitized: String,
    pub category: String,
}

/// A related keyword suggested for a seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionRecord {
    pub seed_index: usize,
    pub seed_original: String,
    pub seed_sanitized: String,
    pub related_original: String,
    pub related_sanitized: String,
    /// 1-based, contiguous per seed.
    pub rank: usize,
    pub source: String,
}

/// Competitor result counts for one candidate keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRecord {
    pub seed: String,
    pub seed_label: String,
    pub keyword: String,
    pub count_coupang: Option<u64>,
    pub count_naver: Option<u64>,
    /// `log1p(coupang) + log1p(naver)`, missing counts as 0.
    pub combined: f64,
    pub timestamp: String,
}

/// Final ranked score for one (seed, keyword) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub seed: String,
    pub keyword: String,
    pub keyword_sanitized: String,
    pub count_coupang: Option<f64>,
    pub count_naver: Option<f64>,
    pub combined_competition: f64,
    pub intent_proxy: f64,
    pub intent_norm: f64,
    pub competition_norm: f64,
    pub score: f64,
}

pub const SANITIZED_HEADERS: &[&str] = &[
    "keyword",
    "category",
    "keyword_sanitized",
    "sanitized_changed",
    "removed_words",
    "removed_symbols",
    "changed",
];

pub const EXPANDED_HEADERS: &[&str] = &[
    "seed_index",
    "seed_original",
    "seed_sanitized",
    "related_original",
    "related_sanitized",
    "source",
    "rank",
];

fn flag(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

/// Counts are whole numbers; missing counts are written as 0.
fn format_count(count: Option<f64>) -> String {
    match count {
        Some(c) if c.is_finite() => format!("{:.0}", c),
        _ => "0".to_string(),
    }
}

/// Sanitized seed table with the audit joined on.
pub fn sanitized_table(seeds: &[SeedRecord], audits: &[SanitizeAudit]) -> Table {
    let mut table = Table::new(SANITIZED_HEADERS.iter().copied());
    for (seed, audit) in seeds.iter().zip(audits) {
        table.push_row(vec![
            seed.original.clone(),
            seed.category.clone(),
            seed.sanitized.clone(),
            flag(audit.changed),
            audit.removed_words.join(", "),
            audit.removed_symbols.join(", "),
            flag(audit.changed),
        ]);
    }
    table
}

/// Expansion table in stage output order.
pub fn expanded_table(records: &[ExpansionRecord]) -> Table {
    let mut table = Table::new(EXPANDED_HEADERS.iter().copied());
    for r in records {
        table.push_row(vec![
            r.seed_index.to_string(),
            r.seed_original.clone(),
            r.seed_sanitized.clone(),
            r.related_original.clone(),
            r.related_sanitized.clone(),
            r.source.clone(),
            r.rank.to_string(),
        ]);
    }
    table
}

/// Score table. Count columns appear only when the competition input had them.
pub fn score_table(records: &[ScoreRecord], with_coupang: bool, with_naver: bool) -> Table {
    let mut headers = vec!["seed", "keyword", "keyword_sanitized"];
    if with_coupang {
        headers.push("comp_coupang");
    }
    if with_naver {
        headers.push("comp_naver");
    }
    headers.extend([
        "comp_combined",
        "intent_proxy",
        "intent_norm",
        "competition_norm",
        "score",
    ]);

    let mut table = Table::new(headers);
    for r in records {
        let mut row = vec![r.seed.clone(), r.keyword.clone(), r.keyword_sanitized.clone()];
        if with_coupang {
            row.push(format_count(r.count_coupang));
        }
        if with_naver {
            row.push(format_count(r.count_naver));
        }
        row.extend([
            format_float(r.combined_competition),
            format_float(r.intent_proxy),
            format_float(r.intent_norm),
            format_float(r.competition_norm),
            format_float(r.score),
        ]);
        table.push_row(row);
    }
    table
}
