// Score computation — merge candidates with competition, then rank.
//
// The base candidates come from the expansion output, or the sanitized
// seeds when expansion never ran. Competition counts are joined on the
// sanitized keyword, with the seed too when both sides know it.
// Headers on both sides are inferred, not assumed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::intent::intent_proxy;
use super::normalize::min_max;
use crate::competition::combine_counts;
use crate::models::ScoreRecord;
use crate::resolve::EffectiveConfig;
use crate::table::columns::{ColumnResolver, ExactMatch, SubstringMatch, ValueHeuristic, KEYWORD_SUBSTRINGS};
use crate::table::{canon_seed, compare_seeds, parse_number, read_csv, Table};

/// Keyword header names a competition table may use.
const COMPETITION_KEYWORD_CANDIDATES: &[&str] = &[
    "related_sanitized",
    "keyword",
    "term",
    "query",
    "keyword_sanitized",
    "expanded_keyword",
    "expansion",
    "expanded",
    "child",
    "variant",
    "kw",
    "text",
    "title",
    "연관키워드",
    "추천어",
    "확장키워드",
    "확장_키워드",
];

const COMPETITION_SEED_CANDIDATES: &[&str] = &["seed", "seed_index", "parent", "root", "seed_name"];
const COUPANG_COLUMNS: &[&str] = &["comp_coupang", "coupang", "comp_cp"];
const NAVER_COLUMNS: &[&str] = &["comp_naver", "naver", "comp_nv"];
const COMBINED_COLUMNS: &[&str] = &["comp_combined", "combined", "score_comp"];

/// One candidate keyword from the base table.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRow {
    pub seed: String,
    pub keyword: String,
    pub keyword_sanitized: String,
}

#[derive(Debug, Clone)]
pub struct BaseTable {
    pub source: PathBuf,
    pub rows: Vec<BaseRow>,
    pub has_seed: bool,
}

impl BaseTable {
    /// Build from a table, or `None` when no keyword column can be found.
    pub fn from_table(source: &Path, table: &Table) -> Option<Self> {
        let resolved = ColumnResolver::keyword().resolve(table)?;
        let seed_col = ColumnResolver::seed().resolve(table);
        let sanitized_col = table.column_index("keyword_sanitized");
        // The sanitized seed table carries both forms: report the phrase as
        // written, and match and score on the sanitized text.
        let keyword_col = match table.column_index("keyword") {
            Some(raw) if sanitized_col == Some(resolved) => raw,
            _ => resolved,
        };

        let rows = (0..table.len())
            .map(|row| {
                let keyword = table.cell(row, keyword_col).to_string();
                let sanitized = sanitized_col
                    .map(|c| table.cell(row, c).trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| keyword.clone());
                BaseRow {
                    seed: seed_col.map(|c| canon_seed(table.cell(row, c))).unwrap_or_default(),
                    keyword,
                    keyword_sanitized: sanitized,
                }
            })
            .collect();

        Some(Self {
            source: source.to_path_buf(),
            rows,
            has_seed: seed_col.is_some(),
        })
    }
}

/// Load the base candidates: expansion output first, sanitized seeds second.
///
/// Fails only when neither existing file has a plausible keyword column;
/// the error lists every source tried with its columns.
pub fn load_base(expanded: &Path, sanitized: &Path) -> Result<BaseTable> {
    let mut tried: Vec<String> = Vec::new();
    for source in [expanded, sanitized] {
        if !source.exists() {
            tried.push(format!(" - {}: not found", source.display()));
            continue;
        }
        let table = read_csv(source)?;
        if let Some(base) = BaseTable::from_table(source, &table) {
            info!(source = %source.display(), rows = base.rows.len(), has_seed = base.has_seed, "Loaded score base");
            return Ok(base);
        }
        tried.push(format!(" - {}: columns=[{}]", source.display(), table.headers.join(", ")));
    }
    anyhow::bail!(
        "Could not detect a keyword column in the candidate tables.\nTried sources:\n{}",
        tried.join("\n")
    )
}

/// Competition metrics for one row of the competition table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionRow {
    pub seed: String,
    pub keyword: String,
    pub coupang: Option<f64>,
    pub naver: Option<f64>,
    pub combined: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CompetitionTable {
    pub rows: Vec<CompetitionRow>,
    pub has_seed: bool,
    pub has_coupang: bool,
    pub has_naver: bool,
}

impl CompetitionTable {
    /// Interpret a competition table. `None` when it has no recognizable
    /// keyword column.
    pub fn from_table(table: &Table) -> Option<Self> {
        let keyword_col = ColumnResolver::new()
            .then(ExactMatch {
                candidates: COMPETITION_KEYWORD_CANDIDATES,
            })
            .then(SubstringMatch {
                substrings: KEYWORD_SUBSTRINGS,
            })
            .then(ValueHeuristic::default())
            .resolve(table)?;
        let seed_col = ColumnResolver::exact(COMPETITION_SEED_CANDIDATES).resolve(table);
        let coupang_col = ColumnResolver::exact(COUPANG_COLUMNS).resolve(table);
        let naver_col = ColumnResolver::exact(NAVER_COLUMNS).resolve(table);
        let combined_col = ColumnResolver::exact(COMBINED_COLUMNS).resolve(table);

        let count = |row: usize, col: Option<usize>| col.and_then(|c| parse_number(table.cell(row, c)));

        let rows = (0..table.len())
            .map(|row| {
                let coupang = count(row, coupang_col);
                let naver = count(row, naver_col);
                // Derive the combined metric when the stored one is absent.
                let combined = count(row, combined_col).unwrap_or_else(|| {
                    let as_count = |v: Option<f64>| v.map(|x| x.max(0.0).round() as u64);
                    combine_counts(as_count(coupang), as_count(naver))
                });
                CompetitionRow {
                    seed: seed_col.map(|c| canon_seed(table.cell(row, c))).unwrap_or_default(),
                    keyword: table.cell(row, keyword_col).trim().to_string(),
                    coupang,
                    naver,
                    combined,
                }
            })
            .collect();

        Some(Self {
            rows,
            has_seed: seed_col.is_some(),
            has_coupang: coupang_col.is_some(),
            has_naver: naver_col.is_some(),
        })
    }
}

/// Load the competition table if present. A missing file or one without a
/// keyword column scores everything with zero competition.
pub fn load_competition(path: &Path) -> Result<Option<CompetitionTable>> {
    if !path.exists() {
        info!(path = %path.display(), "No competition table, scoring without competition");
        return Ok(None);
    }
    let table = read_csv(path).with_context(|| format!("Failed to read competition table {}", path.display()))?;
    let competition = CompetitionTable::from_table(&table);
    if competition.is_none() {
        warn!(
            path = %path.display(),
            columns = %table.headers.join(", "),
            "Competition table has no recognizable keyword column, skipping merge"
        );
    }
    Ok(competition)
}

/// Ranked scores plus which count columns to emit.
#[derive(Debug, Clone, Default)]
pub struct ScoreOutput {
    pub records: Vec<ScoreRecord>,
    pub with_coupang: bool,
    pub with_naver: bool,
}

pub struct ScoreComputer<'a> {
    config: &'a EffectiveConfig,
}

impl<'a> ScoreComputer<'a> {
    pub fn new(config: &'a EffectiveConfig) -> Self {
        Self { config }
    }

    /// Join, score, de-duplicate, and sort.
    pub fn compute(&self, base: &BaseTable, competition: Option<&CompetitionTable>) -> ScoreOutput {
        let join_on_seed = competition.is_some_and(|c| c.has_seed) && base.has_seed;

        // First competition row per key wins.
        let mut lookup: HashMap<(String, String), &CompetitionRow> = HashMap::new();
        if let Some(comp) = competition {
            for row in &comp.rows {
                let seed = if join_on_seed { row.seed.clone() } else { String::new() };
                lookup.entry((seed, row.keyword.clone())).or_insert(row);
            }
        }

        let matched: Vec<Option<&CompetitionRow>> = base
            .rows
            .iter()
            .map(|b| {
                let seed = if join_on_seed { b.seed.clone() } else { String::new() };
                lookup.get(&(seed, b.keyword_sanitized.trim().to_string())).copied()
            })
            .collect();

        let intents: Vec<f64> = base
            .rows
            .iter()
            .map(|b| intent_proxy(&b.keyword_sanitized, &self.config.tokens))
            .collect();
        let combined: Vec<f64> = matched
            .iter()
            .map(|m| m.map(|c| c.combined).filter(|v| v.is_finite()).unwrap_or(0.0))
            .collect();
        let intent_norm = min_max(&intents);
        let competition_norm = min_max(&combined);

        let weights = self.config.weights;
        let mut seen = std::collections::HashSet::new();
        let mut records: Vec<ScoreRecord> = Vec::with_capacity(base.rows.len());

        for (i, b) in base.rows.iter().enumerate() {
            if !seen.insert((b.seed.clone(), b.keyword.clone())) {
                continue;
            }
            let score =
                100.0 * (weights.intent * intent_norm[i] + weights.competition * (1.0 - competition_norm[i]));
            records.push(ScoreRecord {
                seed: b.seed.clone(),
                keyword: b.keyword.clone(),
                keyword_sanitized: b.keyword_sanitized.clone(),
                count_coupang: matched[i].and_then(|c| c.coupang),
                count_naver: matched[i].and_then(|c| c.naver),
                combined_competition: combined[i],
                intent_proxy: intents[i],
                intent_norm: intent_norm[i],
                competition_norm: competition_norm[i],
                score: if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 },
            });
        }

        if base.has_seed {
            records.sort_by(|a, b| compare_seeds(&a.seed, &b.seed).then_with(|| b.score.total_cmp(&a.score)));
        } else {
            records.sort_by(|a, b| b.score.total_cmp(&a.score));
        }

        let dropped = base.rows.len() - records.len();
        info!(
            rows = records.len(),
            duplicates_dropped = dropped,
            matched = matched.iter().filter(|m| m.is_some()).count(),
            join_on_seed = join_on_seed,
            "Scores computed"
        );

        ScoreOutput {
            records,
            with_coupang: competition.is_some_and(|c| c.has_coupang),
            with_naver: competition.is_some_and(|c| c.has_naver),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tokens::parse_token_list;
    use crate::table::parse_csv;

    fn config(tokens: &str) -> EffectiveConfig {
        EffectiveConfig {
            tokens: parse_token_list(tokens),
            ..Default::default()
        }
    }

    fn base(csv: &str) -> BaseTable {
        BaseTable::from_table(Path::new("base.csv"), &parse_csv(csv).unwrap()).unwrap()
    }

    fn comp(csv: &str) -> CompetitionTable {
        CompetitionTable::from_table(&parse_csv(csv).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_counts_give_zero_combined() {
        let c = comp("seed_index,related_sanitized,comp_coupang,comp_naver,comp_combined\n0,니트,,,\n");
        assert_eq!(c.rows[0].combined, 0.0);
        assert_eq!(c.rows[0].coupang, None);
    }

    #[test]
    fn test_combined_derived_when_column_missing() {
        let c = comp("keyword,coupang,naver\n니트,9,\n");
        assert!((c.rows[0].combined - 10f64.ln()).abs() < 1e-12);
        assert!(!c.has_seed);
    }

    #[test]
    fn test_join_on_seed_and_keyword() {
        let b = base("seed_index,related_sanitized\n0,니트 가디건\n1,니트 가디건\n");
        let c = comp("seed_index,related_sanitized,comp_combined\n1.0,니트 가디건,5\n0,니트 가디건,1\n");
        let out = ScoreComputer::new(&config("")).compute(&b, Some(&c));
        let by_seed: HashMap<&str, f64> = out.records.iter().map(|r| (r.seed.as_str(), r.combined_competition)).collect();
        assert_eq!(by_seed["0"], 1.0);
        assert_eq!(by_seed["1"], 5.0);
    }

    #[test]
    fn test_join_on_keyword_when_competition_lacks_seed() {
        let b = base("seed_index,related_sanitized\n0,롱원피스\n");
        let c = comp("keyword,comp_combined\n롱원피스,3\n롱원피스,9\n");
        let out = ScoreComputer::new(&config("")).compute(&b, Some(&c));
        assert_eq!(out.records[0].combined_competition, 3.0);
    }

    #[test]
    fn test_unmatched_rows_score_without_nan() {
        let b = base("seed_index,related_sanitized\n0,빅사이즈 원피스\n0,니트\n");
        let c = comp("seed_index,related_sanitized,comp_coupang,comp_naver,comp_combined\n0,니트,,,\n");
        let out = ScoreComputer::new(&config("빅사이즈:1.0")).compute(&b, Some(&c));
        for r in &out.records {
            assert!(r.score.is_finite());
            assert!((0.0..=100.0).contains(&r.score));
            assert_eq!(r.competition_norm, 0.0);
        }
        assert_eq!(out.records[0].keyword, "빅사이즈 원피스");
        assert_eq!(out.records[0].intent_proxy, 1.0);
    }

    #[test]
    fn test_score_formula() {
        let b = base("seed_index,related_sanitized\n0,빅사이즈 a\n0,b\n");
        let c = comp("seed_index,related_sanitized,comp_combined\n0,빅사이즈 a,10\n0,b,0\n");
        let cfg = config("빅사이즈:1");
        let out = ScoreComputer::new(&cfg).compute(&b, Some(&c));
        let w = cfg.weights;
        let top = out.records.iter().find(|r| r.keyword == "빅사이즈 a").unwrap();
        assert!((top.score - 100.0 * w.intent).abs() < 1e-9);
        let other = out.records.iter().find(|r| r.keyword == "b").unwrap();
        assert!((other.score - 100.0 * w.competition).abs() < 1e-9);
    }

    #[test]
    fn test_duplicates_dropped_keeping_first() {
        let b = base("seed_index,related_sanitized\n1,니트\n1.0,니트\n2,니트\n");
        let out = ScoreComputer::new(&config("")).compute(&b, None);
        assert_eq!(out.records.len(), 2);
        assert!(!out.with_coupang);
    }

    #[test]
    fn test_sorted_by_seed_then_score() {
        let b = base("seed_index,related_sanitized\n10,a\n2,빅사이즈 b\n2,c\n");
        let out = ScoreComputer::new(&config("빅사이즈:1")).compute(&b, None);
        let order: Vec<(&str, &str)> = out.records.iter().map(|r| (r.seed.as_str(), r.keyword.as_str())).collect();
        assert_eq!(order, vec![("2", "빅사이즈 b"), ("2", "c"), ("10", "a")]);
    }

    #[test]
    fn test_load_base_falls_back_and_reports_sources() {
        let dir = tempfile::tempdir().unwrap();
        let sanitized = dir.path().join("sanitized.csv");
        std::fs::write(&sanitized, "keyword,category,keyword_sanitized\n무료 니트,,니트\n").unwrap();
        let b = load_base(&dir.path().join("expanded.csv"), &sanitized).unwrap();
        assert_eq!(b.rows[0].keyword, "무료 니트");
        assert_eq!(b.rows[0].keyword_sanitized, "니트");
        assert!(!b.has_seed);

        let numeric = dir.path().join("numeric.csv");
        std::fs::write(&numeric, "id,count\n1,2\n").unwrap();
        let err = load_base(&dir.path().join("missing.csv"), &numeric).unwrap_err().to_string();
        assert!(err.contains("not found"));
        assert!(err.contains("columns=[id, count]"));
    }
}
