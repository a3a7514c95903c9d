// Competition aggregator — resumable result-count collection.
//
// For each candidate keyword not yet in the output, ask every configured
// site for its result count, combine as log1p(a) + log1p(b), and append
// the row at once. A site failure is logged and counted as missing; the
// run itself never aborts on one keyword.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error_log::ErrorLog;
use super::resume::ResumeIndex;
use super::sink::CompetitionSink;
use super::traits::{CountSource, Site};
use crate::models::CompetitionRecord;
use crate::output::progress_bar;
use crate::table::columns::ColumnResolver;
use crate::table::{canon_seed, read_csv, Table};

/// One (seed, keyword) pair to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Canonical seed identifier, "" when the input has no seed column
    pub seed: String,
    /// Readable seed text, when the input carries one
    pub seed_label: String,
    pub keyword: String,
}

/// Pick the input table: expansion output when present, else sanitized seeds.
pub fn load_candidates(expanded: &Path, sanitized: &Path) -> Result<Vec<Candidate>> {
    let source = [expanded, sanitized].into_iter().find(|p| p.exists());
    let Some(source) = source else {
        anyhow::bail!(
            "No candidate input found; tried {} and {}. Run the expand or sanitize stage first.",
            expanded.display(),
            sanitized.display()
        );
    };
    let table = read_csv(source).with_context(|| format!("Failed to read candidates from {}", source.display()))?;
    let candidates = candidates_from_table(&table)
        .with_context(|| format!("Unusable candidate table {}", source.display()))?;
    info!(source = %source.display(), candidates = candidates.len(), "Loaded competition candidates");
    Ok(candidates)
}

/// Extract candidates from a table with inferred seed and keyword columns.
pub fn candidates_from_table(table: &Table) -> Result<Vec<Candidate>> {
    let Some(keyword_col) = ColumnResolver::keyword().resolve(table) else {
        anyhow::bail!(
            "Could not locate a keyword column; inspected columns: [{}]",
            table.headers.join(", ")
        );
    };
    let seed_col = ColumnResolver::seed().resolve(table);
    let label_col = table.column_index("seed_sanitized");

    Ok((0..table.len())
        .filter_map(|row| {
            let keyword = table.cell(row, keyword_col).trim();
            if keyword.is_empty() {
                return None;
            }
            Some(Candidate {
                seed: seed_col.map(|c| canon_seed(table.cell(row, c))).unwrap_or_default(),
                seed_label: label_col.map(|c| table.cell(row, c).trim().to_string()).unwrap_or_default(),
                keyword: keyword.to_string(),
            })
        })
        .collect())
}

/// `log1p(a) + log1p(b)`, a missing count contributing 0.
pub fn combine_counts(a: Option<u64>, b: Option<u64>) -> f64 {
    let term = |c: Option<u64>| (c.unwrap_or(0) as f64).ln_1p();
    term(a) + term(b)
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub candidates: usize,
    pub written: usize,
    /// Already present in the output before this run (or repeated in the input)
    pub skipped: usize,
    /// Every queried site failed; left for a later run
    pub failed: usize,
    pub interrupted: bool,
}

pub struct CompetitionAggregator<'a> {
    sources: Vec<&'a dyn CountSource>,
    interrupt: Arc<AtomicBool>,
}

impl<'a> CompetitionAggregator<'a> {
    pub fn new(sources: Vec<&'a dyn CountSource>, interrupt: Arc<AtomicBool>) -> Self {
        Self { sources, interrupt }
    }

    /// Process every candidate not already in `output`.
    pub async fn run(&self, candidates: &[Candidate], output: &Path, error_log: &Path) -> Result<AggregateSummary> {
        let mut done = ResumeIndex::load(output)?;
        let mut sink = CompetitionSink::open(output)?;
        let mut errors = ErrorLog::open(error_log)?;
        self.run_with(candidates, &mut done, &mut sink, &mut errors).await
    }

    /// Core loop over an injected resume index and writers.
    pub async fn run_with(
        &self,
        candidates: &[Candidate],
        done: &mut ResumeIndex,
        sink: &mut CompetitionSink,
        errors: &mut ErrorLog,
    ) -> Result<AggregateSummary> {
        let mut summary = AggregateSummary {
            candidates: candidates.len(),
            ..Default::default()
        };
        let pb = progress_bar("Competition", candidates.len());

        for candidate in candidates {
            if self.interrupt.load(Ordering::SeqCst) {
                summary.interrupted = true;
                warn!("Interrupted; partial results kept. Re-run to resume.");
                break;
            }
            pb.inc(1);

            if done.contains(&candidate.seed, &candidate.keyword) {
                summary.skipped += 1;
                continue;
            }

            match self.lookup(candidate, errors).await? {
                Some(record) => {
                    sink.write(&record)?;
                    done.insert(&candidate.seed, &candidate.keyword);
                    summary.written += 1;
                    debug!(
                        keyword = %candidate.keyword,
                        coupang = ?record.count_coupang,
                        naver = ?record.count_naver,
                        combined = record.combined,
                        "Wrote competition row"
                    );
                }
                None => summary.failed += 1,
            }
        }
        pb.finish_and_clear();

        info!(
            candidates = summary.candidates,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            interrupted = summary.interrupted,
            "Competition aggregation complete"
        );
        Ok(summary)
    }

    /// Query every source for one candidate. `None` when all of them failed.
    async fn lookup(&self, candidate: &Candidate, errors: &mut ErrorLog) -> Result<Option<CompetitionRecord>> {
        let mut coupang = None;
        let mut naver = None;
        let mut failures = 0usize;

        for source in &self.sources {
            match source.count(&candidate.keyword).await {
                Ok(count) => match source.site() {
                    Site::Coupang => coupang = count,
                    Site::Naver => naver = count,
                },
                Err(e) => {
                    failures += 1;
                    let message = format!("{e:#}");
                    warn!(
                        site = %source.site(),
                        keyword = %candidate.keyword,
                        error = %message,
                        "Count lookup failed"
                    );
                    errors.record(
                        source.site().name(),
                        &candidate.seed,
                        &candidate.keyword,
                        &source.search_url(&candidate.keyword),
                        &message,
                    )?;
                }
            }
        }

        if !self.sources.is_empty() && failures == self.sources.len() {
            return Ok(None);
        }

        Ok(Some(CompetitionRecord {
            seed: candidate.seed.clone(),
            seed_label: candidate.seed_label.clone(),
            keyword: candidate.keyword.clone(),
            count_coupang: coupang,
            count_naver: naver,
            combined: combine_counts(coupang, naver),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        }))
    }
}
