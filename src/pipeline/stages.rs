// Pipeline stages — each reads its inputs from disk and writes one artifact.
//
// Stages are independent entry points so a run can resume at any step.
// Network sources are passed in as trait objects; the binary builds the
// real ones, tests pass fakes.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::competition::{load_candidates, AggregateSummary, CompetitionAggregator, CountSource};
use crate::config::Settings;
use crate::expansion::{ExpansionCollector, ExpansionRun, SuggestionSource};
use crate::models::{expanded_table, sanitized_table, score_table, SeedRecord};
use crate::resolve::lexicon::Lexicon;
use crate::resolve::sheet::ConfigSheet;
use crate::resolve::{EffectiveConfig, Overrides};
use crate::sanitize::seeds::{load_seeds, sanitize_seeds};
use crate::sanitize::SanitizeAudit;
use crate::scoring::{load_base, load_competition, ScoreComputer, ScoreOutput};
use crate::table::write_csv;

/// Resolve the effective configuration from the config sheet, the lexicon
/// file, and command-line overrides. Never fails.
pub fn resolve_config(settings: &Settings, overrides: &Overrides) -> EffectiveConfig {
    let sheet = ConfigSheet::load(Some(settings.config_path.as_path()));
    let lexicon = Lexicon::load(Some(settings.prohibited_json.as_path()));
    EffectiveConfig::resolve(&sheet, &lexicon, overrides)
}

/// Load and sanitize the seeds, writing the sanitized table.
pub fn sanitize_stage(
    settings: &Settings,
    config: &EffectiveConfig,
    strip_brackets: bool,
) -> Result<(Vec<SeedRecord>, Vec<SanitizeAudit>)> {
    settings.require_seeds()?;
    let seeds = load_seeds(&settings.seeds_path)?;
    let (seeds, audits) = sanitize_seeds(&seeds, &config.lexicon, strip_brackets);

    let path = settings.sanitized_path();
    write_csv(&path, &sanitized_table(&seeds, &audits))?;
    info!(
        path = %path.display(),
        rows = seeds.len(),
        changed = audits.iter().filter(|a| a.changed).count(),
        "Wrote sanitized seeds"
    );
    Ok((seeds, audits))
}

/// Expand sanitized seeds through `source`, writing the expansion table.
///
/// An interrupted pass writes nothing: a partial table would look complete
/// to the later stages, so any previous expansion table is left as it was.
pub async fn expand_stage(
    settings: &Settings,
    config: &EffectiveConfig,
    seeds: &[SeedRecord],
    source: &dyn SuggestionSource,
    max_per_seed: usize,
    interrupt: Arc<AtomicBool>,
) -> Result<ExpansionRun> {
    let collector = ExpansionCollector::new(source, &config.lexicon, max_per_seed, interrupt);
    let run = collector.expand_all(seeds).await;

    let path = settings.expanded_path();
    if run.interrupted {
        warn!(path = %path.display(), "Expansion interrupted, table not written");
        return Ok(run);
    }
    write_csv(&path, &expanded_table(&run.records))?;
    info!(path = %path.display(), rows = run.records.len(), "Wrote expanded keywords");
    Ok(run)
}

/// Append competition counts for every candidate not yet processed.
pub async fn competition_stage(
    settings: &Settings,
    sources: Vec<&dyn CountSource>,
    interrupt: Arc<AtomicBool>,
) -> Result<AggregateSummary> {
    let candidates = load_candidates(&settings.expanded_path(), &settings.sanitized_path())?;
    let aggregator = CompetitionAggregator::new(sources, interrupt);
    aggregator
        .run(&candidates, &settings.competition_path(), &settings.error_log)
        .await
}

/// Merge candidates with competition counts and write the score table.
pub fn score_stage(settings: &Settings, config: &EffectiveConfig) -> Result<ScoreOutput> {
    let base = load_base(&settings.expanded_path(), &settings.sanitized_path())?;
    let competition = load_competition(&settings.competition_path())?;
    let output = ScoreComputer::new(config).compute(&base, competition.as_ref());

    let path = settings.scores_path();
    write_csv(
        &path,
        &score_table(&output.records, output.with_coupang, output.with_naver),
    )?;
    info!(path = %path.display(), rows = output.records.len(), "Wrote keyword scores");
    Ok(output)
}
