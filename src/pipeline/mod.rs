// Keyword pipeline: sanitize -> expand -> competition -> score.
//
// Data flows strictly forward through flat CSV artifacts. `run_all` runs
// every stage in order; the stages are also exposed one by one.

pub mod stages;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::competition::{AggregateSummary, CoupangCount, CountSource, NaverCount, Site, SiteMode};
use crate::config::Settings;
use crate::expansion::SuggestionSource;
use crate::models::{ExpansionRecord, SeedRecord};
use crate::net::HttpFetcher;
use crate::resolve::EffectiveConfig;
use crate::sanitize::SanitizeAudit;
use crate::scoring::ScoreOutput;

pub use stages::{competition_stage, expand_stage, resolve_config, sanitize_stage, score_stage};

/// Build the count sources selected by `mode`, Coupang first.
pub fn count_sources(fetcher: &HttpFetcher, mode: SiteMode) -> Vec<Box<dyn CountSource>> {
    let mut sources: Vec<Box<dyn CountSource>> = Vec::new();
    if mode.includes(Site::Coupang) {
        sources.push(Box::new(CoupangCount::new(fetcher.clone())));
    }
    if mode.includes(Site::Naver) {
        sources.push(Box::new(NaverCount::new(fetcher.clone())));
    }
    sources
}

/// Options for a full run that are not part of the effective config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_per_seed: usize,
    pub strip_brackets: bool,
}

/// Everything a full run produced.
#[derive(Debug, Default)]
pub struct RunReport {
    pub seeds: Vec<SeedRecord>,
    pub audits: Vec<SanitizeAudit>,
    pub expansions: Vec<ExpansionRecord>,
    pub competition: AggregateSummary,
    /// Ctrl-C stopped the run before it finished
    pub interrupted: bool,
    /// `None` when the run was interrupted before scoring
    pub scores: Option<ScoreOutput>,
}

/// Run every stage in order.
///
/// An interrupt during expansion stops the run before competition; one
/// during the competition stage stops it before scoring. Everything
/// written so far stays on disk for the next run.
pub async fn run_all(
    settings: &Settings,
    config: &EffectiveConfig,
    options: &RunOptions,
    suggestions: &dyn SuggestionSource,
    counts: Vec<&dyn CountSource>,
    interrupt: Arc<AtomicBool>,
) -> Result<RunReport> {
    let (seeds, audits) = sanitize_stage(settings, config, options.strip_brackets)?;
    let expansion = expand_stage(
        settings,
        config,
        &seeds,
        suggestions,
        options.max_per_seed,
        interrupt.clone(),
    )
    .await?;
    if expansion.interrupted {
        warn!("Skipping competition and scoring after interrupt");
        return Ok(RunReport {
            seeds,
            audits,
            expansions: expansion.records,
            interrupted: true,
            ..Default::default()
        });
    }

    let competition = competition_stage(settings, counts, interrupt.clone()).await?;

    let interrupted = interrupt.load(Ordering::SeqCst);
    let scores = if interrupted {
        warn!("Skipping scoring after interrupt");
        None
    } else {
        Some(score_stage(settings, config)?)
    };

    Ok(RunReport {
        seeds,
        audits,
        expansions: expansion.records,
        competition,
        interrupted,
        scores,
    })
}
