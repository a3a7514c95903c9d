// Expansion collector — seeds to ranked, de-duplicated related keywords.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::traits::SuggestionSource;
use crate::models::{ExpansionRecord, SeedRecord};
use crate::output::progress_bar;
use crate::resolve::lexicon::Lexicon;
use crate::sanitize::sanitize;
use crate::sanitize::text::eq_ignore_case;

/// Default number of related keywords kept per seed.
pub const DEFAULT_MAX_PER_SEED: usize = 20;

/// Records from one pass over the seeds.
#[derive(Debug, Clone, Default)]
pub struct ExpansionRun {
    pub records: Vec<ExpansionRecord>,
    /// Set when the interrupt flag stopped the pass before the last seed
    pub interrupted: bool,
}

pub struct ExpansionCollector<'a> {
    source: &'a dyn SuggestionSource,
    lexicon: &'a Lexicon,
    max_per_seed: usize,
    interrupt: Arc<AtomicBool>,
}

impl<'a> ExpansionCollector<'a> {
    pub fn new(
        source: &'a dyn SuggestionSource,
        lexicon: &'a Lexicon,
        max_per_seed: usize,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            lexicon,
            max_per_seed,
            interrupt,
        }
    }

    /// Expand one seed. Seeds that sanitized to nothing are skipped, and a
    /// source failure yields no records for this seed only.
    pub async fn expand_seed(&self, seed: &SeedRecord) -> Vec<ExpansionRecord> {
        if seed.sanitized.is_empty() || self.max_per_seed == 0 {
            return Vec::new();
        }

        let raw = match self.source.suggest(&seed.sanitized).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    seed = %seed.sanitized,
                    error = %format!("{e:#}"),
                    "Suggestion fetch failed, continuing without expansions for this seed"
                );
                return Vec::new();
            }
        };

        let records = self.select(seed, &raw);
        debug!(seed = %seed.sanitized, raw = raw.len(), kept = records.len(), "Expanded seed");
        records
    }

    /// Sanitize and filter raw suggestions into ranked records.
    ///
    /// Suggestions that are empty or equal to the seed (ignoring case),
    /// before or after sanitizing, are dropped. Suggestions that sanitize
    /// to the same text collapse into the first. Ranks are 1..=n with no gaps.
    pub fn select(&self, seed: &SeedRecord, raw: &[String]) -> Vec<ExpansionRecord> {
        let mut records: Vec<ExpansionRecord> = Vec::new();

        for suggestion in raw {
            if records.len() >= self.max_per_seed {
                break;
            }
            if suggestion.trim().is_empty() || eq_ignore_case(suggestion, &seed.sanitized) {
                continue;
            }
            let (related, _) = sanitize(suggestion, &self.lexicon.words, &self.lexicon.symbols);
            if related.is_empty() || eq_ignore_case(&related, &seed.sanitized) {
                continue;
            }
            if records.iter().any(|r| r.related_sanitized == related) {
                continue;
            }
            records.push(ExpansionRecord {
                seed_index: seed.index,
                seed_original: seed.original.clone(),
                seed_sanitized: seed.sanitized.clone(),
                related_original: suggestion.clone(),
                related_sanitized: related,
                rank: records.len() + 1,
                source: self.source.tag().to_string(),
            });
        }
        records
    }

    /// Expand every seed in order, stopping before the next seed once the
    /// interrupt flag is set.
    pub async fn expand_all(&self, seeds: &[SeedRecord]) -> ExpansionRun {
        let pb = progress_bar("Expand", seeds.len());
        let mut run = ExpansionRun::default();
        let mut empty_seeds = 0usize;

        for seed in seeds {
            if self.interrupt.load(Ordering::SeqCst) {
                run.interrupted = true;
                warn!("Interrupted during expansion");
                break;
            }
            let records = self.expand_seed(seed).await;
            if records.is_empty() {
                empty_seeds += 1;
            }
            run.records.extend(records);
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            seeds = seeds.len(),
            expanded = run.records.len(),
            seeds_without_results = empty_seeds,
            interrupted = run.interrupted,
            "Expansion complete"
        );
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedSource(Vec<String>);

    #[async_trait]
    impl SuggestionSource for FixedSource {
        fn tag(&self) -> &str {
            "fixed"
        }
        async fn suggest(&self, _seed: &str) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct DownSource;

    #[async_trait]
    impl SuggestionSource for DownSource {
        fn tag(&self) -> &str {
            "down"
        }
        async fn suggest(&self, _seed: &str) -> Result<Vec<String>> {
            anyhow::bail!("connection reset")
        }
    }

    fn seed(text: &str) -> SeedRecord {
        SeedRecord {
            index: 7,
            original: text.into(),
            sanitized: text.into(),
            category: String::new(),
        }
    }

    fn no_interrupt() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_dedupes_by_sanitized_text_with_contiguous_ranks() {
        let source = FixedSource(strings(&[
            "니트",
            "니트 가디건 특가",
            "니트 가디건",
            "",
            "롱니트",
        ]));
        let lexicon = Lexicon::new(strings(&["특가"]), Vec::new());
        let collector = ExpansionCollector::new(&source, &lexicon, 20, no_interrupt());
        let records = collector.expand_seed(&seed("니트")).await;

        let related: Vec<&str> = records.iter().map(|r| r.related_sanitized.as_str()).collect();
        assert_eq!(related, vec!["니트 가디건", "롱니트"]);
        assert_eq!(records[0].related_original, "니트 가디건 특가");
        assert_eq!(records.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
        assert!(records.iter().all(|r| r.seed_index == 7 && r.source == "fixed"));
    }

    #[tokio::test]
    async fn test_suggestion_sanitizing_to_seed_is_dropped() {
        let source = FixedSource(strings(&["KNIT 특가", "knit sale"]));
        let lexicon = Lexicon::new(strings(&["특가"]), Vec::new());
        let collector = ExpansionCollector::new(&source, &lexicon, 20, no_interrupt());
        let records = collector.expand_seed(&seed("knit")).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].related_sanitized, "knit sale");
    }

    #[tokio::test]
    async fn test_caps_at_max_per_seed() {
        let source = FixedSource(strings(&["a1", "a2", "a3", "a4"]));
        let lexicon = Lexicon::new(Vec::new(), Vec::new());
        let collector = ExpansionCollector::new(&source, &lexicon, 2, no_interrupt());
        assert_eq!(collector.expand_seed(&seed("a")).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_source_yields_empty_and_continues() {
        let lexicon = Lexicon::new(Vec::new(), Vec::new());
        let collector = ExpansionCollector::new(&DownSource, &lexicon, 20, no_interrupt());
        let run = collector.expand_all(&[seed("니트"), seed("원피스")]).await;
        assert!(run.records.is_empty());
        assert!(!run.interrupted);
    }

    #[tokio::test]
    async fn test_empty_sanitized_seed_is_skipped() {
        let source = FixedSource(strings(&["anything"]));
        let lexicon = Lexicon::new(Vec::new(), Vec::new());
        let collector = ExpansionCollector::new(&source, &lexicon, 20, no_interrupt());
        let mut s = seed("무료");
        s.sanitized = String::new();
        assert!(collector.expand_seed(&s).await.is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_stops_before_next_seed() {
        let source = FixedSource(strings(&["니트 가디건"]));
        let lexicon = Lexicon::new(Vec::new(), Vec::new());
        let collector = ExpansionCollector::new(&source, &lexicon, 20, Arc::new(AtomicBool::new(true)));
        let run = collector.expand_all(&[seed("니트"), seed("원피스")]).await;
        assert!(run.interrupted);
        assert!(run.records.is_empty());
    }
}
