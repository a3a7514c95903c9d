use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use kword::competition::{CountSource, SiteMode};
use kword::config::Settings;
use kword::expansion::{NaverSuggest, DEFAULT_MAX_PER_SEED};
use kword::net::{FetchOptions, HttpFetcher, RetryPolicy};
use kword::output::terminal;
use kword::pipeline::{self, RunOptions};
use kword::resolve::{EffectiveConfig, Overrides};
use kword::table::{read_csv, write_csv};
use kword::{status, verify};

/// kword: keyword discovery and ranking for marketplace listings.
///
/// Cleans seed phrases of promotional wording, expands them through search
/// suggestions, measures competition from marketplace result counts, and
/// ranks every candidate by intent and saturation.
#[derive(Parser)]
#[command(name = "kword", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Scoring weight and token overrides (highest precedence).
#[derive(Args, Clone, Default)]
struct ConfigArgs {
    /// Intent weight (renormalized with the competition weight)
    #[arg(long)]
    w_intent: Option<f64>,

    /// Competition weight (renormalized with the intent weight)
    #[arg(long)]
    w_competition: Option<f64>,

    /// Intent tokens, e.g. "빅사이즈:1.2;임산부:0.9" (replaces the config sheet's)
    #[arg(long)]
    tokens: Option<String>,
}

impl ConfigArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            w_intent: self.w_intent,
            w_competition: self.w_competition,
            tokens: self.tokens.clone(),
        }
    }
}

/// HTTP pacing for the suggestion service and search pages.
#[derive(Args, Clone)]
struct NetArgs {
    /// Minimum delay between requests, in seconds
    #[arg(long, default_value = "0.8")]
    sleep: f64,

    /// Retries per request after the first attempt
    #[arg(long, default_value = "2")]
    retries: u32,

    /// Per-request timeout, in seconds
    #[arg(long, default_value = "12")]
    timeout: f64,
}

impl NetArgs {
    fn fetch_options(&self, settings: &Settings) -> FetchOptions {
        let secs = |v: f64| Duration::from_secs_f64(if v.is_finite() { v.max(0.0) } else { 0.0 });
        FetchOptions {
            user_agent: settings.user_agent.clone(),
            timeout: secs(self.timeout),
            interval: secs(self.sleep),
            retry: RetryPolicy {
                retries: self.retries,
                base_delay: secs(self.sleep),
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Remove prohibited words and symbols from the seed keywords
    Sanitize {
        #[command(flatten)]
        config: ConfigArgs,

        /// Also drop empty "[]" pairs left behind by removals
        #[arg(long)]
        strip_brackets: bool,
    },

    /// Sanitize, then expand each seed with related search suggestions
    Expand {
        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        net: NetArgs,

        /// Related keywords to keep per seed
        #[arg(long, default_value_t = DEFAULT_MAX_PER_SEED)]
        expand: usize,

        #[arg(long)]
        strip_brackets: bool,
    },

    /// Fetch competitor result counts (resumable; re-run to continue)
    Competition {
        #[command(flatten)]
        net: NetArgs,

        /// Which sites to query
        #[arg(long, value_enum, default_value_t = SiteMode::Both)]
        site_mode: SiteMode,
    },

    /// Compute final scores from the stage outputs
    Score {
        #[command(flatten)]
        config: ConfigArgs,

        /// Rows to show in the terminal
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Run every stage: sanitize, expand, competition, score
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        net: NetArgs,

        #[arg(long, default_value_t = DEFAULT_MAX_PER_SEED)]
        expand: usize,

        #[arg(long, value_enum, default_value_t = SiteMode::Both)]
        site_mode: SiteMode,

        #[arg(long, default_value = "20")]
        top: usize,

        #[arg(long)]
        strip_brackets: bool,
    },

    /// Check the score table for missing columns, NaN, range and duplicates
    Verify,

    /// Keep the best-scoring row per (seed, keyword) in the score table
    Dedupe {
        /// Score table to read (default: the score stage output)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where to write the result (default: next to the score table)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show which pipeline artifacts exist
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kword=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::Sanitize {
            config,
            strip_brackets,
        } => {
            let effective = resolve(&settings, &config);
            let (seeds, audits) = pipeline::sanitize_stage(&settings, &effective, strip_brackets)?;
            terminal::display_sanitize_summary(&seeds, &audits);
            println!("\nSaved: {}", settings.sanitized_path().display());
        }

        Commands::Expand {
            config,
            net,
            expand,
            strip_brackets,
        } => {
            let effective = resolve(&settings, &config);
            let fetcher = HttpFetcher::new(&net.fetch_options(&settings))?;
            let source = NaverSuggest::new(fetcher, &settings.suggest_url);

            let interrupt = interrupt_flag();

            let (seeds, audits) = pipeline::sanitize_stage(&settings, &effective, strip_brackets)?;
            terminal::display_sanitize_summary(&seeds, &audits);
            let run = pipeline::expand_stage(&settings, &effective, &seeds, &source, expand, interrupt).await?;
            terminal::display_expansion_summary(seeds.len(), &run.records);
            if run.interrupted {
                println!("\nInterrupted; expansion table not written. Re-run to expand again.");
            } else {
                println!("\nSaved: {}", settings.expanded_path().display());
            }
        }

        Commands::Competition { net, site_mode } => {
            let fetcher = HttpFetcher::new(&net.fetch_options(&settings))?;
            let sources = pipeline::count_sources(&fetcher, site_mode);
            let interrupt = interrupt_flag();

            let summary = pipeline::competition_stage(&settings, as_refs(&sources), interrupt).await?;
            terminal::display_competition_summary(&summary);
            println!("\nOutput: {}", settings.competition_path().display());
        }

        Commands::Score { config, top } => {
            let effective = resolve(&settings, &config);
            let output = pipeline::score_stage(&settings, &effective)?;
            terminal::display_scores(&output.records, top);
            println!("Saved: {}", settings.scores_path().display());
        }

        Commands::Run {
            config,
            net,
            expand,
            site_mode,
            top,
            strip_brackets,
        } => {
            let effective = resolve(&settings, &config);
            let fetcher = HttpFetcher::new(&net.fetch_options(&settings))?;
            let suggestions = NaverSuggest::new(fetcher.clone(), &settings.suggest_url);
            let sources = pipeline::count_sources(&fetcher, site_mode);
            let interrupt = interrupt_flag();
            let options = RunOptions {
                max_per_seed: expand,
                strip_brackets,
            };

            let report = pipeline::run_all(
                &settings,
                &effective,
                &options,
                &suggestions,
                as_refs(&sources),
                interrupt,
            )
            .await?;

            terminal::display_sanitize_summary(&report.seeds, &report.audits);
            terminal::display_expansion_summary(report.seeds.len(), &report.expansions);
            terminal::display_competition_summary(&report.competition);
            if let Some(scores) = &report.scores {
                terminal::display_scores(&scores.records, top);
                println!("Saved: {}", settings.scores_path().display());
            } else if report.interrupted {
                println!("\nInterrupted before scoring. Re-run to resume.");
            }
        }

        Commands::Verify => {
            let report = verify::verify(&settings.scores_path(), &settings.artifacts())?;
            let report_path = settings.verify_report_path();
            report.write(&report_path)?;
            terminal::display_verify_report(&report);
            println!("\nReport: {}", report_path.display());
            if !report.is_ok() {
                anyhow::bail!("Verification found {} issue(s)", report.issues.len());
            }
        }

        Commands::Dedupe { input, output } => {
            let input = input.unwrap_or_else(|| settings.scores_path());
            let output = output.unwrap_or_else(|| settings.dedup_path());
            let table = read_csv(&input)?;
            let cleaned = verify::dedupe_by_best_score(&table)?;
            write_csv(&output, &cleaned)?;
            info!(before = table.len(), after = cleaned.len(), "Deduplicated score table");
            println!(
                "Wrote {} (rows: {} -> {})",
                output.display(),
                table.len(),
                cleaned.len()
            );
        }

        Commands::Status => {
            status::show(&settings);
        }
    }

    Ok(())
}

/// Resolve the effective config and print the run banner.
fn resolve(settings: &Settings, args: &ConfigArgs) -> EffectiveConfig {
    let effective = pipeline::resolve_config(settings, &args.overrides());
    terminal::display_config(&effective);
    effective
}

/// A flag set on Ctrl-C. The expansion stage checks it between seeds and
/// the competition stage between keywords, so no output is left with a
/// partial row.
fn interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let setter = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received; finishing the current item. Re-run to resume.");
            setter.store(true, Ordering::SeqCst);
        }
    });
    flag
}

fn as_refs(sources: &[Box<dyn CountSource>]) -> Vec<&dyn CountSource> {
    sources.iter().map(|s| s.as_ref()).collect()
}
