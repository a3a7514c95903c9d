// Colored terminal output for stage summaries and the ranked score table.
//
// main.rs delegates all human-facing formatting here; library code logs
// through tracing instead of printing.

use colored::Colorize;

use super::truncate_chars;
use crate::competition::AggregateSummary;
use crate::models::{ExpansionRecord, ScoreRecord, SeedRecord};
use crate::resolve::EffectiveConfig;
use crate::sanitize::SanitizeAudit;
use crate::verify::VerifyReport;

/// Banner with the effective configuration for this run.
pub fn display_config(config: &EffectiveConfig) {
    println!("\n{}", "=== Effective configuration ===".bold());
    println!(
        "  Weights: W_intent={:.4}, W_competition={:.4}",
        config.weights.intent, config.weights.competition
    );
    println!("  Tokens ({}): {}", config.tokens.len(), config.tokens.preview(10));
    println!(
        "  Prohibited: {} words, {} symbols",
        config.lexicon.words.len(),
        config.lexicon.symbols.len()
    );
}

/// Sanitize stage summary with a sample of changed seeds.
pub fn display_sanitize_summary(seeds: &[SeedRecord], audits: &[SanitizeAudit]) {
    let changed: Vec<&SanitizeAudit> = audits.iter().filter(|a| a.changed).collect();
    println!("\n{}", "=== Sanitize ===".bold());
    println!("  Rows changed: {} / {}", changed.len().to_string().yellow(), seeds.len());
    for audit in changed.iter().take(10) {
        println!("  • '{}' -> '{}'", audit.original, audit.sanitized.green());
    }
}

pub fn display_expansion_summary(seed_count: usize, records: &[ExpansionRecord]) {
    println!("\n{}", "=== Expansion ===".bold());
    println!("  Seeds processed: {seed_count}");
    println!("  Expanded rows: {}", records.len().to_string().green());
    for r in records.iter().take(10) {
        println!("  • [{}] -> ({:02}) {}", r.seed_sanitized, r.rank, r.related_sanitized);
    }
}

pub fn display_competition_summary(summary: &AggregateSummary) {
    println!("\n{}", "=== Competition ===".bold());
    println!(
        "  Written: {}  Skipped (already done): {}  Failed: {}",
        summary.written.to_string().green(),
        summary.skipped,
        if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().normal()
        },
    );
    if summary.interrupted {
        println!("  {} Interrupted. Partial results kept; re-run to resume.", "!".yellow());
    }
}

/// Top-N rows of the ranked score table.
pub fn display_scores(records: &[ScoreRecord], top: usize) {
    if records.is_empty() {
        println!("No keywords scored. Run `kword expand` or `kword sanitize` first.");
        return;
    }

    let mut ranked: Vec<&ScoreRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    println!(
        "\n{}",
        format!("=== Top keywords ({} of {}) ===", top.min(ranked.len()), ranked.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<6} {:<32} {:>6}  {:>6}  {:>6}",
        "Rank".dimmed(),
        "Seed".dimmed(),
        "Keyword".dimmed(),
        "Score".dimmed(),
        "Intent".dimmed(),
        "Comp".dimmed(),
    );
    println!("  {}", "-".repeat(70).dimmed());

    for (i, r) in ranked.iter().take(top).enumerate() {
        println!(
            "  {:>4}. {:<6} {:<32} {:>6}  {:>6.2}  {:>6.2}",
            i + 1,
            truncate_chars(&r.seed, 6),
            truncate_chars(&r.keyword, 30),
            colorize_score(r.score),
            r.intent_norm,
            r.competition_norm,
        );
    }
    println!();
}

pub fn display_verify_report(report: &VerifyReport) {
    println!("\n{}", "=== Verify ===".bold());
    for a in &report.artifacts {
        let rows = a.rows.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
        println!("  {:<12} {} rows={}", a.name, a.path.display(), rows);
    }
    if report.is_ok() {
        println!("  {} no issues", "OK".green().bold());
    } else {
        for issue in &report.issues {
            println!("  {} {}", "!!".red().bold(), issue);
        }
    }
}

/// Higher is better: strong scores green, middling yellow.
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("{score:.1}");
    if score >= 70.0 {
        text.green().bold()
    } else if score >= 40.0 {
        text.yellow()
    } else {
        text.normal()
    }
}
