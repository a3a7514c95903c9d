use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::expansion::naver::DEFAULT_SUGGEST_URL;
use crate::net::DEFAULT_USER_AGENT;

pub const SANITIZED_FILE: &str = "sanitized_keywords.csv";
pub const EXPANDED_FILE: &str = "expanded_keywords.csv";
pub const COMPETITION_FILE: &str = "competition_counts.csv";
pub const SCORES_FILE: &str = "keyword_scores.csv";
pub const DEDUP_FILE: &str = "keyword_scores_dedup.csv";
pub const VERIFY_REPORT_FILE: &str = "_verify_report.md";

/// Runtime settings loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so a bare checkout runs against `./data` and
/// writes to `./output`. Relative paths resolve against `base_dir`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_dir: PathBuf,
    /// Seed table (CSV with a `keyword` column)
    pub seeds_path: PathBuf,
    /// Headerless config grid (weights, tokens, lexicon extras)
    pub config_path: PathBuf,
    /// Default prohibited lexicon as JSON; built-ins when absent
    pub prohibited_json: PathBuf,
    pub output_dir: PathBuf,
    /// Per-site lookup failures from the competition stage
    pub error_log: PathBuf,
    pub user_agent: String,
    pub suggest_url: String,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let base_dir = PathBuf::from(get("KWORD_BASE_DIR", "."));
        let resolve = |p: String| {
            let path = PathBuf::from(p);
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        Self {
            seeds_path: resolve(get("KWORD_SEEDS", "data/seeds.csv")),
            config_path: resolve(get("KWORD_CONFIG", "data/config.csv")),
            prohibited_json: resolve(get("KWORD_PROHIBITED_JSON", "config/prohibited_words_ko.json")),
            output_dir: resolve(get("KWORD_OUTPUT_DIR", "output")),
            error_log: resolve(get("KWORD_ERROR_LOG", "logs/errors.csv")),
            user_agent: get("KWORD_USER_AGENT", DEFAULT_USER_AGENT),
            suggest_url: get("KWORD_SUGGEST_URL", DEFAULT_SUGGEST_URL),
            base_dir,
        }
    }

    pub fn sanitized_path(&self) -> PathBuf {
        self.output_dir.join(SANITIZED_FILE)
    }

    pub fn expanded_path(&self) -> PathBuf {
        self.output_dir.join(EXPANDED_FILE)
    }

    pub fn competition_path(&self) -> PathBuf {
        self.output_dir.join(COMPETITION_FILE)
    }

    pub fn scores_path(&self) -> PathBuf {
        self.output_dir.join(SCORES_FILE)
    }

    pub fn dedup_path(&self) -> PathBuf {
        self.output_dir.join(DEDUP_FILE)
    }

    pub fn verify_report_path(&self) -> PathBuf {
        self.output_dir.join(VERIFY_REPORT_FILE)
    }

    /// Every pipeline artifact with a display name, in stage order.
    pub fn artifacts(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("sanitized", self.sanitized_path()),
            ("expanded", self.expanded_path()),
            ("competition", self.competition_path()),
            ("scores", self.scores_path()),
        ]
    }

    /// Check that the seed table exists.
    /// Call this before any stage that starts from the seeds.
    pub fn require_seeds(&self) -> Result<()> {
        if !self.seeds_path.exists() {
            anyhow::bail!(
                "Seed table not found: {}\n\
                 Create a CSV with a 'keyword' column (and optional 'category'),\n\
                 or point KWORD_SEEDS at one in your .env file.",
                self.seeds_path.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]);
        assert_eq!(s.seeds_path, PathBuf::from("./data/seeds.csv"));
        assert_eq!(s.scores_path(), PathBuf::from("./output").join(SCORES_FILE));
        assert_eq!(s.suggest_url, DEFAULT_SUGGEST_URL);
    }

    #[test]
    fn test_relative_paths_follow_base_dir() {
        let s = settings(&[("KWORD_BASE_DIR", "/srv/kw"), ("KWORD_OUTPUT_DIR", "out")]);
        assert_eq!(s.output_dir, PathBuf::from("/srv/kw/out"));
        assert_eq!(s.error_log, PathBuf::from("/srv/kw/logs/errors.csv"));
    }

    #[test]
    fn test_absolute_paths_kept_and_blank_values_ignored() {
        let s = settings(&[("KWORD_SEEDS", "/tmp/seeds.csv"), ("KWORD_USER_AGENT", "  ")]);
        assert_eq!(s.seeds_path, PathBuf::from("/tmp/seeds.csv"));
        assert_eq!(s.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_require_seeds_names_the_path() {
        let s = settings(&[("KWORD_SEEDS", "/no/such/seeds.csv")]);
        let err = s.require_seeds().unwrap_err().to_string();
        assert!(err.contains("/no/such/seeds.csv"));
    }
}
