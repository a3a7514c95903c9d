// Error log — one CSV row per failed site lookup, flushed immediately.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::table::ensure_parent_dir;

pub const ERROR_LOG_HEADERS: &[&str] = &["ts", "site", "seed", "keyword", "url", "error"];

pub struct ErrorLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl ErrorLog {
    /// Open for appending, writing the header when the file is new or empty.
    pub fn open(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open error log {}", path.display()))?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(ERROR_LOG_HEADERS)?;
            writer.flush()?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn record(&mut self, site: &str, seed: &str, keyword: &str, url: &str, error: &str) -> Result<()> {
        let ts = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        self.writer
            .write_record([ts.as_str(), site, seed, keyword, url, error])
            .with_context(|| format!("Failed to write to error log {}", self.path.display()))?;
        self.writer.flush()?;
        Ok(())
    }
}
