// Competition output sink — append-only CSV, header kept stable.
//
// An existing file keeps its own header so appends stay column-compatible
// with earlier runs; cells are filled by header name. A row is composed in
// full before it is written, then flushed, so an interrupt never leaves a
// half-written line.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::CompetitionRecord;
use crate::table::{ensure_parent_dir, format_float, read_csv};

pub const DEFAULT_COMPETITION_HEADERS: &[&str] = &[
    "seed_index",
    "seed_sanitized",
    "related_sanitized",
    "comp_coupang",
    "comp_naver",
    "comp_combined",
    "timestamp",
];

/// What a header cell receives.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Seed,
    SeedLabel,
    Keyword,
    Coupang,
    Naver,
    Combined,
    Timestamp,
    Blank,
}

fn field_for(header: &str) -> Field {
    match header.trim().to_lowercase().as_str() {
        "seed_index" | "seed" | "seed_name" | "parent" | "root" | "group" | "source_seed" => Field::Seed,
        "seed_sanitized" | "seed_label" | "seed_original" => Field::SeedLabel,
        "related_sanitized" | "keyword" | "keyword_sanitized" | "term" | "query" => Field::Keyword,
        "comp_coupang" | "coupang" | "comp_cp" => Field::Coupang,
        "comp_naver" | "naver" | "comp_nv" => Field::Naver,
        "comp_combined" | "combined" | "score_comp" => Field::Combined,
        "timestamp" | "ts" | "scraped_at" => Field::Timestamp,
        _ => Field::Blank,
    }
}

fn ends_with_newline(path: &Path) -> Result<bool> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(bytes.last().map_or(true, |b| *b == b'\n'))
}

pub struct CompetitionSink {
    headers: Vec<String>,
    fields: Vec<Field>,
    writer: csv::Writer<File>,
}

impl CompetitionSink {
    /// Open `path` for appending. A non-empty existing file keeps its header.
    pub fn open(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let existing = std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
        let headers: Vec<String> = if existing {
            read_csv(path)?.headers
        } else {
            DEFAULT_COMPETITION_HEADERS.iter().map(|h| h.to_string()).collect()
        };
        if !headers.iter().any(|h| field_for(h) == Field::Keyword) {
            anyhow::bail!(
                "Existing competition output {} has no keyword column; found columns: [{}]",
                path.display(),
                headers.join(", ")
            );
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open competition output {}", path.display()))?;
        if existing && !ends_with_newline(path)? {
            file.write_all(b"\n")?;
        }
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if !existing {
            writer.write_record(&headers)?;
            writer.flush()?;
        }

        Ok(Self {
            fields: headers.iter().map(|h| field_for(h)).collect(),
            headers,
            writer,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Compose the row for `record` under this sink's header.
    fn compose(&self, record: &CompetitionRecord) -> Vec<String> {
        let count = |c: Option<u64>| c.map(|n| n.to_string()).unwrap_or_default();
        self.fields
            .iter()
            .map(|field| match field {
                Field::Seed => record.seed.clone(),
                Field::SeedLabel => record.seed_label.clone(),
                Field::Keyword => record.keyword.clone(),
                Field::Coupang => count(record.count_coupang),
                Field::Naver => count(record.count_naver),
                Field::Combined => format_float(record.combined),
                Field::Timestamp => record.timestamp.clone(),
                Field::Blank => String::new(),
            })
            .collect()
    }

    /// Write one record and flush it to disk.
    pub fn write(&mut self, record: &CompetitionRecord) -> Result<()> {
        let row = self.compose(record);
        self.writer
            .write_record(&row)
            .context("Failed to write competition row")?;
        self.writer.flush().context("Failed to flush competition output")?;
        Ok(())
    }
}
