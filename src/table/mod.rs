// Flat tabular files — CSV tables with a header row, and headerless grids.
//
// Every stage of the pipeline reads and writes plain CSV. Upstream tables
// come from spreadsheets exported by hand, so reading is lenient: a UTF-8
// BOM is stripped, ragged rows are padded, and header names are trimmed.

pub mod columns;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// An in-memory CSV table. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column by name, ignoring case and surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    /// Cell at (row, col), or "" when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }
}

/// Read a file as UTF-8 text with any leading BOM removed.
fn read_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Read a CSV file whose first row is the header.
pub fn read_csv(path: &Path) -> Result<Table> {
    let text = read_text(path)?;
    parse_csv(&text).with_context(|| format!("Failed to parse CSV {}", path.display()))
}

/// Parse CSV text whose first row is the header.
pub fn parse_csv(text: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

/// Read a headerless CSV grid. Rows keep their own width.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<String>>> {
    let text = read_text(path)?;
    parse_grid(&text).with_context(|| format!("Failed to parse CSV grid {}", path.display()))
}

/// Parse headerless CSV text into rows of cells.
///
/// Parsed line by line so that blank lines survive as empty rows: config
/// blocks are terminated by the first blank row, and the csv reader would
/// otherwise skip them.
pub fn parse_grid(text: &str) -> Result<Vec<Vec<String>>> {
    let mut grid = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            grid.push(Vec::new());
            continue;
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());
        let row = match reader.records().next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => Vec::new(),
        };
        grid.push(row);
    }
    Ok(grid)
}

/// Write a table to `path`, replacing any existing file.
pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Format a float the way every output table does (six decimals, NaN as 0).
pub fn format_float(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.6}")
}

/// Parse a numeric cell. Empty, unparseable, and non-finite values give `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Canonical form of a seed label: trimmed, and plain integer labels
/// written without a fraction, so `1`, `1.0` and ` 1 ` group together.
/// Only unsigned digits with an optional all-zero fraction count as
/// integers; `1e3`, `-3` and `1.5` are kept as written.
pub fn canon_seed(value: &str) -> String {
    let trimmed = value.trim();
    let (int_part, fraction) = match trimmed.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (trimmed, None),
    };
    let digits = !int_part.is_empty() && int_part.bytes().all(|b| b.is_ascii_digit());
    let zero_fraction = fraction.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b == b'0'));
    if !(digits && zero_fraction) {
        return trimmed.to_string();
    }
    match int_part.trim_start_matches('0') {
        "" => "0".to_string(),
        stripped => stripped.to_string(),
    }
}

/// Order seed labels: numbers numerically, then text lexicographically.
pub fn compare_seeds(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canon_seed() {
        assert_eq!(canon_seed("1.0"), "1");
        assert_eq!(canon_seed(" 12 "), "12");
        assert_eq!(canon_seed("007"), "7");
        assert_eq!(canon_seed("0.00"), "0");
        assert_eq!(canon_seed("1.5"), "1.5");
        assert_eq!(canon_seed("1."), "1.");
        assert_eq!(canon_seed("니트"), "니트");
        assert_eq!(canon_seed(""), "");
    }

    #[test]
    fn test_compare_seeds_numeric_aware() {
        use std::cmp::Ordering;
        assert_eq!(compare_seeds("2", "10"), Ordering::Less);
        assert_eq!(compare_seeds("b", "a"), Ordering::Greater);
        assert_eq!(compare_seeds("10", "2a"), Ordering::Less);
        assert_eq!(compare_seeds("니트", "3"), Ordering::Greater);
    }

    #[test]
    fn test_parse_csv_pads_short_rows() {
        let table = parse_csv("keyword,category\n니트\n원피스,여성\n").unwrap();
        assert_eq!(table.headers, vec!["keyword", "category"]);
        assert_eq!(table.rows[0], vec!["니트", ""]);
        assert_eq!(table.cell(1, 1), "여성");
    }

    #[test]
    fn test_read_csv_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}Keyword\n니트\n").unwrap();
        let table = read_csv(&path).unwrap();
        assert_eq!(table.column_index("keyword"), Some(0));
    }

    #[test]
    fn test_parse_grid_keeps_ragged_rows() {
        let grid = parse_grid("key,value\nW_intent,0.6,extra\n\ntoken,weight\n").unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0].len(), 2);
        assert_eq!(grid[1].len(), 3);
        assert!(grid[2].is_empty());
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let table = Table::new(["a"]);
        assert_eq!(table.cell(3, 7), "");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let mut table = Table::new(["seed", "keyword"]);
        table.push_row(vec!["1".into(), "롱 니트, 원피스".into()]);
        write_csv(&path, &table).unwrap();
        assert_eq!(read_csv(&path).unwrap(), table);
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number(" 3.5 "), Some(3.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_format_float_zeroes_nan() {
        assert_eq!(format_float(f64::NAN), "0.000000");
        assert_eq!(format_float(1.5), "1.500000");
    }
}
