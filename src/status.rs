// Pipeline status display — which artifacts exist and how many rows each has.

use std::path::Path;

use colored::Colorize;

use crate::config::Settings;
use crate::table::read_csv;

/// Display pipeline status to the terminal.
pub fn show(settings: &Settings) {
    println!("{}", "=== Pipeline status ===".bold());
    print_input("Seeds", &settings.seeds_path);
    print_input("Config", &settings.config_path);
    print_input("Lexicon", &settings.prohibited_json);
    println!();

    let mut next_step: Option<&str> = None;
    for (name, path) in settings.artifacts() {
        match row_count(&path) {
            Some(rows) => println!("  {:<12} {} ({} rows)", name, path.display(), rows),
            None => {
                println!("  {:<12} {}", name, "not yet produced".dimmed());
                if next_step.is_none() {
                    next_step = Some(name);
                }
            }
        }
    }

    if let Some(rows) = row_count(&settings.error_log).filter(|&n| n > 0) {
        println!("\n  Lookup errors logged: {} ({})", rows, settings.error_log.display());
    }

    if let Some(stage) = next_step {
        let command = match stage {
            "sanitized" => "sanitize",
            "expanded" => "expand",
            "competition" => "competition",
            _ => "score",
        };
        println!("\n  Next: run `kword {command}` (or `kword run` for every stage)");
    }
}

fn print_input(label: &str, path: &Path) {
    let state = if path.exists() {
        "found".green()
    } else {
        "missing".yellow()
    };
    println!("  {:<8} {} ({})", label, path.display(), state);
}

/// Data rows in a CSV file, `None` when it is absent or unreadable.
pub fn row_count(path: &Path) -> Option<usize> {
    if !path.exists() {
        return None;
    }
    read_csv(path).ok().map(|t| t.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        assert_eq!(row_count(&path), None);
        std::fs::write(&path, "keyword\na\nb\n").unwrap();
        assert_eq!(row_count(&path), Some(2));
    }
}
