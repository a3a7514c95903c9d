// Output formatting — terminal display and progress indicators.

pub mod terminal;

use indicatif::{ProgressBar, ProgressStyle};

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Byte slicing would panic in the middle of a Hangul syllable; this counts chars.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// A stage progress bar in the house style.
pub fn progress_bar(label: &str, len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let template = format!("  {label} [{{bar:30}}] {{pos}}/{{len}} ({{eta}})");
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        pb.set_style(style);
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("빅사이즈 원피스", 4), "빅사이즈...");
        assert_eq!(truncate_chars("니트", 4), "니트");
    }
}
