// Unit tests for config resolution.
//
// Three tiers (command line, config sheet, built-ins) resolved per setting:
// weight precedence and renormalization, token replacement, lexicon
// union, and fallbacks for missing or malformed sources.

use std::fs;

use kword::resolve::lexicon::Lexicon;
use kword::resolve::sheet::ConfigSheet;
use kword::resolve::tokens::parse_token_list;
use kword::resolve::{EffectiveConfig, Overrides, Weights};
use kword::table::parse_grid;

fn sheet(text: &str) -> ConfigSheet {
    ConfigSheet::from_grid(parse_grid(text).unwrap())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ============================================================
// Weights
// ============================================================

#[test]
fn defaults_when_nothing_configured() {
    let config = EffectiveConfig::resolve(&ConfigSheet::default(), &Lexicon::builtin(), &Overrides::default());
    assert!(close(config.weights.intent, 0.55));
    assert!(close(config.weights.competition, 0.45));
    assert_eq!(config.tokens.len(), 10);
}

#[test]
fn sheet_weights_are_renormalized() {
    let s = sheet("key,value\nW_intent,3\nW_competition,1\n");
    let config = EffectiveConfig::resolve(&s, &Lexicon::builtin(), &Overrides::default());
    assert!(close(config.weights.intent, 0.75));
    assert!(close(config.weights.competition, 0.25));
}

#[test]
fn override_beats_sheet_per_axis() {
    let s = sheet("key,value\nW_intent,0.2\nW_competition,0.8\n");
    let overrides = Overrides {
        w_intent: Some(0.8),
        ..Default::default()
    };
    let config = EffectiveConfig::resolve(&s, &Lexicon::builtin(), &overrides);
    assert!(close(config.weights.intent, 0.5));
    assert!(close(config.weights.competition, 0.5));
}

#[test]
fn literal_scan_finds_weight_outside_block() {
    let s = sheet("notes,,\n,W_intent,0.9\n,W_competition,\n,0.1,\n");
    assert_eq!(s.weights(), (Some(0.9), Some(0.1)));
}

#[test]
fn zero_total_falls_back_to_defaults() {
    let w = Weights::normalized(0.0, 0.0);
    assert!(close(w.intent, 0.55));
    let w = Weights::normalized(-1.0, 2.0);
    assert!(close(w.intent, 0.0));
    assert!(close(w.competition, 1.0));
    let w = Weights::normalized(f64::NAN, 1.0);
    assert!(close(w.intent + w.competition, 1.0));
}

// ============================================================
// Tokens
// ============================================================

#[test]
fn sheet_tokens_replace_builtins_and_respect_enabled() {
    let s = sheet("token,weight,enabled\n빅사이즈,1.5,\n임산부,0.9,false\n하객,0,true\n홈웨어,0.4,yes\n");
    let config = EffectiveConfig::resolve(&s, &Lexicon::builtin(), &Overrides::default());
    let tokens: Vec<(&str, f64)> = config.tokens.iter().collect();
    assert_eq!(tokens, vec![("빅사이즈", 1.5), ("홈웨어", 0.4)]);
}

#[test]
fn command_line_tokens_replace_sheet_tokens() {
    let s = sheet("token,weight,enabled\n빅사이즈,1.5,\n");
    let overrides = Overrides {
        tokens: Some("롱:0.7;기모:0.2".into()),
        ..Default::default()
    };
    let config = EffectiveConfig::resolve(&s, &Lexicon::builtin(), &overrides);
    assert_eq!(config.tokens.get("빅사이즈"), None);
    assert_eq!(config.tokens.get("롱"), Some(0.7));
}

#[test]
fn unusable_command_line_tokens_fall_through() {
    let overrides = Overrides {
        tokens: Some("broken;also:nan;zero:0".into()),
        ..Default::default()
    };
    let config = EffectiveConfig::resolve(&ConfigSheet::default(), &Lexicon::builtin(), &overrides);
    assert_eq!(config.tokens.len(), 10);
}

#[test]
fn token_list_accepts_both_separators() {
    let tokens = parse_token_list("빅사이즈:1.2;임산부:0.9,하객:0.7");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens.get("하객"), Some(0.7));
}

// ============================================================
// Lexicon
// ============================================================

#[test]
fn sheet_extras_union_onto_base_lexicon() {
    let s = sheet("word,enabled\n당일발송,\n무료,true\n협찬,no\n\nsymbol,enabled\n♥,1\n");
    let base = Lexicon::new(vec!["무료".to_string()], vec!["★".to_string()]);
    let config = EffectiveConfig::resolve(&s, &base, &Overrides::default());
    assert_eq!(config.lexicon.words, vec!["무료", "당일발송"]);
    assert_eq!(config.lexicon.symbols, vec!["★", "♥"]);
}

#[test]
fn multi_character_symbol_entries_split() {
    let lexicon = Lexicon::new(Vec::<String>::new(), vec!["【】".to_string(), "★".to_string(), "【".to_string()]);
    assert_eq!(lexicon.symbols, vec!["【", "】", "★"]);
}

#[test]
fn lexicon_file_loads_and_bad_files_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("lexicon.json");
    fs::write(&good, r#"{"words": ["협찬", "  무료   배송 "], "symbols": ["♥"]}"#).unwrap();
    let lexicon = Lexicon::load(Some(good.as_path()));
    assert_eq!(lexicon.words, vec!["협찬", "무료 배송"]);
    assert_eq!(lexicon.symbols, vec!["♥"]);

    let bad = dir.path().join("bad.json");
    fs::write(&bad, "{not json").unwrap();
    assert_eq!(Lexicon::load(Some(bad.as_path())), Lexicon::builtin());
    assert_eq!(Lexicon::load(Some(dir.path().join("missing.json").as_path())), Lexicon::builtin());
}

#[test]
fn missing_sheet_file_is_empty_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let s = ConfigSheet::load(Some(dir.path().join("config.csv").as_path()));
    assert!(s.is_empty());
    assert_eq!(s.weights(), (None, None));
}

#[test]
fn summary_names_weights_and_counts() {
    let summary = EffectiveConfig::default().summary();
    assert!(summary.contains("W_intent=0.5500"));
    assert!(summary.contains("tokens=10"));
}
