// Config resolution — one immutable effective configuration per run.
//
// Weights, intent tokens, and the prohibited lexicon each come from three
// tiers: command-line overrides, the spreadsheet config sheet, and the
// built-in defaults. Resolution never fails; a tier that is missing or
// malformed simply yields to the next one.

pub mod defaults;
pub mod lexicon;
pub mod sheet;
pub mod tokens;

use serde::Serialize;
use tracing::info;

use self::defaults::{DEFAULT_W_COMPETITION, DEFAULT_W_INTENT};
use self::lexicon::Lexicon;
use self::sheet::ConfigSheet;
use self::tokens::{parse_token_list, TokenTable};

/// Scoring weights. Always non-negative and summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub intent: f64,
    pub competition: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self::normalized(DEFAULT_W_INTENT, DEFAULT_W_COMPETITION)
    }
}

impl Weights {
    /// Renormalize a raw pair to sum 1. Negative axes clamp to 0; a
    /// non-finite pair or one with no positive total gives the defaults.
    pub fn normalized(intent: f64, competition: f64) -> Self {
        let defaults = || {
            let total = DEFAULT_W_INTENT + DEFAULT_W_COMPETITION;
            Self {
                intent: DEFAULT_W_INTENT / total,
                competition: DEFAULT_W_COMPETITION / total,
            }
        };
        if !intent.is_finite() || !competition.is_finite() {
            return defaults();
        }
        let (intent, competition) = (intent.max(0.0), competition.max(0.0));
        let total = intent + competition;
        if !total.is_finite() || total <= 0.0 {
            return defaults();
        }
        Self {
            intent: intent / total,
            competition: competition / total,
        }
    }

    /// Pick each axis independently: override, else sheet, else default.
    pub fn resolve(overrides: (Option<f64>, Option<f64>), sheet: (Option<f64>, Option<f64>)) -> Self {
        let intent = overrides.0.or(sheet.0).unwrap_or(DEFAULT_W_INTENT);
        let competition = overrides.1.or(sheet.1).unwrap_or(DEFAULT_W_COMPETITION);
        Self::normalized(intent, competition)
    }
}

/// Command-line overrides, the highest precedence tier.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub w_intent: Option<f64>,
    pub w_competition: Option<f64>,
    /// Raw token list, e.g. `"빅사이즈:1.2;임산부:0.9"`. Replaces the
    /// sheet's tokens entirely when it yields at least one token.
    pub tokens: Option<String>,
}

/// The fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub weights: Weights,
    pub tokens: TokenTable,
    pub lexicon: Lexicon,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            tokens: TokenTable::builtin(),
            lexicon: Lexicon::builtin(),
        }
    }
}

impl EffectiveConfig {
    /// Merge the three tiers.
    ///
    /// `base_lexicon` is the default lexicon (built-in or loaded from JSON);
    /// the sheet's word/symbol extras are unioned onto it.
    pub fn resolve(sheet: &ConfigSheet, base_lexicon: &Lexicon, overrides: &Overrides) -> Self {
        let weights = Weights::resolve((overrides.w_intent, overrides.w_competition), sheet.weights());

        let cli_tokens = overrides
            .tokens
            .as_deref()
            .map(parse_token_list)
            .unwrap_or_default();
        let tokens = if !cli_tokens.is_empty() {
            cli_tokens
        } else {
            let sheet_tokens = sheet.tokens();
            if sheet_tokens.is_empty() {
                TokenTable::builtin()
            } else {
                sheet_tokens
            }
        };

        let lexicon = base_lexicon.merged_with(&sheet.extra_words(), &sheet.extra_symbols());

        let config = Self {
            weights,
            tokens,
            lexicon,
        };
        info!(
            w_intent = config.weights.intent,
            w_competition = config.weights.competition,
            tokens = config.tokens.len(),
            words = config.lexicon.words.len(),
            symbols = config.lexicon.symbols.len(),
            "Resolved effective configuration"
        );
        config
    }

    /// One-line description for run banners.
    pub fn summary(&self) -> String {
        format!(
            "W_intent={:.4}, W_competition={:.4} | tokens={} [{}] | prohibited words={}, symbols={}",
            self.weights.intent,
            self.weights.competition,
            self.tokens.len(),
            self.tokens.preview(5),
            self.lexicon.words.len(),
            self.lexicon.symbols.len(),
        )
    }
}
