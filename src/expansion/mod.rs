// Expansion — related keyword discovery for sanitized seeds.

pub mod collector;
pub mod naver;
pub mod traits;

pub use collector::{ExpansionCollector, ExpansionRun, DEFAULT_MAX_PER_SEED};
pub use naver::NaverSuggest;
pub use traits::SuggestionSource;
