// Scoring — intent and competition sub-scores combined into one rank.

pub mod compute;
pub mod intent;
pub mod normalize;

pub use compute::{load_base, load_competition, ScoreComputer, ScoreOutput};
