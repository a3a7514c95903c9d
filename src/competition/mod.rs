// Competition — market saturation from competitor search-result counts.

pub mod aggregator;
pub mod error_log;
pub mod resume;
pub mod sink;
pub mod sites;
pub mod traits;

pub use aggregator::{combine_counts, load_candidates, AggregateSummary, Candidate, CompetitionAggregator};
pub use sites::{CoupangCount, NaverCount};
pub use traits::{CountSource, Site, SiteMode};
