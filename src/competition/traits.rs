// Competitor count source trait — one search surface, one number.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// The competitor marketplaces whose result counts measure saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Site {
    Coupang,
    Naver,
}

impl Site {
    pub fn name(&self) -> &'static str {
        match self {
            Site::Coupang => "coupang",
            Site::Naver => "naver",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which sites to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SiteMode {
    #[default]
    Both,
    Coupang,
    Naver,
}

impl SiteMode {
    pub fn includes(&self, site: Site) -> bool {
        match self {
            SiteMode::Both => true,
            SiteMode::Coupang => site == Site::Coupang,
            SiteMode::Naver => site == Site::Naver,
        }
    }
}

/// A search surface that reports how many listings match a keyword.
#[async_trait]
pub trait CountSource: Send + Sync {
    fn site(&self) -> Site;

    /// Human-readable URL for error logs.
    fn search_url(&self, keyword: &str) -> String;

    /// `Ok(None)` means the page was fetched but carried no usable count;
    /// `Err` means it could not be fetched after retries.
    async fn count(&self, keyword: &str) -> Result<Option<u64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_mode_includes() {
        assert!(SiteMode::Both.includes(Site::Coupang));
        assert!(SiteMode::Both.includes(Site::Naver));
        assert!(!SiteMode::Naver.includes(Site::Coupang));
        assert_eq!(SiteMode::default(), SiteMode::Both);
    }
}
