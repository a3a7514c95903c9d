// Competitor search pages — Coupang and Naver result-count extraction.
//
// The pages are scraped without a browser, so extraction is a cascade:
// the stated total ("검색결과 12,345개") when the markup carries one, else
// the number of product cards rendered on the first page.

use std::sync::OnceLock;

use anyhow::Result;
use async_trait::async_trait;
use regex_lite::Regex;
use tracing::debug;

use super::traits::{CountSource, Site};
use crate::net::{HttpFetcher, ACCEPT_HTML};

pub const COUPANG_SEARCH_URL: &str = "https://www.coupang.com/np/search";
pub const NAVER_SHOPPING_URL: &str = "https://search.shopping.naver.com/search/all";
pub const NAVER_GENERAL_URL: &str = "https://search.naver.com/search.naver";

/// Parse a count such as "12,345", ignoring separators.
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

/// First pattern whose capture parses as a count wins.
fn first_count(patterns: &[Regex], html: &str) -> Option<u64> {
    patterns
        .iter()
        .filter_map(|re| re.captures(html))
        .find_map(|caps| caps.get(1).and_then(|m| parse_count(m.as_str())))
}

fn class_attr_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)<(li|div)\b[^>]*\bclass\s*=\s*["']([^"']*)["']"#).ok())
        .as_ref()
}

/// Count opening `tag` elements with a class token accepted by `wanted`.
fn count_cards(html: &str, tag: &str, wanted: impl Fn(&str) -> bool) -> Option<u64> {
    let n = class_attr_re()?
        .captures_iter(html)
        .filter(|caps| caps.get(1).is_some_and(|t| t.as_str().eq_ignore_ascii_case(tag)))
        .filter(|caps| caps.get(2).is_some_and(|c| c.as_str().split_whitespace().any(&wanted)))
        .count() as u64;
    (n > 0).then_some(n)
}

/// Result count from a Coupang search page.
pub fn extract_coupang_count(html: &str) -> Option<u64> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| compile(&[r"검색\s*결과\s*([\d,]+)\s*개"]));
    first_count(patterns, html).or_else(|| count_cards(html, "li", |class| class == "search-product"))
}

/// Result count from a Naver Shopping search page.
pub fn extract_naver_shopping_count(html: &str) -> Option<u64> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        compile(&[
            r"(?:검색결과|검색 결과)\s*([\d,]+)\s*(?:개|건)",
            r"총\s*([\d,]+)\s*건",
            r#""totalCount"\s*:\s*([\d,]+)"#,
            r#""total"\s*:\s*([\d,]+)"#,
        ])
    });
    first_count(patterns, html).or_else(|| {
        count_cards(html, "div", |class| class == "product_item" || class.starts_with("product_item__"))
    })
}

/// Result count from the general Naver search page ("약 1,234건").
pub fn extract_naver_general_count(html: &str) -> Option<u64> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| compile(&[r"약\s*([\d,]+)\s*건", r"([\d,]+)\s*건"]));
    first_count(patterns, html)
}

fn url_with_query(base: &str, param: &str, keyword: &str) -> String {
    reqwest::Url::parse_with_params(base, &[(param, keyword)])
        .map(|u| u.to_string())
        .unwrap_or_else(|_| base.to_string())
}

/// Coupang search-result count.
pub struct CoupangCount {
    fetcher: HttpFetcher,
}

impl CoupangCount {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl CountSource for CoupangCount {
    fn site(&self) -> Site {
        Site::Coupang
    }

    fn search_url(&self, keyword: &str) -> String {
        url_with_query(COUPANG_SEARCH_URL, "q", keyword)
    }

    async fn count(&self, keyword: &str) -> Result<Option<u64>> {
        let html = self
            .fetcher
            .get_text(COUPANG_SEARCH_URL, &[("component", ""), ("q", keyword)], ACCEPT_HTML)
            .await?;
        let count = extract_coupang_count(&html);
        debug!(keyword = keyword, count = ?count, "Coupang count");
        Ok(count)
    }
}

/// Naver result count: the shopping vertical first, then general search.
pub struct NaverCount {
    fetcher: HttpFetcher,
}

impl NaverCount {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl CountSource for NaverCount {
    fn site(&self) -> Site {
        Site::Naver
    }

    fn search_url(&self, keyword: &str) -> String {
        url_with_query(NAVER_SHOPPING_URL, "query", keyword)
    }

    async fn count(&self, keyword: &str) -> Result<Option<u64>> {
        let params = [("query", keyword)];

        let shopping_error = match self.fetcher.get_text(NAVER_SHOPPING_URL, &params, ACCEPT_HTML).await {
            Ok(html) => {
                if let Some(n) = extract_naver_shopping_count(&html) {
                    debug!(keyword = keyword, count = n, "Naver shopping count");
                    return Ok(Some(n));
                }
                None
            }
            Err(e) => {
                debug!(keyword = keyword, error = %format!("{e:#}"), "Naver shopping page failed, trying general search");
                Some(e)
            }
        };

        match self.fetcher.get_text(NAVER_GENERAL_URL, &params, ACCEPT_HTML).await {
            Ok(html) => {
                let count = extract_naver_general_count(&html);
                debug!(keyword = keyword, count = ?count, "Naver general count");
                Ok(count)
            }
            // Only an error when neither page could be fetched.
            Err(e) => match shopping_error {
                Some(first) => Err(e.context(format!("shopping page also failed: {first:#}"))),
                None => Ok(None),
            },
        }
    }
}
