// Naver autocomplete — related shopping queries for a seed.
//
// The endpoint is unofficial and its JSON shape shifts over time, so
// instead of binding to a schema we walk every string leaf under `items`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::traits::SuggestionSource;
use crate::net::{HttpFetcher, ACCEPT_JSON};
use crate::sanitize::text::clean_term;

pub const DEFAULT_SUGGEST_URL: &str = "https://ac.search.naver.com/nx/ac";

/// Value written to the `source` column.
pub const SOURCE_TAG: &str = "naver_suggest";

pub struct NaverSuggest {
    fetcher: HttpFetcher,
    url: String,
}

impl NaverSuggest {
    pub fn new(fetcher: HttpFetcher, url: &str) -> Self {
        Self {
            fetcher,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl SuggestionSource for NaverSuggest {
    fn tag(&self) -> &str {
        SOURCE_TAG
    }

    async fn suggest(&self, seed: &str) -> Result<Vec<String>> {
        let params = [
            ("q", seed),
            ("st", "111"),
            ("r_format", "json"),
            ("q_enc", "utf-8"),
            ("r_or", "0"),
            ("frm", "shopping"),
            ("con", "1"),
        ];
        let body = self.fetcher.get_text(&self.url, &params, ACCEPT_JSON).await?;
        let suggestions = parse_suggestions(&body)?;
        debug!(seed = seed, count = suggestions.len(), "Fetched suggestions");
        Ok(suggestions)
    }
}

/// Extract suggestion strings from an autocomplete response body.
///
/// Every string leaf under `items` is whitespace-cleaned; empties and
/// repeats are dropped, first occurrence kept.
pub fn parse_suggestions(body: &str) -> Result<Vec<String>> {
    let data: Value = serde_json::from_str(body).context("Suggestion response is not JSON")?;

    let mut leaves = Vec::new();
    if let Some(items) = data.get("items") {
        walk_strings(items, &mut leaves);
    }

    let mut out: Vec<String> = Vec::new();
    for leaf in leaves {
        let term = clean_term(leaf);
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    Ok(out)
}

/// Depth-first collection of string leaves, arrays in order.
fn walk_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| walk_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| walk_strings(v, out)),
        _ => {}
    }
}
