// Suggestion source trait — where related keywords come from.
//
// The default implementation calls the public Naver autocomplete endpoint.
// Tests and offline runs substitute an in-memory source.

use anyhow::Result;
use async_trait::async_trait;

/// A service that returns related search phrases for a seed.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Tag written into the `source` column of expansion output.
    fn tag(&self) -> &str;

    /// Fetch raw suggestions for `seed`, in the service's order.
    ///
    /// An `Err` means the service could not be reached after retries;
    /// an empty `Ok` means it answered with nothing.
    async fn suggest(&self, seed: &str) -> Result<Vec<String>>;
}
