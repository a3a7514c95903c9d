// Network plumbing — throttled, retrying HTTP shared by all external sources.

pub mod client;
pub mod retry;
pub mod throttle;

pub use client::{FetchOptions, HttpFetcher, ACCEPT_HTML, ACCEPT_JSON, DEFAULT_USER_AGENT};
pub use retry::RetryPolicy;
pub use throttle::Throttle;
