// kword: keyword discovery and ranking for e-commerce listings
//
// This is the library root. Each module corresponds to a stage of the
// keyword pipeline or to the plumbing the stages share.

pub mod competition;
pub mod config;
pub mod expansion;
pub mod models;
pub mod net;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod sanitize;
pub mod scoring;
pub mod status;
pub mod table;
pub mod verify;
