//! Search execution for gw-search.
//!
//! The [`SearchOrchestrator`] validates a query's renderer, submits the
//! search, waits for it to finish and fetches the results in the shape the
//! renderer needs.

pub mod orchestrator;

pub use orchestrator::{PreparedSearch, SearchOrchestrator, SearchRequest, WaitOptions};

/// Bucket count used by chart searches; condenses results into one value
/// per category.
pub const CHART_BUCKETS: u64 = 1;
