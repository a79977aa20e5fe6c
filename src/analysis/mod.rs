//! Analysis modules.
//!
//! Aggregation of listing data into summaries and estimates.

pub mod aggregator;

pub use aggregator::*;
