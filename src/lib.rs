//! Review tagging and running tag statistics.
//!
//! A review goes through the [`tagger::Dispatcher`] (capability-backed
//! tagging with a silent heuristic fallback), is appended to a
//! [`store::ReviewStore`], and folded once into an
//! [`aggregate::Aggregator`]. Summaries read the aggregate only.

pub mod aggregate;
pub mod api;
pub mod classifier;
pub mod config;
pub mod consts;
pub mod error;
pub mod prompts;
pub mod record;
pub mod service;
pub mod store;
pub mod tagger;
