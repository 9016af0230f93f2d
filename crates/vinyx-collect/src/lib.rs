//! vinyx-collect — Aggregates per-collection docking results into one ranked file.
//!
//! The collect job runs in three passes over the discovered result files:
//! 1. Estimate a global affinity margin from a top-percentile sample
//! 2. Filter each file to records at or below the margin, sorted ascending
//! 3. Stream a k-way merge of the filtered files into the final output

pub mod discover;
pub mod filter;
pub mod merge;
pub mod observer;
pub mod pipeline;
pub mod threshold;

pub use observer::{CollectObserver, TracingObserver};
pub use pipeline::{run_collect, CollectJob, CollectResult};
