//! vinyx-common — Shared types and errors used across all Vinyx crates.

pub mod error;
pub mod record;

// Re-export commonly used types
pub use error::{Result, VinyxError};
pub use record::ResultRecord;
