//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_duration, format_mean, format_optional, format_timestamp, truncate_string};
