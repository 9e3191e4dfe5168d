//! Session history and statistics
//!
//! The store keeps the append-only record of completed sessions; the stats
//! queries aggregate it for display and export.

pub mod stats;
pub mod store;

// Re-export commonly used types
pub use stats::{ExportRow, Tally, TrendLine};
pub use store::{ResultsStore, SessionKind, SessionResult};
