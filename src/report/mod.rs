//! Aggregate coverage report
//!
//! Joins every committed fragment into one coverprofile-style file with a
//! single `mode:` header.

mod merge;

pub use merge::{MergeSummary, ReportMerger, SkippedFragment};

/// Prefix of a fragment's header line
pub const MODE_PREFIX: &str = "mode:";
