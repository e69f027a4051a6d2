//! covcache - content-addressed cache for per-unit coverage runs
//!
//! Skips re-running the verification command (`go test -coverprofile` by
//! default) for units whose source tree is byte-for-byte unchanged, and
//! merges every unit's fragment into a single coverage profile.

pub mod cache;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod process;
pub mod report;
pub mod runner;
pub mod ui;
pub mod units;

pub use error::{CovcacheError, CovcacheResult};
