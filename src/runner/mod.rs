//! Verification runner abstraction
//!
//! A runner performs the expensive per-unit check for a cache miss and
//! writes the unit's coverage fragment to the path it is given.

mod command;

pub use command::CommandRunner;

use crate::error::CovcacheResult;
use crate::units::Unit;
use async_trait::async_trait;
use std::path::Path;

/// Captured result of a successful verification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Standard output, forwarded to the user
    pub stdout: String,
}

/// Abstract verification interface
///
/// Implementations return `Err` for any failure, including a non-zero exit;
/// callers treat it as fatal for the whole invocation.
#[async_trait]
pub trait UnitRunner: Send + Sync {
    /// Verify `unit`, writing its fragment to `output`
    async fn run(&self, unit: &Unit, output: &Path) -> CovcacheResult<RunOutput>;

    /// Human-readable runner name for display
    fn runner_name(&self) -> &str;
}
