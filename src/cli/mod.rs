//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use crate::config::Config;

impl Cli {
    /// Apply global path overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.cache_dir {
            config.cache.dir = dir.clone();
        }
        if let Some(report) = &self.report {
            config.cache.report = report.clone();
        }
        if self.verbose > 0 {
            config.general.verbose = true;
        }
    }
}
