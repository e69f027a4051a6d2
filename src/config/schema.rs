//! Configuration schema for covcache
//!
//! Global configuration lives at `~/.config/covcache/config.toml`; a
//! project-local `.covcache.toml` overrides it table by table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache and report locations
    pub cache: CacheConfig,

    /// Unit discovery
    pub units: UnitsConfig,

    /// Verification command
    pub runner: RunnerConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one fragment per unit
    pub dir: PathBuf,

    /// Aggregate report written after every run
    pub report: PathBuf,

    /// Maximum concurrently verified units (0 = available cores)
    pub parallel: usize,

    /// Coverage mode written in the report header
    pub mode: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".cache"),
            report: PathBuf::from("profile.cov"),
            parallel: 0,
            mode: "count".to_string(),
        }
    }
}

impl CacheConfig {
    /// Effective worker count, never zero
    pub fn effective_parallel(&self) -> usize {
        if self.parallel > 0 {
            return self.parallel;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Unit lister and resolver commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// Command printing one unit identifier per line
    pub list: Vec<String>,

    /// Command printing a unit's source directory (`{unit}` placeholder)
    pub resolve: Vec<String>,

    /// When set, a unit's directory is `source_root/<unit>` and `resolve` is unused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            list: vec!["go".to_string(), "list".to_string(), "./...".to_string()],
            resolve: vec![
                "go".to_string(),
                "list".to_string(),
                "-f".to_string(),
                "{{.Dir}}".to_string(),
                "{unit}".to_string(),
            ],
            source_root: None,
        }
    }
}

/// Verification command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Command run for each cache miss.
    ///
    /// Placeholders: `{unit}`, `{dir}`, `{output}`, `{mode}`.
    pub command: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "go".to_string(),
                "test".to_string(),
                "-covermode={mode}".to_string(),
                "-coverprofile={output}".to_string(),
                "{unit}".to_string(),
            ],
        }
    }
}
