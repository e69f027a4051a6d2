//! Error types for covcache
//!
//! All modules use `CovcacheResult<T>` as their return type. Nothing below
//! `main` terminates the process; errors travel up and `main` picks the
//! exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for covcache operations
pub type CovcacheResult<T> = Result<T, CovcacheError>;

/// All errors that can occur in covcache
#[derive(Error, Debug)]
pub enum CovcacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command template `{name}` is empty")]
    EmptyCommand { name: String },

    // Cache errors
    #[error("Failed to prepare cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to checksum {dir}: {source}")]
    ChecksumFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid unit identifier: {0:?}")]
    InvalidUnit(String),

    // Unit discovery errors
    #[error("Listing units with `{command}` failed: {reason}")]
    UnitList { command: String, reason: String },

    #[error("Could not resolve directory for unit {unit}: {reason}")]
    UnitResolve { unit: String, reason: String },

    // Execution errors
    #[error("Verification failed for {unit} (exit code: {})", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    UnitFailed {
        unit: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Verification of {unit} succeeded but wrote no fragment to {path}")]
    MissingFragment { unit: String, path: PathBuf },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Report errors
    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CovcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Captured command output attached to the error, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::UnitFailed { output, .. } if !output.is_empty() => Some(output.as_str()),
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } => Some("Inspect the merged settings with: covcache config show"),
            Self::EmptyCommand { .. } => Some("Set the command in .covcache.toml or the global config"),
            Self::UnitList { .. } => Some("Check that [units] list runs from the current directory"),
            Self::UnitResolve { .. } => Some("Set [units] source_root to skip the resolve command"),
            Self::MissingFragment { .. } => {
                Some("The [runner] command must write the fragment to {output}")
            }
            Self::CommandFailed { .. } => Some("Is the command installed and on PATH?"),
            _ => None,
        }
    }
}
