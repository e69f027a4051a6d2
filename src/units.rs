//! Unit discovery
//!
//! Listing units and resolving a unit to its source directory are external
//! collaborators. The engine only needs the identifiers (opaque, used for
//! cache keys) and one directory per identifier.

use crate::config::schema::UnitsConfig;
use crate::error::{CovcacheError, CovcacheResult};
use crate::process::{error_output, CommandTemplate};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A unit with its resolved source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Hierarchical identifier, e.g. a Go import path
    pub id: String,
    /// Absolute source directory
    pub dir: PathBuf,
}

/// Lists units and resolves their directories
#[async_trait]
pub trait UnitSource: Send + Sync {
    /// Ordered unit identifiers, read once per invocation
    async fn list(&self) -> CovcacheResult<Vec<String>>;

    /// Absolute source directory of `id`
    async fn resolve(&self, id: &str) -> CovcacheResult<PathBuf>;
}

/// `UnitSource` backed by configured commands (`go list` by default)
pub struct CommandUnitSource {
    list: CommandTemplate,
    resolve: CommandTemplate,
    source_root: Option<PathBuf>,
    cwd: PathBuf,
}

impl CommandUnitSource {
    pub fn from_config(config: &UnitsConfig, cwd: PathBuf) -> CovcacheResult<Self> {
        Ok(Self {
            list: CommandTemplate::new("units.list", config.list.clone())?,
            resolve: CommandTemplate::new("units.resolve", config.resolve.clone())?,
            source_root: config.source_root.clone(),
            cwd,
        })
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

#[async_trait]
impl UnitSource for CommandUnitSource {
    async fn list(&self) -> CovcacheResult<Vec<String>> {
        let (mut cmd, command_line) = self.list.command(&[]);
        debug!("Listing units: {}", command_line);

        let output = cmd
            .output()
            .await
            .map_err(|e| CovcacheError::command_failed(&command_line, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CovcacheError::UnitList {
                command: command_line,
                reason: error_output(&stdout, &stderr),
            });
        }

        Ok(parse_unit_list(&stdout))
    }

    async fn resolve(&self, id: &str) -> CovcacheResult<PathBuf> {
        if let Some(root) = &self.source_root {
            return Ok(self.absolutize(&root.join(id)));
        }

        let (mut cmd, command_line) = self.resolve.command(&[("unit", id)]);
        let output = cmd
            .output()
            .await
            .map_err(|e| CovcacheError::command_failed(&command_line, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CovcacheError::UnitResolve {
                unit: id.to_string(),
                reason: error_output(&stdout, &stderr),
            });
        }

        let dir = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| CovcacheError::UnitResolve {
                unit: id.to_string(),
                reason: format!("`{}` printed nothing", command_line),
            })?;

        Ok(self.absolutize(Path::new(dir)))
    }
}

/// One identifier per non-blank line, surrounding whitespace trimmed
fn parse_unit_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
