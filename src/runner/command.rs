//! Runner executing a configured external command (`go test` by default)

use crate::config::schema::RunnerConfig;
use crate::error::{CovcacheError, CovcacheResult};
use crate::process::{error_output, CommandTemplate};
use crate::runner::{RunOutput, UnitRunner};
use crate::units::Unit;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Runs the verification command once per cache miss
pub struct CommandRunner {
    template: CommandTemplate,
    mode: String,
}

impl CommandRunner {
    pub fn new(template: CommandTemplate, mode: impl Into<String>) -> Self {
        Self {
            template,
            mode: mode.into(),
        }
    }

    pub fn from_config(config: &RunnerConfig, mode: &str) -> CovcacheResult<Self> {
        let template = CommandTemplate::new("runner.command", config.command.clone())?;
        Ok(Self::new(template, mode))
    }
}

#[async_trait]
impl UnitRunner for CommandRunner {
    async fn run(&self, unit: &Unit, output: &Path) -> CovcacheResult<RunOutput> {
        let dir = unit.dir.to_string_lossy();
        let output_path = output.to_string_lossy();
        let (mut cmd, command_line) = self.template.command(&[
            ("unit", unit.id.as_str()),
            ("dir", &*dir),
            ("output", &*output_path),
            ("mode", self.mode.as_str()),
        ]);
        debug!("Executing: {}", command_line);

        let result = cmd
            .output()
            .await
            .map_err(|e| CovcacheError::command_failed(&command_line, e))?;

        let stdout = String::from_utf8_lossy(&result.stdout).into_owned();
        if result.status.success() {
            return Ok(RunOutput { stdout });
        }

        let stderr = String::from_utf8_lossy(&result.stderr);
        Err(CovcacheError::UnitFailed {
            unit: unit.id.clone(),
            code: result.status.code(),
            output: error_output(&stdout, &stderr),
        })
    }

    fn runner_name(&self) -> &str {
        self.template.name()
    }
}
