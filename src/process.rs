//! External command helpers
//!
//! Collaborator commands (lister, resolver, verification) are configured as
//! argv templates with `{name}` placeholders, expanded per invocation.

use crate::error::{CovcacheError, CovcacheResult};
use std::process::Stdio;
use tokio::process::Command;

/// Max number of output lines to include in failure messages.
const ERROR_TAIL_LINES: usize = 50;

/// An argv template such as `["go", "test", "-coverprofile={output}", "{unit}"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    name: String,
    argv: Vec<String>,
}

impl CommandTemplate {
    /// Build a template; `name` identifies the config key in errors
    pub fn new(name: impl Into<String>, argv: Vec<String>) -> CovcacheResult<Self> {
        let name = name.into();
        if argv.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(CovcacheError::EmptyCommand { name });
        }
        Ok(Self { name, argv })
    }

    /// Substitute every `{key}` with its value in each argument
    pub fn expand(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.argv
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }

    /// Expanded command ready to spawn with piped output.
    ///
    /// The child is killed if the owning task is dropped.
    pub fn command(&self, vars: &[(&str, &str)]) -> (Command, String) {
        let argv = self.expand(vars);
        let command_line = argv.join(" ");

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        (cmd, command_line)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Extract the useful tail of command output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn error_output(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > ERROR_TAIL_LINES {
        lines[total - ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}
