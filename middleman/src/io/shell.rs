//! Shell executor: run a free-form command line through the system interpreter.
//!
//! The [`Shell`] trait keeps the loop independent of real process execution. Tests
//! use scripted shells that return canned [`ExecutionResult`]s.

use std::fmt;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{error, info, instrument, warn};

use crate::core::types::ExecutionResult;
use crate::io::config::ShellConfig;
use crate::io::process::{RunError, run_command_capture};

/// Abstraction over command execution.
pub trait Shell {
    /// Run `command` to completion. A nonzero exit is data, not an error.
    ///
    /// Fails with [`LaunchFailure`] (inside `anyhow::Error`) when the interpreter
    /// itself cannot be started.
    fn execute(&self, command: &str) -> Result<ExecutionResult>;
}

/// The shell interpreter could not be invoked at all.
#[derive(Debug)]
pub struct LaunchFailure {
    pub interpreter: String,
    pub command: String,
    pub source: std::io::Error,
}

impl fmt::Display for LaunchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to launch shell '{}' for command '{}': {}",
            self.interpreter, self.command, self.source
        )
    }
}

impl std::error::Error for LaunchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Shell that spawns the configured interpreter (`sh -c` by default) with the
/// process's own environment and working directory. The command's stdin is closed,
/// so anything that reads input sees end of file instead of competing with the
/// operator prompt.
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: String,
    args: Vec<String>,
}

impl SystemShell {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new(&ShellConfig::default())
    }
}

impl Shell for SystemShell {
    #[instrument(skip_all, fields(program = %self.program))]
    fn execute(&self, command: &str) -> Result<ExecutionResult> {
        info!(command, "running command");
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(command);

        let output = match run_command_capture(cmd) {
            Ok(output) => output,
            Err(RunError::Spawn(source)) => {
                error!(err = %source, "failed to launch shell");
                return Err(LaunchFailure {
                    interpreter: self.program.clone(),
                    command: command.to_string(),
                    source,
                }
                .into());
            }
            Err(RunError::Capture(err)) => return Err(err).context("capture command output"),
        };

        let result = ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        if !result.success() {
            warn!(exit_code = ?result.exit_code, "command exited unsuccessfully");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_shell_syntax_not_argv() {
        let shell = SystemShell::default();
        let result = shell.execute("printf 'a.txt\\nb.txt\\n' | sort -r").expect("run");
        assert_eq!(result.stdout, "b.txt\na.txt\n");
        assert_eq!(result.stderr, "");
        assert_eq!(result.exit_code, Some(0));
    }

    #[test]
    fn nonzero_exit_is_data() {
        let shell = SystemShell::default();
        let result = shell.execute("echo oops >&2; exit 7").expect("run");
        assert_eq!(result.stderr, "oops\n");
        assert_eq!(result.exit_code, Some(7));
        assert!(!result.success());
    }

    #[test]
    fn command_stdin_is_closed() {
        let shell = SystemShell::default();
        let result = shell.execute("read line; echo status=$?").expect("run");
        assert_eq!(result.stdout, "status=1\n");
    }

    #[test]
    fn inherits_process_environment() {
        let shell = SystemShell::default();
        let result = shell.execute("printf %s \"$PATH\"").expect("run");
        assert_eq!(result.stdout, std::env::var("PATH").unwrap_or_default());
    }

    #[test]
    fn missing_interpreter_is_launch_failure() {
        let shell = SystemShell::new(&ShellConfig {
            program: "/nonexistent/shell".to_string(),
            args: vec!["-c".to_string()],
        });
        let err = shell.execute("ls").unwrap_err();
        let launch = err
            .downcast_ref::<LaunchFailure>()
            .expect("launch failure");
        assert_eq!(launch.interpreter, "/nonexistent/shell");
        assert_eq!(launch.command, "ls");
    }
}
