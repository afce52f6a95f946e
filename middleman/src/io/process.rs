//! Helpers for running child processes with fully captured output.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Spawn failure, kept apart from failures after the child started.
#[derive(Debug)]
pub enum RunError {
    /// The program could not be started at all.
    Spawn(std::io::Error),
    /// The child started but its output could not be collected.
    Capture(anyhow::Error),
}

/// Run a command to completion and capture stdout/stderr without risking pipe deadlocks.
///
/// Both pipes are drained on their own threads while the child runs, and the child is
/// waited on before returning, so no process outlives the call. Stdin is closed.
#[instrument(skip_all)]
pub fn run_command_capture(mut cmd: Command) -> Result<CommandOutput, RunError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().map_err(RunError::Spawn)?;

    let collected = (|| -> Result<CommandOutput> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;

        let stdout_handle = thread::spawn(move || read_stream(stdout));
        let stderr_handle = thread::spawn(move || read_stream(stderr));

        let status = child.wait().context("wait for command")?;
        let stdout = join_output(stdout_handle).context("join stdout")?;
        let stderr = join_output(stderr_handle).context("join stderr")?;

        debug!(exit_code = ?status.code(), "command finished");
        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    })();

    collected.map_err(|err| {
        // Reap the child if collection failed part way.
        let _ = child.kill();
        let _ = child.wait();
        RunError::Capture(err)
    })
}

fn join_output(handle: thread::JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).context("read output")?;
    Ok(buf)
}
