//! Test-only scripted collaborators for driving the loop without a network, a shell,
//! or a terminal.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use anyhow::{Result, anyhow};

use crate::core::history::ConversationHistory;
use crate::core::types::{ExecutionResult, Turn};
use crate::io::completion::{Completion, CompletionClient, completion_from_raw};
use crate::io::operator::Operator;
use crate::io::shell::{LaunchFailure, Shell};

/// Raw payload for a `plain` response.
pub fn plain_payload(content: &str) -> String {
    serde_json::json!({"type": "plain", "content": content, "command": null, "confirm": false})
        .to_string()
}

/// Raw payload for a `command` response.
pub fn command_payload(content: &str, command: &str, confirm: bool) -> String {
    serde_json::json!({"type": "command", "content": content, "command": command, "confirm": confirm})
        .to_string()
}

/// Raw payload for a `terminate` response.
pub fn terminate_payload(content: &str) -> String {
    serde_json::json!({"type": "terminate", "content": content, "command": null, "confirm": false})
        .to_string()
}

/// Execution result with exit code 0.
pub fn ok_output(stdout: &str, stderr: &str) -> ExecutionResult {
    ExecutionResult {
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        exit_code: Some(0),
    }
}

/// Completion client that replays raw payloads in order and records each history it saw.
pub struct ScriptedClient {
    payloads: RefCell<VecDeque<String>>,
    seen: RefCell<Vec<Vec<Turn>>>,
}

impl ScriptedClient {
    pub fn new(payloads: Vec<String>) -> Self {
        Self {
            payloads: RefCell::new(payloads.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Histories passed to each `complete` call, in call order.
    pub fn seen(&self) -> Vec<Vec<Turn>> {
        self.seen.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.borrow().len()
    }
}

impl CompletionClient for ScriptedClient {
    fn complete(&self, history: &ConversationHistory) -> Result<Completion> {
        self.seen.borrow_mut().push(history.turns().to_vec());
        let raw = self
            .payloads
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted client has no payload left"))?;
        completion_from_raw(raw)
    }
}

/// One scripted shell run.
#[derive(Debug, Clone)]
pub enum ScriptedRun {
    Output(ExecutionResult),
    LaunchFailure,
}

/// Shell that replays scripted runs and records the commands it was asked to run.
pub struct ScriptedShell {
    runs: RefCell<VecDeque<ScriptedRun>>,
    commands: RefCell<Vec<String>>,
}

impl ScriptedShell {
    pub fn new(runs: Vec<ScriptedRun>) -> Self {
        Self {
            runs: RefCell::new(runs.into()),
            commands: RefCell::new(Vec::new()),
        }
    }

    pub fn with_outputs(outputs: Vec<ExecutionResult>) -> Self {
        Self::new(outputs.into_iter().map(ScriptedRun::Output).collect())
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl Shell for ScriptedShell {
    fn execute(&self, command: &str) -> Result<ExecutionResult> {
        self.commands.borrow_mut().push(command.to_string());
        match self.runs.borrow_mut().pop_front() {
            Some(ScriptedRun::Output(result)) => Ok(result),
            Some(ScriptedRun::LaunchFailure) => Err(LaunchFailure {
                interpreter: "scripted-sh".to_string(),
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted launch failure"),
            }
            .into()),
            None => Err(anyhow!("scripted shell has no run left for '{command}'")),
        }
    }
}

/// Something shown to or asked of a scripted operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorEvent {
    Prompted,
    AskedToConfirm(String),
    Content(String),
    Command(String),
    Output(ExecutionResult),
    Terminated,
}

/// Operator with queued input lines and confirmation answers.
///
/// Exhausted input lines and exhausted confirmation answers both read as end of file.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    inputs: VecDeque<String>,
    answers: VecDeque<String>,
    pub events: Vec<OperatorEvent>,
}

impl ScriptedOperator {
    pub fn new(inputs: &[&str], answers: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            answers: answers.iter().map(|s| s.to_string()).collect(),
            events: Vec::new(),
        }
    }

    pub fn prompts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, OperatorEvent::Prompted))
            .count()
    }
}

impl Operator for ScriptedOperator {
    fn read_input(&mut self) -> Result<Option<String>> {
        self.events.push(OperatorEvent::Prompted);
        Ok(self.inputs.pop_front())
    }

    fn confirm(&mut self, command: &str) -> Result<Option<String>> {
        self.events
            .push(OperatorEvent::AskedToConfirm(command.to_string()));
        Ok(self.answers.pop_front())
    }

    fn show_content(&mut self, content: &str) -> Result<()> {
        self.events.push(OperatorEvent::Content(content.to_string()));
        Ok(())
    }

    fn show_command(&mut self, command: &str) -> Result<()> {
        self.events.push(OperatorEvent::Command(command.to_string()));
        Ok(())
    }

    fn show_output(&mut self, result: &ExecutionResult) -> Result<()> {
        self.events.push(OperatorEvent::Output(result.clone()));
        Ok(())
    }

    fn show_terminated(&mut self) -> Result<()> {
        self.events.push(OperatorEvent::Terminated);
        Ok(())
    }
}
