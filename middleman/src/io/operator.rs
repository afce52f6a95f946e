//! Operator terminal I/O.
//!
//! Everything the human sees or types passes through [`Operator`], so the loop can
//! be driven by scripted operators in tests. Colors are presentation only; they never
//! reach the conversation history.

use std::io::{BufRead, StdinLock, Stdout, Write};

use anyhow::{Context, Result};

use crate::core::types::ExecutionResult;

pub const INPUT_PROMPT: &str = ">> ";
pub const TERMINATED_NOTICE: &str = "Session terminated by AI.";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Abstraction over the human at the terminal.
pub trait Operator {
    /// Prompt for one line. `None` means input is closed.
    fn read_input(&mut self) -> Result<Option<String>>;

    /// Ask whether to run `command` and return the raw answer. `None` means input is closed.
    fn confirm(&mut self, command: &str) -> Result<Option<String>>;

    /// Show a model response's `content`.
    fn show_content(&mut self, content: &str) -> Result<()>;

    /// Echo a command that is about to run.
    fn show_command(&mut self, command: &str) -> Result<()>;

    /// Show what a command printed.
    fn show_output(&mut self, result: &ExecutionResult) -> Result<()>;

    /// Announce that the model ended the session.
    fn show_terminated(&mut self) -> Result<()>;
}

/// Line-oriented operator over any reader/writer pair, with ANSI color framing.
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<StdinLock<'static>, Stdout> {
    /// Operator bound to the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}").context("write prompt")?;
        self.output.flush().context("flush prompt")?;

        let mut line = String::new();
        let n = self.input.read_line(&mut line).context("read operator input")?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn read_input(&mut self) -> Result<Option<String>> {
        self.prompt_line(INPUT_PROMPT)
    }

    fn confirm(&mut self, command: &str) -> Result<Option<String>> {
        let prompt = format!("Run this command? {command} (yes/no): ");
        self.prompt_line(&prompt)
    }

    fn show_content(&mut self, content: &str) -> Result<()> {
        writeln!(self.output, "{content}").context("write content")
    }

    fn show_command(&mut self, command: &str) -> Result<()> {
        writeln!(self.output, "{YELLOW}{command}{RESET}").context("write command")
    }

    fn show_output(&mut self, result: &ExecutionResult) -> Result<()> {
        if !result.stdout.is_empty() {
            writeln!(self.output, "{YELLOW}--- STDOUT:{RESET}").context("write stdout header")?;
            write!(self.output, "{GREEN}{}{RESET}", result.stdout).context("write stdout")?;
        }
        if !result.stderr.is_empty() {
            writeln!(self.output, "{YELLOW}--- STDERR:{RESET}").context("write stderr header")?;
            write!(self.output, "{RED}{}{RESET}", result.stderr).context("write stderr")?;
        }
        self.output.flush().context("flush output")
    }

    fn show_terminated(&mut self) -> Result<()> {
        writeln!(self.output, "{TERMINATED_NOTICE}").context("write termination notice")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn operator(input: &str) -> TerminalOperator<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalOperator::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn read_input_prompts_and_strips_line_ending() {
        let mut op = operator("list files\r\n");
        assert_eq!(op.read_input().expect("read"), Some("list files".to_string()));
        assert_eq!(String::from_utf8(op.into_output()).expect("utf8"), ">> ");
    }

    #[test]
    fn read_input_returns_none_at_eof() {
        let mut op = operator("");
        assert_eq!(op.read_input().expect("read"), None);
    }

    #[test]
    fn confirm_shows_literal_command() {
        let mut op = operator("yes\n");
        assert_eq!(
            op.confirm("rm -rf build").expect("confirm"),
            Some("yes".to_string())
        );
        assert_eq!(
            String::from_utf8(op.into_output()).expect("utf8"),
            "Run this command? rm -rf build (yes/no): "
        );
    }

    #[test]
    fn confirm_at_eof_reports_closed_input() {
        let mut op = operator("");
        assert_eq!(op.confirm("ls").expect("confirm"), None);
    }

    #[test]
    fn confirm_empty_line_is_an_answer() {
        let mut op = operator("\n");
        assert_eq!(op.confirm("ls").expect("confirm"), Some(String::new()));
    }

    #[test]
    fn output_is_color_framed() {
        let mut op = operator("");
        op.show_output(&ExecutionResult {
            stdout: "a.txt\n".to_string(),
            stderr: "warn\n".to_string(),
            exit_code: Some(0),
        })
        .expect("show");
        let shown = String::from_utf8(op.into_output()).expect("utf8");
        assert_eq!(
            shown,
            "\x1b[33m--- STDOUT:\x1b[0m\n\x1b[32ma.txt\n\x1b[0m\x1b[33m--- STDERR:\x1b[0m\n\x1b[31mwarn\n\x1b[0m"
        );
    }

    #[test]
    fn empty_output_prints_nothing() {
        let mut op = operator("");
        op.show_output(&ExecutionResult {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(1),
        })
        .expect("show");
        assert!(op.into_output().is_empty());
    }
}
