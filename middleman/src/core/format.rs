//! Rendering of conversation events into the text block the model reads.
//!
//! Sections appear in a fixed order and only when their value is present:
//!
//! ```text
//! --- User Input:
//! --- COMMAND:
//! --- DECLINED
//! --- STDOUT:
//! --- STDERR:
//! ```
//!
//! Content is copied verbatim: no escaping, no truncation.

/// One event to render. Empty strings count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventRecord<'a> {
    pub user_input: Option<&'a str>,
    pub command: Option<&'a str>,
    pub declined: bool,
    pub stdout: Option<&'a str>,
    pub stderr: Option<&'a str>,
}

impl<'a> EventRecord<'a> {
    /// A command the operator refused to run.
    pub fn declined(command: &'a str) -> Self {
        Self {
            command: Some(command),
            declined: true,
            ..Self::default()
        }
    }

    /// A command that ran, with whatever it printed.
    pub fn executed(command: &'a str, stdout: &'a str, stderr: &'a str) -> Self {
        Self {
            command: Some(command),
            stdout: Some(stdout),
            stderr: Some(stderr),
            ..Self::default()
        }
    }
}

pub fn format_message(event: &EventRecord<'_>) -> String {
    let mut msg = String::new();
    push_section(&mut msg, "--- User Input:", event.user_input);
    push_section(&mut msg, "--- COMMAND:", event.command);
    if event.declined {
        msg.push_str("--- DECLINED\n");
    }
    push_section(&mut msg, "--- STDOUT:", event.stdout);
    push_section(&mut msg, "--- STDERR:", event.stderr);
    msg
}

fn push_section(msg: &mut String, header: &str, body: Option<&str>) {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return;
    };
    msg.push_str(header);
    msg.push('\n');
    msg.push_str(body);
    msg.push('\n');
}
