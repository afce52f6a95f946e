//! Session state owned by the loop: the conversation history and the carry-over slot.

use crate::core::format::{EventRecord, format_message};
use crate::core::history::ConversationHistory;
use crate::core::types::ExecutionResult;

/// Feedback one iteration hands to the next.
///
/// Both variants render through the same formatter, but they reach the history in
/// different ways; see [`Feedback::records_assistant_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The operator refused to run `command`.
    Declined { command: String },
    /// `command` ran and produced `result`.
    Executed {
        command: String,
        result: ExecutionResult,
    },
}

impl Feedback {
    /// Formatted text the model will read.
    pub fn text(&self) -> String {
        match self {
            Feedback::Declined { command } => format_message(&EventRecord::declined(command)),
            Feedback::Executed { command, result } => format_message(&EventRecord::executed(
                command,
                &result.stdout,
                &result.stderr,
            )),
        }
    }

    /// Whether the text is also recorded as an assistant turn at the moment it is produced.
    ///
    /// Command output is: it lands in history as an assistant turn right away and again
    /// as the next user turn. A decline is not: it appears only once, as the next user turn,
    /// exactly like text the operator typed.
    pub fn records_assistant_turn(&self) -> bool {
        match self {
            Feedback::Declined { .. } => false,
            Feedback::Executed { .. } => true,
        }
    }
}

/// One interactive session. Lives as long as the process; never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    history: ConversationHistory,
    carry_over: Option<String>,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            history: ConversationHistory::new(system_prompt),
            carry_over: None,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Carry-over text waiting to be used as the next input, if any.
    pub fn pending_carry_over(&self) -> Option<&str> {
        self.carry_over.as_deref()
    }

    /// Consume the carry-over slot, leaving it empty.
    pub fn take_carry_over(&mut self) -> Option<String> {
        self.carry_over.take()
    }

    pub fn push_user_input(&mut self, text: impl Into<String>) {
        self.history.push_user(text);
    }

    /// Record the model's payload exactly as received.
    pub fn record_model_reply(&mut self, raw: impl Into<String>) {
        self.history.push_assistant(raw);
    }

    /// Store `feedback` as the next iteration's input, replacing any pending carry-over.
    pub fn carry(&mut self, feedback: &Feedback) {
        let text = feedback.text();
        if feedback.records_assistant_turn() {
            self.history.push_assistant(text.clone());
        }
        self.carry_over = Some(text);
    }
}
