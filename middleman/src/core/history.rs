//! Append-only conversation history.

use crate::core::types::Turn;

/// Ordered turns of one session.
///
/// Index 0 is the system turn, set once by [`ConversationHistory::new`]. Later turns
/// are only ever appended; there is no API to edit or remove an existing turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
