//! States of the conversation loop.

/// Where the loop is. A session starts in [`LoopState::AwaitingInput`] and ends in
/// [`LoopState::Terminated`]; every other state is transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Next input comes from the carry-over slot or, if empty, the operator.
    AwaitingInput,
    /// History ends with a user turn and is ready to send.
    Dispatching,
    /// The model asked to run `command` only with operator approval.
    AwaitingConfirmation { command: String },
    /// `command` is cleared to run.
    Executing { command: String },
    Terminated(StopReason),
}

impl LoopState {
    pub fn name(&self) -> &'static str {
        match self {
            LoopState::AwaitingInput => "awaiting_input",
            LoopState::Dispatching => "dispatching",
            LoopState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            LoopState::Executing { .. } => "executing",
            LoopState::Terminated(_) => "terminated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Terminated(_))
    }
}

/// Why a session ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model answered with `type: "terminate"`.
    ModelTerminated,
    /// Operator input reached end of file.
    OperatorClosed,
}

/// Operator answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmDecision {
    Approved,
    Declined,
}

impl ConfirmDecision {
    /// Only `yes`, in any letter case, approves. Everything else declines.
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim_end_matches(['\r', '\n']).eq_ignore_ascii_case("yes") {
            ConfirmDecision::Approved
        } else {
            ConfirmDecision::Declined
        }
    }
}
