//! Drive a session from its first prompt to termination.

use anyhow::Result;
use tracing::{info, instrument};

use crate::core::state::{LoopState, StopReason};
use crate::io::completion::CompletionClient;
use crate::io::operator::Operator;
use crate::io::shell::Shell;
use crate::session::Session;
use crate::step::advance;

/// Summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOutcome {
    pub stop: StopReason,
    /// Completion requests made.
    pub dispatches: u32,
    /// Commands handed to the shell.
    pub executions: u32,
}

/// Run the state machine from `AwaitingInput` until it reaches `Terminated`.
///
/// `on_transition` sees every state entered after the initial one. Any error from a
/// collaborator stops the loop immediately and is returned as is.
#[instrument(skip_all)]
pub fn run_loop<C, S, O, F>(
    session: &mut Session,
    client: &C,
    shell: &S,
    operator: &mut O,
    mut on_transition: F,
) -> Result<LoopOutcome>
where
    C: CompletionClient,
    S: Shell,
    O: Operator,
    F: FnMut(&LoopState),
{
    let mut state = LoopState::AwaitingInput;
    let mut dispatches = 0u32;
    let mut executions = 0u32;

    loop {
        match &state {
            LoopState::Dispatching => dispatches += 1,
            LoopState::Executing { .. } => executions += 1,
            LoopState::Terminated(stop) => {
                info!(?stop, dispatches, executions, "session ended");
                return Ok(LoopOutcome {
                    stop: *stop,
                    dispatches,
                    executions,
                });
            }
            LoopState::AwaitingInput | LoopState::AwaitingConfirmation { .. } => {}
        }
        state = advance(session, state, client, shell, operator)?;
        on_transition(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Turn;
    use crate::test_support::{
        ScriptedClient, ScriptedOperator, ScriptedShell, command_payload, ok_output,
        plain_payload, terminate_payload,
    };

    #[test]
    fn plain_then_closed_input() {
        let mut session = Session::new("sys");
        let client = ScriptedClient::new(vec![plain_payload("Hello!")]);
        let shell = ScriptedShell::new(Vec::new());
        let mut operator = ScriptedOperator::new(&["hi"], &[]);

        let outcome =
            run_loop(&mut session, &client, &shell, &mut operator, |_| {}).expect("loop");
        assert_eq!(
            outcome,
            LoopOutcome {
                stop: StopReason::OperatorClosed,
                dispatches: 1,
                executions: 0,
            }
        );
        assert_eq!(operator.prompts(), 2);
    }

    #[test]
    fn records_every_state_in_order() {
        let mut session = Session::new("sys");
        let client = ScriptedClient::new(vec![
            command_payload("check", "ls", true),
            terminate_payload("done"),
        ]);
        let shell = ScriptedShell::with_outputs(vec![ok_output("a\n", "")]);
        let mut operator = ScriptedOperator::new(&["look"], &["yes"]);

        let mut states = Vec::new();
        let outcome = run_loop(&mut session, &client, &shell, &mut operator, |s| {
            states.push(s.name());
        })
        .expect("loop");

        assert_eq!(
            states,
            vec![
                "dispatching",
                "awaiting_confirmation",
                "executing",
                "awaiting_input",
                "dispatching",
                "terminated",
            ]
        );
        assert_eq!(outcome.executions, 1);
        assert_eq!(outcome.dispatches, 2);
        assert_eq!(session.history().turns()[0], Turn::system("sys"));
    }

    #[test]
    fn client_error_stops_loop() {
        let mut session = Session::new("sys");
        let client = ScriptedClient::new(Vec::new());
        let shell = ScriptedShell::new(Vec::new());
        let mut operator = ScriptedOperator::new(&["hi", "again"], &[]);

        let err = run_loop(&mut session, &client, &shell, &mut operator, |_| {}).unwrap_err();
        assert!(err.to_string().contains("no payload left"));
        assert_eq!(operator.prompts(), 1);
    }
}
