//! One transition of the conversation state machine.

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::response::StructuredResponse;
use crate::core::state::{ConfirmDecision, LoopState, StopReason};
use crate::io::completion::CompletionClient;
use crate::io::operator::Operator;
use crate::io::shell::Shell;
use crate::session::{Feedback, Session};

/// Advance the session by one state.
///
/// | from                    | to                                                      |
/// |-------------------------|---------------------------------------------------------|
/// | `AwaitingInput`         | `Dispatching`, or `Terminated` when input is closed     |
/// | `Dispatching`           | `AwaitingInput`, `AwaitingConfirmation`, `Executing`, `Terminated` |
/// | `AwaitingConfirmation`  | `Executing` on "yes", `Terminated` when input is closed, otherwise `AwaitingInput` |
/// | `Executing`             | `AwaitingInput`                                         |
/// | `Terminated`            | `Terminated`                                            |
///
/// Errors from the completion client (including `MalformedResponseError`) and the shell
/// (including `LaunchFailure`) are returned unchanged; the session is then over.
#[instrument(skip_all, fields(state = state.name(), turns = session.history().turns().len()))]
pub fn advance<C: CompletionClient, S: Shell, O: Operator>(
    session: &mut Session,
    state: LoopState,
    client: &C,
    shell: &S,
    operator: &mut O,
) -> Result<LoopState> {
    let next = match state {
        LoopState::AwaitingInput => await_input(session, operator)?,
        LoopState::Dispatching => dispatch(session, client, operator)?,
        LoopState::AwaitingConfirmation { command } => {
            await_confirmation(session, command, operator)?
        }
        LoopState::Executing { command } => execute(session, command, shell, operator)?,
        terminated @ LoopState::Terminated(_) => terminated,
    };
    debug!(next = next.name(), "transition");
    Ok(next)
}

fn await_input<O: Operator>(session: &mut Session, operator: &mut O) -> Result<LoopState> {
    let input = match session.take_carry_over() {
        Some(text) => {
            debug!(bytes = text.len(), "using carry-over as input");
            text
        }
        None => match operator.read_input()? {
            Some(line) => line,
            None => return Ok(LoopState::Terminated(StopReason::OperatorClosed)),
        },
    };
    session.push_user_input(input);
    Ok(LoopState::Dispatching)
}

fn dispatch<C: CompletionClient, O: Operator>(
    session: &mut Session,
    client: &C,
    operator: &mut O,
) -> Result<LoopState> {
    let completion = client.complete(session.history())?;
    session.record_model_reply(completion.raw);
    operator.show_content(completion.response.content())?;

    let next = match completion.response {
        StructuredResponse::Plain { .. } => LoopState::AwaitingInput,
        StructuredResponse::Terminate { .. } => {
            operator.show_terminated()?;
            LoopState::Terminated(StopReason::ModelTerminated)
        }
        StructuredResponse::Command {
            command, confirm, ..
        } => {
            if confirm {
                LoopState::AwaitingConfirmation { command }
            } else {
                LoopState::Executing { command }
            }
        }
    };
    Ok(next)
}

fn await_confirmation<O: Operator>(
    session: &mut Session,
    command: String,
    operator: &mut O,
) -> Result<LoopState> {
    let Some(answer) = operator.confirm(&command)? else {
        debug!(command = %command, "input closed at confirmation");
        return Ok(LoopState::Terminated(StopReason::OperatorClosed));
    };
    match ConfirmDecision::from_answer(&answer) {
        ConfirmDecision::Approved => Ok(LoopState::Executing { command }),
        ConfirmDecision::Declined => {
            warn!(command = %command, "operator declined command");
            session.carry(&Feedback::Declined { command });
            Ok(LoopState::AwaitingInput)
        }
    }
}

fn execute<S: Shell, O: Operator>(
    session: &mut Session,
    command: String,
    shell: &S,
    operator: &mut O,
) -> Result<LoopState> {
    operator.show_command(&command)?;
    let result = shell.execute(&command)?;
    operator.show_output(&result)?;
    session.carry(&Feedback::Executed { command, result });
    Ok(LoopState::AwaitingInput)
}
