//! Interactive middleman between an operator and a command shell.
//!
//! A remote language model reads the conversation and decides, turn by turn, whether
//! to answer in plain text, run a shell command (optionally after the operator
//! confirms), or end the session. The crate is split the same way as the loop:
//!
//! - **[`core`]**: Pure, deterministic logic (history, message formatting, response
//!   validation, loop states). No I/O.
//! - **[`io`]**: Collaborators with side effects (completion service, shell, terminal,
//!   configuration), each behind a trait so tests can script it.
//!
//! [`session`], [`step`] and [`looping`] own the history and drive the state machine.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod session;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
