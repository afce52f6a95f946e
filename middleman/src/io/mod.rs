//! Side-effecting collaborators of the conversation loop.

pub mod completion;
pub mod config;
pub mod operator;
pub mod process;
pub mod prompt;
pub mod shell;
