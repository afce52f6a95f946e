//! Deterministic, pure logic for the conversation loop.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod format;
pub mod history;
pub mod response;
pub mod state;
pub mod types;
