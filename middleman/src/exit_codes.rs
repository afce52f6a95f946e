//! Stable exit codes for the middleman CLI.

use crate::core::response::MalformedResponseError;
use crate::io::shell::LaunchFailure;

/// Session ended normally (model terminated or operator input closed).
pub const OK: i32 = 0;
/// Invalid configuration or usage, or any other unrecoverable error.
pub const INVALID: i32 = 1;
/// The completion service returned a payload that failed validation.
pub const MALFORMED_RESPONSE: i32 = 3;
/// The shell interpreter could not be launched.
pub const LAUNCH_FAILURE: i32 = 4;

/// Exit code for an error that ended the session.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<MalformedResponseError>().is_some() {
        MALFORMED_RESPONSE
    } else if err.downcast_ref::<LaunchFailure>().is_some() {
        LAUNCH_FAILURE
    } else {
        INVALID
    }
}
