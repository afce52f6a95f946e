//! Validated model output.
//!
//! The completion service answers with a flat JSON object whose `type` field decides
//! which other fields matter. [`parse_response`] checks that object against
//! `schemas/response.schema.json` and lifts it into [`StructuredResponse`], where
//! illegal combinations (a `command` turn without a command) cannot be represented.

use std::fmt;
use std::sync::LazyLock;

use jsonschema::{Draft, Validator};
use serde::Deserialize;
use serde_json::Value;

pub const RESPONSE_SCHEMA: &str = include_str!("../../schemas/response.schema.json");

static RESPONSE_SCHEMA_JSON: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(RESPONSE_SCHEMA).expect("response schema should be valid json")
});

static RESPONSE_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&RESPONSE_SCHEMA_JSON)
        .expect("response schema should compile")
});

/// The wire schema sent to the completion service as its output format.
pub fn response_schema() -> &'static Value {
    &RESPONSE_SCHEMA_JSON
}

/// Discriminant of a [`StructuredResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Plain,
    Command,
    Terminate,
}

/// One validated model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredResponse {
    /// Text for the operator; wait for their next line.
    Plain { content: String },
    /// Text for the operator plus a shell command line to run.
    Command {
        content: String,
        command: String,
        /// Ask the operator before running.
        confirm: bool,
    },
    /// Text for the operator; then end the session.
    Terminate { content: String },
}

impl StructuredResponse {
    /// Text shown to the operator, whatever the kind.
    pub fn content(&self) -> &str {
        match self {
            StructuredResponse::Plain { content }
            | StructuredResponse::Command { content, .. }
            | StructuredResponse::Terminate { content } => content,
        }
    }

    pub fn kind(&self) -> ResponseKind {
        match self {
            StructuredResponse::Plain { .. } => ResponseKind::Plain,
            StructuredResponse::Command { .. } => ResponseKind::Command,
            StructuredResponse::Terminate { .. } => ResponseKind::Terminate,
        }
    }
}

/// The completion service returned something that is not a valid [`StructuredResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedResponseError {
    pub reason: String,
    /// Payload exactly as received.
    pub raw: String,
}

impl MalformedResponseError {
    pub fn new(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

impl fmt::Display for MalformedResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed response from completion service: {}", self.reason)
    }
}

impl std::error::Error for MalformedResponseError {}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(rename = "type")]
    kind: ResponseKind,
    content: String,
    command: Option<String>,
    confirm: bool,
}

/// Parse and validate a raw payload: JSON syntax, then schema, then variant rules.
pub fn parse_response(raw: &str) -> Result<StructuredResponse, MalformedResponseError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| MalformedResponseError::new(format!("payload is not json: {err}"), raw))?;

    let messages: Vec<String> = RESPONSE_VALIDATOR
        .iter_errors(&value)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(MalformedResponseError::new(
            format!("schema validation failed:\n- {}", messages.join("\n- ")),
            raw,
        ));
    }

    let wire: WireResponse = serde_json::from_value(value)
        .map_err(|err| MalformedResponseError::new(format!("decode response: {err}"), raw))?;

    match wire.kind {
        ResponseKind::Plain => Ok(StructuredResponse::Plain {
            content: wire.content,
        }),
        ResponseKind::Terminate => Ok(StructuredResponse::Terminate {
            content: wire.content,
        }),
        ResponseKind::Command => match wire.command {
            Some(command) if !command.trim().is_empty() => Ok(StructuredResponse::Command {
                content: wire.content,
                command,
                confirm: wire.confirm,
            }),
            _ => Err(MalformedResponseError::new(
                "type \"command\" requires a non-empty \"command\"",
                raw,
            )),
        },
    }
}
