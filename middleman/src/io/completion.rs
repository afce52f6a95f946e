//! Completion client adapter for OpenAI-compatible chat APIs.
//!
//! The [`CompletionClient`] trait decouples the loop from the remote service.
//! Tests use scripted clients that replay predetermined payloads without network access.

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::core::history::ConversationHistory;
use crate::core::response::{
    MalformedResponseError, StructuredResponse, parse_response, response_schema,
};
use crate::core::types::Turn;

/// Name under which the response schema is registered with the service.
const SCHEMA_NAME: &str = "middleman_response";

/// One validated model turn plus the exact text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub response: StructuredResponse,
    /// Payload as produced by the model; stored verbatim as the assistant turn.
    pub raw: String,
}

/// Abstraction over completion backends.
pub trait CompletionClient {
    /// Send the whole history and return one validated response.
    ///
    /// Payloads that fail validation surface as [`MalformedResponseError`] inside
    /// the returned `anyhow::Error`.
    fn complete(&self, history: &ConversationHistory) -> Result<Completion>;
}

/// Validate a raw payload into a [`Completion`].
pub fn completion_from_raw(raw: String) -> Result<Completion> {
    let response = parse_response(&raw)?;
    Ok(Completion { response, raw })
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'static str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Build the JSON request body for `POST /chat/completions`.
pub fn build_request_body(model: &str, history: &ConversationHistory) -> Result<Value> {
    let request = ChatRequest {
        model,
        messages: history.turns(),
        response_format: ResponseFormat {
            kind: "json_schema",
            json_schema: JsonSchemaFormat {
                name: SCHEMA_NAME,
                strict: true,
                schema: response_schema(),
            },
        },
    };
    serde_json::to_value(&request).context("serialize chat request")
}

/// Pull the assistant payload out of a chat completion envelope.
pub fn extract_payload(body: &str) -> Result<String> {
    let envelope: ChatResponse =
        serde_json::from_str(body).context("parse chat completion envelope")?;
    let choice = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("chat completion has no choices"))?;

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
        warn!("model refused to answer");
        let reason = format!("model refused: {refusal}");
        return Err(MalformedResponseError::new(reason, refusal).into());
    }
    match choice.message.content {
        Some(content) => Ok(content),
        None => Err(MalformedResponseError::new("message has no content", body).into()),
    }
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        // No request timeout: a completion call blocks until the service answers.
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .context("build http client")?;
        Ok(Self {
            endpoint: format!(
                "{}/chat/completions",
                base_url.as_ref().trim_end_matches('/')
            ),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }
}

impl CompletionClient for ChatCompletionsClient {
    #[instrument(skip_all, fields(model = %self.model, turns = history.turns().len()))]
    fn complete(&self, history: &ConversationHistory) -> Result<Completion> {
        let body = build_request_body(&self.model, history)?;
        debug!(endpoint = %self.endpoint, "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("send completion request")?;

        let status = response.status();
        let text = response.text().context("read completion response")?;
        if !status.is_success() {
            warn!(%status, "completion request failed");
            bail!("completion service error ({status}): {text}");
        }

        let raw = extract_payload(&text)?;
        debug!(bytes = raw.len(), "received completion payload");
        completion_from_raw(raw)
    }
}
