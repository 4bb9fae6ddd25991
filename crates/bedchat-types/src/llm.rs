//! LLM request/response types for bedchat.
//!
//! These model the data shapes exchanged with a remote inference service:
//! the fixed generation parameters, the request built from a conversation,
//! the reply, and the error taxonomy for a failed call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::Turn;

/// Sampling parameters sent with every request.
///
/// Set once when a session is opened and never derived from user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_model_id() -> String {
    "anthropic.claude-3-haiku-20240307-v1:0".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.5
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

/// Request to a remote inference service: the whole conversation so far plus
/// the generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub model_id: String,
    pub turns: Vec<Turn>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl InferenceRequest {
    /// Build a request carrying `turns` with the parameters from `config`.
    pub fn new(config: &GenerationConfig, turns: Vec<Turn>) -> Self {
        Self {
            model_id: config.model_id.clone(),
            turns,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// One segment of the model's reply content.
///
/// Non-text segments (images, tool use) carry `text: None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplySegment {
    pub text: Option<String>,
}

impl ReplySegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Response from a remote inference service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub content: Vec<ReplySegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    #[serde(default)]
    pub usage: Usage,
}

impl InferenceResponse {
    /// Response with a single text segment, as most replies are.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ReplySegment::text(text)],
            stop_reason: Some(StopReason::EndTurn),
            usage: Usage::default(),
        }
    }

    /// Text of the first reply segment, if there is one and it carries text.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().and_then(|s| s.text.as_deref())
    }
}

/// Reason why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    GuardrailIntervened,
    ContentFiltered,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EndTurn => write!(f, "end_turn"),
            StopReason::ToolUse => write!(f, "tool_use"),
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::StopSequence => write!(f, "stop_sequence"),
            StopReason::GuardrailIntervened => write!(f, "guardrail_intervened"),
            StopReason::ContentFiltered => write!(f, "content_filtered"),
        }
    }
}

impl FromStr for StopReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "end_turn" => Ok(StopReason::EndTurn),
            "tool_use" => Ok(StopReason::ToolUse),
            "max_tokens" => Ok(StopReason::MaxTokens),
            "stop_sequence" => Ok(StopReason::StopSequence),
            "guardrail_intervened" => Ok(StopReason::GuardrailIntervened),
            "content_filtered" => Ok(StopReason::ContentFiltered),
            other => Err(format!("invalid stop reason: '{other}'")),
        }
    }
}

/// Token usage reported for a call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from a remote inference call.
///
/// Every variant is a remote-call failure as far as the conversation is
/// concerned; the finer split only serves logs and diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
