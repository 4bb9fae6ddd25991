//! AWS Bedrock Converse API request/response types.
//!
//! The Converse API uses camelCase JSON. The model is addressed by the URL
//! path, so it does not appear in the request body. Content blocks are
//! objects keyed by their kind (`{"text": ...}`, `{"image": ...}`); only text
//! blocks are read, any other kind deserializes with `text: None`.

use serde::{Deserialize, Serialize};

/// Request body for `POST /model/{modelId}/converse`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    pub messages: Vec<ConverseMessage>,
    pub inference_config: InferenceConfiguration,
}

/// A single message in a Converse conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// One content block of a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling parameters for a Converse call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfiguration {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Response body of a Converse call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseResponse {
    pub output: Option<ConverseOutput>,
    pub stop_reason: Option<String>,
    pub usage: Option<ConverseUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverseOutput {
    pub message: Option<ConverseMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
