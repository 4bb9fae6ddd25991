//! InferenceClient trait definition.
//!
//! The port through which a conversation reaches a remote model. Uses RPITIT
//! for `converse`; see [`BoxInferenceClient`](super::box_client::BoxInferenceClient)
//! for the object-safe wrapper.

use bedchat_types::llm::{InferenceRequest, InferenceResponse, LlmError};

/// Trait for remote inference backends (Bedrock, test stubs).
///
/// A single client is shared by every session, so implementations must be
/// safe for concurrent use.
///
/// Implementations live in bedchat-infra (e.g., `BedrockClient`).
pub trait InferenceClient: Send + Sync {
    /// Human-readable backend name (e.g., "bedrock").
    fn name(&self) -> &str;

    /// Send the whole conversation and wait for the model's reply.
    fn converse(
        &self,
        request: &InferenceRequest,
    ) -> impl std::future::Future<Output = Result<InferenceResponse, LlmError>> + Send;
}
