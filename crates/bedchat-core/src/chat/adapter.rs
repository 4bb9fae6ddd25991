//! Turn adapter: one user message in, one assistant turn out.
//!
//! Each call to [`TurnAdapter::submit_user_message`] runs the full cycle
//!
//! ```text
//! Idle -> UserTurnAppended -> AwaitingModel -> AssistantTurnAppended | ErrorTurnAppended -> Idle
//! ```
//!
//! and always runs to completion. Remote failures are recovered here and
//! become error turns; the caller never sees an `Err`.

use std::sync::Arc;

use tracing::Instrument;

use bedchat_types::chat::Turn;
use bedchat_types::llm::{GenerationConfig, InferenceRequest, LlmError};

use super::buffer::ConversationBuffer;
use super::format::{ErrorTurnFormatter, VerbatimErrorFormatter};
use crate::llm::client::InferenceClient;

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model replied and its text was appended.
    Replied,
    /// The remote call failed and an error turn was appended.
    Failed,
}

/// Owns one session's conversation and drives its exchanges with the model.
///
/// `submit_user_message` takes `&mut self`, so a session can only have one
/// submission in flight. Adapters for different sessions share nothing but
/// the client and the generation config.
pub struct TurnAdapter<C: InferenceClient> {
    client: Arc<C>,
    config: Arc<GenerationConfig>,
    formatter: Arc<dyn ErrorTurnFormatter>,
    span: tracing::Span,
    conversation: ConversationBuffer,
}

impl<C: InferenceClient> TurnAdapter<C> {
    /// Create an adapter with an empty conversation.
    ///
    /// `span` is the session's logging context; every log line and the remote
    /// call itself are recorded inside it. Error turns use
    /// [`VerbatimErrorFormatter`] unless replaced with [`Self::with_formatter`].
    pub fn new(client: Arc<C>, config: Arc<GenerationConfig>, span: tracing::Span) -> Self {
        Self {
            client,
            config,
            formatter: Arc::new(VerbatimErrorFormatter),
            span,
            conversation: ConversationBuffer::new(),
        }
    }

    /// Replace the error turn formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn ErrorTurnFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Read-only view of the conversation.
    pub fn conversation(&self) -> &ConversationBuffer {
        &self.conversation
    }

    /// Record `text` as a user turn, ask the model for a reply and record it.
    ///
    /// `on_update` is called twice: once right after the user turn is
    /// appended (before the remote call starts), and once after the assistant
    /// or error turn is appended. Empty text is not rejected here.
    pub async fn submit_user_message<F>(&mut self, text: impl Into<String>, mut on_update: F) -> TurnOutcome
    where
        F: FnMut(&ConversationBuffer),
    {
        let text = text.into();
        tracing::info!(parent: &self.span, chars = text.len(), "Sending message to chat client");
        tracing::debug!(parent: &self.span, user_text = %text, "User text");

        self.conversation.append(Turn::user(text));
        on_update(&self.conversation);

        let request = InferenceRequest::new(&self.config, self.conversation.snapshot());
        let result = self
            .request_reply(&request)
            .instrument(self.span.clone())
            .await;

        let outcome = match result {
            Ok(reply) => {
                tracing::info!(parent: &self.span, chars = reply.len(), "Assistant response received");
                self.conversation.append(Turn::assistant(reply));
                TurnOutcome::Replied
            }
            Err(e) => {
                tracing::error!(parent: &self.span, error = %e, "Error getting chat completion");
                self.conversation
                    .append(Turn::assistant(self.formatter.format(&e)));
                TurnOutcome::Failed
            }
        };

        on_update(&self.conversation);
        outcome
    }

    /// Issue the remote call and pull the text of the first reply segment.
    async fn request_reply(&self, request: &InferenceRequest) -> Result<String, LlmError> {
        let response = self.client.converse(request).await?;

        if let Some(stop_reason) = &response.stop_reason {
            tracing::debug!(
                stop_reason = %stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "Completion finished"
            );
        }

        response
            .first_text()
            .map(str::to_owned)
            .ok_or_else(|| {
                LlmError::MalformedResponse("reply has no text content segment".to_string())
            })
    }
}
