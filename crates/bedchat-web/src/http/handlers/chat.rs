//! SSE chat endpoint.
//!
//! POST /api/v1/sessions/{id}/messages
//!
//! Runs one user message through the session's adapter and reports each
//! conversation update as a Server-Sent Event. The submission runs on its
//! own task, so it completes and lands in the session even if the client
//! disconnects mid-stream.
//!
//! SSE event types:
//! - `turns`: full turn list after an update: `{ "turns": [...] }`. Sent
//!   twice per message: once with the user turn, once with the reply.
//! - `done`: submission finished: `{ "outcome": "replied" | "failed" }`

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;

use bedchat_core::chat::adapter::TurnOutcome;

use super::parse_session_id;
use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// The user message to send.
    pub message: String,
}

/// POST /api/v1/sessions/{id}/messages - SSE chat.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let session_id = parse_session_id(&id)?;
    let session = state.session(&session_id)?;

    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_string()));
    }

    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let submission = tokio::spawn(async move {
        session
            .submit(message, move |turns| {
                // Receiver gone means the client hung up; keep going anyway.
                let _ = update_tx.send(turns);
            })
            .await
    });

    let sse_stream = async_stream::stream! {
        while let Some(turns) = update_rx.recv().await {
            let data = serde_json::json!({ "turns": turns });
            yield Ok::<_, Infallible>(Event::default().event("turns").data(data.to_string()));
        }

        let outcome = match submission.await {
            Ok(TurnOutcome::Replied) => "replied",
            Ok(TurnOutcome::Failed) => "failed",
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Chat submission task failed");
                "failed"
            }
        };
        let data = serde_json::json!({ "outcome": outcome });
        yield Ok(Event::default().event("done").data(data.to_string()));
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
