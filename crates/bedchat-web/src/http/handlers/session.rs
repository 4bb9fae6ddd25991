//! Session lifecycle endpoints.
//!
//! - POST   /api/v1/sessions       open a session
//! - GET    /api/v1/sessions/{id}  current turns
//! - DELETE /api/v1/sessions/{id}  end a session

use std::time::Instant;

use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use bedchat_types::chat::Turn;

use super::parse_session_id;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct SessionClosed {
    pub session_id: Uuid,
    pub closed: bool,
}

/// POST /api/v1/sessions
pub async fn create_session(State(state): State<AppState>) -> ApiResponse<SessionCreated> {
    let started = Instant::now();
    let session_id = state.open_session();
    ApiResponse::success(SessionCreated { session_id }, started)
}

/// GET /api/v1/sessions/{id}
///
/// Returns the last published turns; does not wait for a message in flight.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<SessionView>, AppError> {
    let started = Instant::now();
    let session_id = parse_session_id(&id)?;
    let session = state.session(&session_id)?;
    Ok(ApiResponse::success(
        SessionView {
            session_id,
            turns: session.turns(),
        },
        started,
    ))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<SessionClosed>, AppError> {
    let started = Instant::now();
    let session_id = parse_session_id(&id)?;
    state.close_session(&session_id)?;
    Ok(ApiResponse::success(
        SessionClosed {
            session_id,
            closed: true,
        },
        started,
    ))
}
