//! HTTP request handlers for the API.

pub mod chat;
pub mod session;

use uuid::Uuid;

use crate::http::error::AppError;

/// Parse a session id path segment.
pub(crate) fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid session id format".to_string()))
}
