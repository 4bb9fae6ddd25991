//! HTTP layer for bedchat.
//!
//! Axum-based JSON API at `/api/v1/` with an envelope response format, an
//! SSE endpoint for chat messages, and the embedded chat page at `/`.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
