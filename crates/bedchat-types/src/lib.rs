//! Shared domain types for bedchat.
//!
//! Conversation turns, generation parameters, inference request/response
//! shapes, configuration and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
