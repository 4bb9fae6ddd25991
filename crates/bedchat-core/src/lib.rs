//! Conversation logic and port traits for bedchat.
//!
//! This crate defines the `InferenceClient` port that the infrastructure
//! layer implements, and the turn-by-turn chat flow built on it. It depends
//! only on `bedchat-types` -- never on `bedchat-infra` or any HTTP crate.

pub mod chat;
pub mod llm;
