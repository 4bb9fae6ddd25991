//! Infrastructure layer for bedchat.
//!
//! Contains the Bedrock implementation of the `InferenceClient` port defined
//! in `bedchat-core`, configuration file loading, and API key resolution.

pub mod config;
pub mod llm;
pub mod secret;
