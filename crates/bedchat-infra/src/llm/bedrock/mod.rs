//! AWS Bedrock inference client.
//!
//! Implements [`InferenceClient`](bedchat_core::llm::client::InferenceClient)
//! for the Bedrock Runtime Converse API, using Bearer token authentication.

mod client;
pub mod types;

pub use client::BedrockClient;
