//! Remote inference abstractions for bedchat.
//!
//! - `InferenceClient`: RPITIT trait for concrete backends
//! - `BoxInferenceClient`: object-safe wrapper for dynamic dispatch

pub mod box_client;
pub mod client;
