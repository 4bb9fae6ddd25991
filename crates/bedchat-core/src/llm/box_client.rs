//! BoxInferenceClient -- object-safe dynamic dispatch wrapper for InferenceClient.
//!
//! 1. Define an object-safe `InferenceClientDyn` trait with boxed futures
//! 2. Blanket-impl `InferenceClientDyn` for all `T: InferenceClient`
//! 3. `BoxInferenceClient` wraps `Box<dyn InferenceClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use bedchat_types::llm::{InferenceRequest, InferenceResponse, LlmError};

use super::client::InferenceClient;

/// Object-safe version of [`InferenceClient`] with boxed futures.
pub trait InferenceClientDyn: Send + Sync {
    fn name(&self) -> &str;

    fn converse_boxed<'a>(
        &'a self,
        request: &'a InferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<InferenceResponse, LlmError>> + Send + 'a>>;
}

impl<T: InferenceClient> InferenceClientDyn for T {
    fn name(&self) -> &str {
        InferenceClient::name(self)
    }

    fn converse_boxed<'a>(
        &'a self,
        request: &'a InferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<InferenceResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.converse(request))
    }
}

/// Type-erased inference client.
///
/// Lets the web layer hold the real Bedrock client in production and a stub
/// in tests behind the same concrete type.
pub struct BoxInferenceClient {
    inner: Box<dyn InferenceClientDyn>,
}

impl BoxInferenceClient {
    /// Wrap a concrete `InferenceClient` in a type-erased box.
    pub fn new<T: InferenceClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }
}

impl InferenceClient for BoxInferenceClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn converse(&self, request: &InferenceRequest) -> Result<InferenceResponse, LlmError> {
        self.inner.converse_boxed(request).await
    }
}
