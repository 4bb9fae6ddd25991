//! Inference client implementations.
//!
//! Contains the Bedrock implementation of the [`InferenceClient`] trait
//! defined in `bedchat-core`, a factory ([`create_client`]) that builds it
//! from [`AppConfig`], and a connection check ([`test_connection`]).

pub mod bedrock;

use std::time::Duration;

use bedchat_core::llm::box_client::BoxInferenceClient;
use bedchat_core::llm::client::InferenceClient;
use bedchat_types::chat::Turn;
use bedchat_types::config::AppConfig;
use bedchat_types::error::ConfigError;
use bedchat_types::llm::{GenerationConfig, InferenceRequest, LlmError};

use crate::secret::api_key_from_env;

use self::bedrock::BedrockClient;

/// Create the shared [`BoxInferenceClient`] from configuration.
///
/// The API key is read from the environment variable named by
/// `config.bedrock.api_key_env`.
///
/// # Errors
///
/// Returns an error if the API key is missing or the HTTP client cannot be built.
pub fn create_client(config: &AppConfig) -> Result<BoxInferenceClient, ConfigError> {
    let api_key = api_key_from_env(&config.bedrock.api_key_env)?;
    let client = BedrockClient::new(
        api_key,
        config.bedrock.region.clone(),
        Duration::from_secs(config.bedrock.request_timeout_secs),
    )?;
    tracing::info!(region = %client.region(), model = %config.generation.model_id, "Bedrock client ready");
    Ok(BoxInferenceClient::new(client))
}

/// Test connectivity by sending a minimal one-turn request.
///
/// Uses the configured model with a tiny token limit.
pub async fn test_connection<C: InferenceClient>(
    client: &C,
    generation: &GenerationConfig,
) -> Result<(), LlmError> {
    let config = GenerationConfig {
        max_tokens: 10,
        ..generation.clone()
    };
    let request = InferenceRequest::new(&config, vec![Turn::user("Hello")]);
    client.converse(&request).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bedchat_types::llm::InferenceResponse;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        max_tokens: Mutex<Option<u32>>,
    }

    impl InferenceClient for RecordingClient {
        fn name(&self) -> &str {
            "recording"
        }

        async fn converse(
            &self,
            request: &InferenceRequest,
        ) -> Result<InferenceResponse, LlmError> {
            *self.max_tokens.lock().unwrap() = Some(request.max_tokens);
            Ok(InferenceResponse::from_text("Hi"))
        }
    }

    #[tokio::test]
    async fn test_connection_uses_small_token_limit() {
        let client = RecordingClient::default();
        test_connection(&client, &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(*client.max_tokens.lock().unwrap(), Some(10));
    }

    #[test]
    fn test_create_client_missing_key() {
        let mut config = AppConfig::default();
        config.bedrock.api_key_env = "BEDCHAT_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        match create_client(&config) {
            Err(ConfigError::MissingApiKey { env_var }) => {
                assert_eq!(env_var, "BEDCHAT_TEST_KEY_THAT_IS_NEVER_SET");
            }
            Err(other) => panic!("Expected MissingApiKey, got: {other}"),
            Ok(_) => panic!("Expected error but got Ok"),
        }
    }
}
