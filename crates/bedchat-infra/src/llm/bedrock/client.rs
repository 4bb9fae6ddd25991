//! BedrockClient -- concrete [`InferenceClient`] implementation for AWS Bedrock.
//!
//! Sends the whole conversation to the Bedrock Runtime Converse API using
//! Bearer token authentication and returns the model's reply.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use bedchat_core::llm::client::InferenceClient;
use bedchat_types::error::ConfigError;
use bedchat_types::llm::{InferenceRequest, InferenceResponse, LlmError, ReplySegment, Usage};

use super::types::{ContentBlock, ConverseMessage, ConverseRequest, ConverseResponse, InferenceConfiguration};

/// AWS Bedrock Converse client.
///
/// One instance is shared by every chat session; `reqwest::Client` pools
/// connections internally and is safe to use concurrently.
pub struct BedrockClient {
    client: reqwest::Client,
    api_key: SecretString,
    region: String,
}

impl BedrockClient {
    /// Prefix used to identify Bedrock API keys.
    const KEY_PREFIX: &'static str = "bedrock-api-key-";

    /// Create a new Bedrock client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bedrock bearer token. If it starts with `bedrock-api-key-`,
    ///   the prefix is stripped and the remainder is used as the Bearer token.
    /// * `region` - AWS region (e.g., "us-east-1"). If the token's embedded
    ///   credential scope names a region, that region is used instead.
    /// * `timeout` - Upper bound for a single HTTP call.
    pub fn new(api_key: SecretString, region: String, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let raw_key = api_key.expose_secret();
        let token_part = raw_key.strip_prefix(Self::KEY_PREFIX).unwrap_or(raw_key);
        let effective_region = Self::detect_region_from_token(token_part).unwrap_or(region);

        Ok(Self {
            client,
            api_key: SecretString::from(token_part.to_string()),
            region: effective_region,
        })
    }

    /// Region requests are sent to.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Try to extract the AWS region from a base64-encoded presigned URL token.
    ///
    /// The token decodes to a URL like:
    /// `bedrock.amazonaws.com/?...&X-Amz-Credential=AKIA...%2F20260212%2Fus-east-1%2Fbedrock%2Faws4_request&...`
    fn detect_region_from_token(token: &str) -> Option<String> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token)
            .ok()?;
        let text = String::from_utf8(decoded).ok()?;

        let cred_start = text.find("X-Amz-Credential=")?;
        let cred_value = text[cred_start + "X-Amz-Credential=".len()..]
            .split('&')
            .next()?
            .replace("%2F", "/")
            .replace("%2f", "/");

        // Format: <access-key>/<date>/<region>/<service>/aws4_request
        let region = cred_value.split('/').nth(2)?;
        if region.is_empty() {
            return None;
        }
        tracing::info!(region = %region, "Detected region from Bedrock bearer token");
        Some(region.to_string())
    }

    /// Build the Converse URL for a model. The model id is used as configured.
    fn url(&self, model: &str) -> String {
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{model}/converse",
            self.region
        )
    }

    /// Convert an [`InferenceRequest`] into a Converse request body.
    fn to_converse_request(request: &InferenceRequest) -> ConverseRequest {
        let messages = request
            .turns
            .iter()
            .map(|turn| ConverseMessage {
                role: turn.role().to_string(),
                content: vec![ContentBlock {
                    text: Some(turn.text().to_string()),
                }],
            })
            .collect();

        ConverseRequest {
            messages,
            inference_config: InferenceConfiguration {
                max_tokens: request.max_tokens,
                temperature: request.temperature,
                top_p: request.top_p,
            },
        }
    }

    /// Convert a Converse response body into an [`InferenceResponse`].
    ///
    /// A response without an output message yields no segments; deciding
    /// what that means is left to the caller.
    fn from_converse_response(response: ConverseResponse) -> InferenceResponse {
        let content = response
            .output
            .and_then(|output| output.message)
            .map(|message| {
                message
                    .content
                    .into_iter()
                    .map(|block| ReplySegment { text: block.text })
                    .collect()
            })
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            })
            .unwrap_or_default();

        InferenceResponse {
            content,
            stop_reason: response.stop_reason.and_then(|s| s.parse().ok()),
            usage,
        }
    }

    /// Map a non-success HTTP status to an [`LlmError`].
    fn status_error(status: reqwest::StatusCode, body: String) -> LlmError {
        match status.as_u16() {
            401 | 403 => LlmError::Authentication(format!("Bedrock HTTP {status}: {body}")),
            429 => LlmError::RateLimited,
            s if s >= 500 => LlmError::Provider {
                message: format!("Bedrock server error HTTP {status}: {body}"),
            },
            _ => LlmError::Provider {
                message: format!("HTTP {status}: {body}"),
            },
        }
    }
}

// BedrockClient intentionally does NOT derive Debug so the bearer token can
// never end up in a log line.

impl InferenceClient for BedrockClient {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn converse(&self, request: &InferenceRequest) -> Result<InferenceResponse, LlmError> {
        let body = Self::to_converse_request(request);
        let url = self.url(&request.model_id);

        tracing::debug!(url = %url, region = %self.region, turns = body.messages.len(), "Bedrock converse request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, url = %url, "Bedrock API error response");
            return Err(Self::status_error(status, error_body));
        }

        let converse: ConverseResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        Ok(Self::from_converse_response(converse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use bedchat_types::chat::Turn;
    use bedchat_types::llm::{GenerationConfig, StopReason};

    fn make_client() -> BedrockClient {
        BedrockClient::new(
            SecretString::from("bedrock-api-key-test-not-real"),
            "us-east-1".to_string(),
            Duration::from_secs(30),
        )
        .unwrap()
    }

    fn token_for_region(region: &str) -> String {
        let url = format!(
            "bedrock.amazonaws.com/?Action=CallWithBearerToken&X-Amz-Algorithm=AWS4-HMAC-SHA256\
             &X-Amz-Credential=AKIAEXAMPLE%2F20260212%2F{region}%2Fbedrock%2Faws4_request&X-Amz-Expires=43200"
        );
        base64::engine::general_purpose::STANDARD.encode(url)
    }

    #[test]
    fn test_client_name() {
        assert_eq!(make_client().name(), "bedrock");
    }

    #[test]
    fn test_region_from_config_when_token_opaque() {
        assert_eq!(make_client().region(), "us-east-1");
    }

    #[test]
    fn test_region_detected_from_token() {
        let key = format!("bedrock-api-key-{}", token_for_region("eu-west-1"));
        let client = BedrockClient::new(
            SecretString::from(key),
            "us-east-1".to_string(),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(client.region(), "eu-west-1");
    }

    #[test]
    fn test_region_detected_with_unencoded_slashes() {
        let url = "bedrock.amazonaws.com/?X-Amz-Credential=AKIA/20260212/ap-south-1/bedrock/aws4_request";
        let token = base64::engine::general_purpose::STANDARD.encode(url);
        assert_eq!(
            BedrockClient::detect_region_from_token(&token).as_deref(),
            Some("ap-south-1")
        );
    }

    #[test]
    fn test_url_keeps_model_id_unchanged() {
        let client = make_client();
        assert_eq!(
            client.url("eu.anthropic.claude-3-haiku-20240307-v1:0"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/eu.anthropic.claude-3-haiku-20240307-v1:0/converse"
        );
        assert_eq!(
            client.url("claude-3-haiku-20240307"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/claude-3-haiku-20240307/converse"
        );
    }

    #[test]
    fn test_url_construction() {
        let client = make_client();
        assert_eq!(
            client.url("anthropic.claude-3-haiku-20240307-v1:0"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/anthropic.claude-3-haiku-20240307-v1:0/converse"
        );
    }

    #[test]
    fn test_to_converse_request() {
        let request = InferenceRequest::new(
            &GenerationConfig::default(),
            vec![Turn::user("Hi"), Turn::assistant("Hello!"), Turn::user("How are you?")],
        );

        let body = BedrockClient::to_converse_request(&request);
        assert_eq!(body.messages.len(), 3);
        assert_eq!(body.messages[1].role, "assistant");
        assert_eq!(body.messages[2].content[0].text.as_deref(), Some("How are you?"));
        assert_eq!(body.inference_config.max_tokens, 512);
        assert!((body.inference_config.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_converse_response() {
        let json = r#"{
            "output": {"message": {"role": "assistant", "content": [{"text": "Hello!"}]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 10, "outputTokens": 2, "totalTokens": 12}
        }"#;
        let converse: ConverseResponse = serde_json::from_str(json).unwrap();

        let response = BedrockClient::from_converse_response(converse);
        assert_eq!(response.first_text(), Some("Hello!"));
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(response.usage.input_tokens, 10);
    }

    #[test]
    fn test_from_converse_response_without_output() {
        let converse: ConverseResponse = serde_json::from_str(r#"{"stopReason":"end_turn"}"#).unwrap();
        let response = BedrockClient::from_converse_response(converse);
        assert!(response.content.is_empty());
        assert_eq!(response.first_text(), None);
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            BedrockClient::status_error(reqwest::StatusCode::FORBIDDEN, "denied".into()),
            LlmError::Authentication(_)
        ));
        assert!(matches!(
            BedrockClient::status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new()),
            LlmError::RateLimited
        ));
        let err = BedrockClient::status_error(reqwest::StatusCode::BAD_REQUEST, "bad model".into());
        assert!(err.to_string().contains("bad model"));
    }
}
