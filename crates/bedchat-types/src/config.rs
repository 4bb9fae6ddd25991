//! Application configuration types for bedchat.
//!
//! `AppConfig` represents `bedchat.toml`. Every section and field has a
//! default, so an empty or missing file yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::llm::GenerationConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sampling parameters applied to every session.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Bedrock Runtime connection settings.
    #[serde(default)]
    pub bedrock: BedrockConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection settings for the Bedrock Runtime endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockConfig {
    /// AWS region hosting the model.
    #[serde(default = "default_region")]
    pub region: String,

    /// Name of the environment variable holding the bearer API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP client timeout for a single call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_api_key_env() -> String {
    "AWS_BEARER_TOKEN_BEDROCK".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Sessions with no activity for this long are closed. `0` keeps them
    /// until they are deleted.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5080
}

fn default_session_idle_timeout_secs() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
        }
    }
}
