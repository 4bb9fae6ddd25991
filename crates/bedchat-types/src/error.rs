use thiserror::Error;
use uuid::Uuid;

/// Errors raised while assembling the application from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not found: set the {env_var} environment variable")]
    MissingApiKey { env_var: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors related to chat session lookup.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_names_env_var() {
        let err = ConfigError::MissingApiKey {
            env_var: "AWS_BEARER_TOKEN_BEDROCK".to_string(),
        };
        assert!(err.to_string().contains("AWS_BEARER_TOKEN_BEDROCK"));
    }

    #[test]
    fn test_session_not_found_display() {
        let id = Uuid::nil();
        assert_eq!(
            SessionError::NotFound(id).to_string(),
            format!("session {id} not found")
        );
    }
}
