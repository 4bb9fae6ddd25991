//! API key resolution from environment variables.
//!
//! The key is wrapped in [`SecretString`] as soon as it is read so it never
//! shows up in `Debug` output or logs.

use secrecy::SecretString;

use bedchat_types::error::ConfigError;

/// Read the API key from the environment variable `env_var`.
///
/// Unset, empty and non-Unicode values are all treated as missing.
pub fn api_key_from_env(env_var: &str) -> Result<SecretString, ConfigError> {
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => Ok(SecretString::from(val.trim().to_string())),
        _ => Err(ConfigError::MissingApiKey {
            env_var: env_var.to_string(),
        }),
    }
}
