//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GIFTY_API_BASE_URL` - Base URL of the Gifty backend (e.g., <http://localhost:7066>)
//! - `GIFTY_IDENTITY_ISSUER` - Base URL of the identity provider
//! - `GIFTY_IDENTITY_CLIENT_ID` - OAuth client ID registered with the provider
//! - `GIFTY_IDENTITY_CLIENT_SECRET` - OAuth client secret
//!
//! ## Optional
//! - `GIFTY_REDIRECT_URI` - OAuth callback (default: out-of-band for CLI use)
//! - `GIFTY_REFRESH_TOKEN` - Stored refresh token from a previous `gifty login`
//! - `GIFTY_APP_BASE_URL` - Public web app base, used to print full share URLs

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Gifty client configuration.
#[derive(Debug, Clone)]
pub struct GiftyConfig {
    /// Base URL of the Gifty backend REST API.
    pub api_base_url: Url,
    /// Identity provider configuration.
    pub identity: IdentityConfig,
    /// Refresh token from a previous sign-in, if any.
    pub refresh_token: Option<SecretString>,
    /// Public web app base URL, for building shareable links.
    pub app_base_url: Option<Url>,
}

/// Identity provider configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL of the identity provider (the OAuth issuer).
    pub issuer: Url,
    /// OAuth client ID (safe to expose).
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
    /// Redirect URI used in the authorization-code flow.
    pub redirect_uri: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("issuer", &self.issuer.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl GiftyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, URLs fail to
    /// parse, or the client secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_url("GIFTY_API_BASE_URL")?;
        let identity = IdentityConfig::from_env()?;
        let refresh_token = get_optional_env("GIFTY_REFRESH_TOKEN").map(SecretString::from);
        let app_base_url = get_optional_url("GIFTY_APP_BASE_URL")?;

        Ok(Self {
            api_base_url,
            identity,
            refresh_token,
            app_base_url,
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            issuer: get_url("GIFTY_IDENTITY_ISSUER")?,
            client_id: get_required_env("GIFTY_IDENTITY_CLIENT_ID")?,
            client_secret: get_validated_secret("GIFTY_IDENTITY_CLIENT_SECRET")?,
            redirect_uri: get_env_or_default("GIFTY_REDIRECT_URI", "urn:ietf:wg:oauth:2.0:oob"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required environment variable parsed as a URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an optional environment variable parsed as a URL.
fn get_optional_url(key: &str) -> Result<Option<Url>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            Url::parse(&value)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Validate that a secret is not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-client-secret-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_identity_config_debug_redacts_secret() {
        let config = IdentityConfig {
            issuer: Url::parse("https://id.example.com").unwrap(),
            client_id: "client_id_value".to_string(),
            client_secret: SecretString::from("super_secret_value"),
            redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));
    }
}
