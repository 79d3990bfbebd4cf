//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin dashboard (CORS origin)
//! - `FIREBASE_PROJECT_ID` - Firebase project id
//! - `FIREBASE_API_KEY` - Firebase web API key (staff sign-in)
//! - `FIREBASE_SERVICE_TOKEN` - OAuth bearer token with Firestore and Storage scope
//! - `FIREBASE_STORAGE_BUCKET` - Cloud Storage bucket for product images
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin dashboard
    pub base_url: String,
    /// Firebase project configuration (privileged scope)
    pub firebase: FirebaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Firebase configuration for the admin's privileged clients.
///
/// Implements `Debug` manually to redact the service token.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Firebase project id (e.g., fiesta-rentals)
    pub project_id: String,
    /// Web API key, used only for staff password sign-in
    pub api_key: String,
    /// OAuth bearer token with Firestore and Storage scope
    pub service_token: SecretString,
    /// Cloud Storage bucket for product images
    pub storage_bucket: String,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key)
            .field("service_token", &"[REDACTED]")
            .field("storage_bucket", &self.storage_bucket)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;

        let firebase = FirebaseConfig {
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            api_key: get_required_env("FIREBASE_API_KEY")?,
            service_token: get_validated_secret("FIREBASE_SERVICE_TOKEN")?,
            storage_bucket: get_required_env("FIREBASE_STORAGE_BUCKET")?,
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            base_url,
            firebase,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
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

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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

    // Real tokens have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
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
        let result = validate_secret_strength("your-service-token-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("bbbbbbbbbbbbbbbbbbbbbbbbbb", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_real_looking_token() {
        let result = validate_secret_strength("ya29.c.b0Aaekm1KpTbV8xq3rGf2LwZ", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_firebase_config_debug_redacts_token() {
        let config = FirebaseConfig {
            project_id: "fiesta-test".to_string(),
            api_key: "AIzaSyTest".to_string(),
            service_token: SecretString::from("ya29.c.b0Aaekm1KpTbV8xq3rGf2LwZ"),
            storage_bucket: "fiesta-test.appspot.com".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("ya29"));
    }
}
