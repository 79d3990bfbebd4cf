//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (checkout redirects back here)
//! - `FIREBASE_PROJECT_ID` - Firebase project id
//! - `FIREBASE_API_KEY` - Firebase web API key (safe to expose to the browser)
//! - `STRIPE_SECRET_KEY` - Stripe secret API key (server-side only)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Firebase project configuration
    pub firebase: FirebaseConfig,
    /// Stripe configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Firebase project configuration.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Firebase project id (e.g., fiesta-rentals)
    pub project_id: String,
    /// Web API key; scoped by Firebase security rules, safe in the browser
    pub api_key: String,
}

/// Stripe configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... / sk_test_...)
    pub secret_key: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
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

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        let firebase = FirebaseConfig {
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            api_key: get_required_env("FIREBASE_API_KEY")?,
        };
        let stripe = StripeConfig {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            base_url,
            firebase,
            stripe,
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

    // Real API keys have high entropy
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
pub(crate) fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
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
        let result = validate_secret_strength("your-stripe-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_real_looking_key() {
        let result = validate_secret_strength("sk_test_4eC39HqLyjWDarjtT1zdp7dc", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            firebase: FirebaseConfig {
                project_id: "fiesta-test".to_string(),
                api_key: "AIzaSyTest".to_string(),
            },
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
            },
            sentry_dsn: None,
        };
        let addr = config.socket_addr();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_stripe_config_debug_redacts_secret() {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_live_very_secret_value_1234"),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk_live_very_secret_value_1234"));
    }
}
