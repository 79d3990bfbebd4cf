//! Firebase Authentication REST client.
//!
//! The storefront never stores credentials; sign-up and sign-in go straight
//! to the Identity Toolkit API and only the resulting uid/email land in the
//! session.

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use fiesta_core::types::{CustomerId, Email};

use crate::config::FirebaseConfig;

const BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Errors from the Firebase Auth API, mapped from its error codes.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Email/password combination rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailExists,

    /// Password rejected as too weak.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Any other API error code.
    #[error("auth API error: {0}")]
    Api(String),
}

/// A signed-in (or newly created) Firebase user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub uid: CustomerId,
    pub email: Email,
    /// Short-lived ID token; unused today but returned by every auth call.
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
    #[serde(rename = "idToken")]
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Firebase Auth (Identity Toolkit) REST API.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    client: reqwest::Client,
    api_key: String,
}

impl FirebaseAuthClient {
    /// Create a new auth client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
        }
    }

    async fn call(
        &self,
        endpoint: &str,
        email: &Email,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let url = format!("{BASE_URL}/accounts:{endpoint}?key={}", self.api_key);
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
            "returnSecureToken": true,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let code = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_default();
            return Err(map_error_code(&code));
        }

        let auth: AuthResponse = response.json().await?;
        let email = Email::parse(&auth.email)
            .map_err(|e| AuthError::Api(format!("API returned invalid email: {e}")))?;
        Ok(AuthenticatedUser {
            uid: CustomerId::new(auth.local_id),
            email,
            id_token: auth.id_token,
        })
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `EmailExists` or `WeakPassword` on rejection, or an API/HTTP
    /// error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.call("signUp", email, password).await
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` on rejection, or an API/HTTP error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.call("signInWithPassword", email, password).await
    }
}

/// Map Identity Toolkit error codes onto [`AuthError`].
fn map_error_code(code: &str) -> AuthError {
    // Codes sometimes carry a suffix, e.g. "WEAK_PASSWORD : Password should
    // be at least 6 characters".
    let (head, detail) = code.split_once(':').map_or((code, ""), |(h, d)| (h, d));
    match head.trim() {
        "EMAIL_EXISTS" => AuthError::EmailExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthError::WeakPassword(detail.trim().to_string()),
        other => AuthError::Api(other.to_string()),
    }
}
