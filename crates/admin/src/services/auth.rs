//! Staff password verification against Firebase Auth.
//!
//! Staff accounts live in Firebase Auth like customer accounts do; what makes
//! someone staff is a matching, active `staff` document. This client only
//! verifies the password - the staff lookup happens in the login route.

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use fiesta_core::types::Email;

use crate::config::FirebaseConfig;

const BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Errors from staff password verification.
#[derive(Debug, Error)]
pub enum StaffAuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Email/password combination rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An auth account with this email already exists.
    #[error("an auth account with this email already exists")]
    EmailExists,

    /// Any other API error code.
    #[error("auth API error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(rename = "localId")]
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for verifying staff passwords via the Identity Toolkit API.
#[derive(Clone)]
pub struct StaffAuthClient {
    client: reqwest::Client,
    api_key: String,
}

impl StaffAuthClient {
    /// Create a new staff auth client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
        }
    }

    /// Verify an email/password pair, returning the Firebase uid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` on rejection, or an API/HTTP error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn verify_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<String, StaffAuthError> {
        let url = format!(
            "{BASE_URL}/accounts:signInWithPassword?key={}",
            self.api_key
        );
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
            let head = code.split(':').next().unwrap_or_default().trim();
            return Err(match head {
                "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
                | "USER_DISABLED" => StaffAuthError::InvalidCredentials,
                other => StaffAuthError::Api(other.to_string()),
            });
        }

        let signin: SignInResponse = response.json().await?;
        Ok(signin.local_id)
    }

    /// Provision a Firebase Auth account for a new staff member, returning
    /// the uid.
    ///
    /// # Errors
    ///
    /// Returns `EmailExists` if the email already has an account, or an
    /// API/HTTP error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_account(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<String, StaffAuthError> {
        let url = format!("{BASE_URL}/accounts:signUp?key={}", self.api_key);
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
            let head = code.split(':').next().unwrap_or_default().trim();
            return Err(match head {
                "EMAIL_EXISTS" => StaffAuthError::EmailExists,
                other => StaffAuthError::Api(other.to_string()),
            });
        }

        let signup: SignInResponse = response.json().await?;
        Ok(signup.local_id)
    }
}
