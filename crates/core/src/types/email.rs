//! Email address type.
//!
//! Checkout and auth forms validate emails structurally before any hosted
//! call; Firebase Auth performs its own validation on top of this.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty or has no dot.
    #[error("email domain is not valid")]
    InvalidDomain,
}

/// An email address.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Must contain an @ symbol with a non-empty local part
/// - Domain part must be non-empty and contain a dot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first structural problem found.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;
        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        let domain = s.get(at_pos + 1..).unwrap_or("");
        if domain.is_empty() || !domain.contains('.') || domain.starts_with('.') {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_missing_at() {
        assert_eq!(
            Email::parse("no-at-symbol"),
            Err(EmailError::MissingAtSymbol)
        );
    }

    #[test]
    fn test_parse_empty_local_part() {
        assert_eq!(Email::parse("@domain.com"), Err(EmailError::EmptyLocalPart));
    }

    #[test]
    fn test_parse_bad_domain() {
        assert_eq!(Email::parse("user@"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("user@nodot"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("user@.com"), Err(EmailError::InvalidDomain));
    }

    #[test]
    fn test_serde_roundtrip() {
        let email = Email::parse("user@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"user@example.com\"");
        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }
}
