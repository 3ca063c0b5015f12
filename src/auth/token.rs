//! Authentication tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An authentication token issued by the credential issuer.
///
/// The `Debug` implementation masks the token id so that tokens never end
/// up in logs.
///
/// # Example
///
/// ```rust
/// use cloudplane::Token;
/// use chrono::{Duration, Utc};
///
/// let token = Token::new("gAAAAABk")
///     .with_expiry(Utc::now() + Duration::hours(1))
///     .with_scope("demo-project");
///
/// assert!(!token.expired());
/// assert_eq!(token.scope.as_deref(), Some("demo-project"));
/// assert!(!format!("{token:?}").contains("gAAAAABk"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The opaque token value sent in the authentication header.
    pub id: String,

    /// When the issuer said this token stops being valid, if known.
    pub expires_at: Option<DateTime<Utc>>,

    /// The scope (project, domain or system) the token is bound to, if known.
    pub scope: Option<String>,
}

impl Token {
    /// Creates a token with no expiry and no scope.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expires_at: None,
            scope: None,
        }
    }

    /// Creates an empty placeholder token for sessions that authenticate lazily.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            id: String::new(),
            expires_at: None,
            scope: None,
        }
    }

    /// Sets the expiry time.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Returns `true` if the token carries no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Returns `true` if the token has a known expiry that is in the past.
    ///
    /// Tokens without an expiry are considered never expired; the server
    /// remains the authority and signals rejection with a 401.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires_at.is_some_and(|expires| Utc::now() >= expires)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &"*****")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_expired() {
        let expired = Token::new("t").with_expiry(Utc::now() - Duration::minutes(1));
        assert!(expired.expired());

        let valid = Token::new("t").with_expiry(Utc::now() + Duration::minutes(1));
        assert!(!valid.expired());

        assert!(!Token::new("t").expired());
    }

    #[test]
    fn test_empty_token() {
        assert!(Token::empty().is_empty());
        assert!(!Token::new("abc").is_empty());
    }

    #[test]
    fn test_debug_masks_token_id() {
        let token = Token::new("super-secret-token");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("*****"));
    }
}
