//! Authentication error types for the cloudplane SDK.
//!
//! # Error Types
//!
//! - [`AuthError::NoReauthenticator`]: The session cannot refresh its token
//! - [`AuthError::IssuerRejected`]: The credential issuer refused to issue a token
//! - [`AuthError::IssuerUnreachable`]: The credential issuer could not be reached
//! - [`AuthError::InvalidIssuerResponse`]: The issuer answered without a usable token
//! - [`AuthError::StillUnauthorized`]: The retry after reauthentication was rejected again
//! - [`AuthError::ReauthAborted`]: The reauthentication task did not run to completion
//!
//! # Example
//!
//! ```rust
//! use cloudplane::auth::AuthError;
//!
//! let error = AuthError::IssuerRejected {
//!     status: 401,
//!     message: "The request you have made requires authentication.".to_string(),
//! };
//! assert!(error.to_string().contains("401"));
//! ```

use thiserror::Error;

/// Errors raised by the reauthentication protocol.
///
/// Every variant is terminal for the call that produced it: the engine
/// reauthenticates at most once per call and never retries after one of
/// these errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token was rejected and the session has no way to obtain a new one.
    #[error("The authentication token was rejected and the session has no reauthentication function configured.")]
    NoReauthenticator,

    /// The credential issuer answered with an error status.
    #[error("Credential issuer rejected the reauthentication request (status {status}): {message}")]
    IssuerRejected {
        /// HTTP status code returned by the issuer.
        status: u16,
        /// Response body or error description.
        message: String,
    },

    /// The credential issuer could not be reached.
    #[error("Credential issuer could not be reached: {message}")]
    IssuerUnreachable {
        /// Description of the transport failure.
        message: String,
    },

    /// The credential issuer answered successfully but without a usable token.
    #[error("Credential issuer returned an unusable response: {reason}")]
    InvalidIssuerResponse {
        /// Why the response could not be used.
        reason: String,
    },

    /// The request was rejected again after a successful reauthentication.
    #[error("Request to {url} was still unauthorized after reauthentication.")]
    StillUnauthorized {
        /// The URL that rejected the refreshed token.
        url: String,
    },

    /// The reauthentication task was cancelled or panicked.
    #[error("Reauthentication did not complete: {reason}")]
    ReauthAborted {
        /// Description of why the task ended early.
        reason: String,
    },
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_unauthorized_includes_url() {
        let error = AuthError::StillUnauthorized {
            url: "https://compute.example.com/v2.1/servers".to_string(),
        };
        assert!(error.to_string().contains("/v2.1/servers"));
        assert!(error.to_string().contains("after reauthentication"));
    }

    #[test]
    fn test_issuer_unreachable_message() {
        let error = AuthError::IssuerUnreachable {
            message: "connection refused".to_string(),
        };
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_auth_error_is_clone_and_eq() {
        let error = AuthError::NoReauthenticator;
        assert_eq!(error.clone(), error);
    }
}
