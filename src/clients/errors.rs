//! Error types for requests made through [`HttpClient`](crate::clients::HttpClient).
//!
//! This module contains error types for HTTP operations, including status
//! errors, retry exhaustion, request validation failures and body decoding.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: A status outside the request's acceptable set
//! - [`MaxHttpRetriesExceededError`]: Rate-limit retries were exhausted
//! - [`InvalidHttpRequestError`]: A request or patch document failed validation before sending
//! - [`DecodeError`]: A body was absent or did not match the requested shape
//! - [`HttpError`]: Unified error type encompassing all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudplane::clients::{HttpError, StatusErrorKind};
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Success: {}", response.code),
//!     Err(HttpError::Response(e)) if e.kind == StatusErrorKind::NotFound => {
//!         println!("Gone: {}", e.message);
//!     }
//!     Err(HttpError::Authentication(e)) => println!("Credentials: {e}"),
//!     Err(e) => println!("Failed: {e}"),
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::AuthError;

/// Stable error kind for a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusErrorKind {
    /// 400.
    BadRequest,
    /// 401, only surfaced when reauthentication was suppressed.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 405.
    MethodNotAllowed,
    /// 409.
    Conflict,
    /// 429.
    RateLimited,
    /// Any 5xx.
    ServerError,
    /// Any other status outside the acceptable set.
    Unexpected,
}

impl StatusErrorKind {
    /// Maps a status code onto its error kind.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudplane::clients::StatusErrorKind;
    ///
    /// assert_eq!(StatusErrorKind::from_status(404), StatusErrorKind::NotFound);
    /// assert_eq!(StatusErrorKind::from_status(503), StatusErrorKind::ServerError);
    /// assert_eq!(StatusErrorKind::from_status(418), StatusErrorKind::Unexpected);
    /// ```
    #[must_use]
    pub const fn from_status(code: u16) -> Self {
        match code {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            409 => Self::Conflict,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::Unexpected,
        }
    }
}

impl fmt::Display for StatusErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadRequest => "Bad request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::Conflict => "Conflict",
            Self::RateLimited => "Rate limited",
            Self::ServerError => "Internal server error",
            Self::Unexpected => "Unexpected response code",
        };
        f.write_str(name)
    }
}

/// Error returned when a response status falls outside the acceptable set.
///
/// The raw body and headers are kept so callers can inspect payloads the
/// SDK could not interpret.
///
/// # Example
///
/// ```rust
/// use cloudplane::clients::{HttpResponseError, StatusErrorKind};
/// use std::collections::HashMap;
///
/// let error = HttpResponseError {
///     code: 404,
///     kind: StatusErrorKind::NotFound,
///     message: "Node abc could not be found.".to_string(),
///     body: br#"{"error_message": "Node abc could not be found."}"#.to_vec(),
///     headers: HashMap::new(),
///     error_reference: Some("req-123".to_string()),
/// };
///
/// assert!(error.to_string().contains("404"));
/// ```
#[derive(Clone, Debug, Error)]
#[error("{kind} ({code}): {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The stable kind for `code`.
    pub kind: StatusErrorKind,
    /// Best-effort error message decoded from the body.
    pub message: String,
    /// The raw response body.
    pub body: Vec<u8>,
    /// Response headers, lower-cased names.
    pub headers: HashMap<String, Vec<String>>,
    /// Request id reported by the server, for error reports.
    pub error_reference: Option<String>,
}

/// Error returned when maximum retry attempts have been exhausted.
///
/// Only raised for requests that opted into rate-limit retries with
/// [`HttpRequestBuilder::tries`](crate::clients::HttpRequestBuilder::tries).
#[derive(Clone, Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of tries that were attempted.
    pub tries: u32,
    /// Error message from the last response.
    pub message: String,
    /// Request id of the last response.
    pub error_reference: Option<String>,
}

/// Error returned when a request fails validation before anything is sent.
///
/// # Example
///
/// ```rust
/// use cloudplane::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingPatchValue {
///     op: "add".to_string(),
///     path: "/extra/foo".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Patch operation add at /extra/foo requires a value.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The request declared an empty set of acceptable status codes.
    #[error("The set of acceptable status codes cannot be empty.")]
    EmptyOkCodes,

    /// The method does not allow a request body.
    #[error("Cannot send a body with {method}.")]
    BodyNotAllowed {
        /// The method that was given a body.
        method: String,
    },

    /// An absolute request URL was not http(s).
    #[error("Invalid request URL {url}.")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// A header name or value cannot be sent over HTTP.
    #[error("Invalid header {name}.")]
    InvalidHeader {
        /// The rejected header name.
        name: String,
    },

    /// A microversion was requested from a client with no service type.
    #[error("Cannot send microversion {version} without a service type.")]
    MicroversionWithoutServiceType {
        /// The requested microversion.
        version: String,
    },

    /// An `add` or `replace` patch operation has no value.
    #[error("Patch operation {op} at {path} requires a value.")]
    MissingPatchValue {
        /// The operation name.
        op: String,
        /// The target path.
        path: String,
    },

    /// A patch path is not a slash-delimited pointer.
    #[error("Patch path {path:?} must start with '/'.")]
    InvalidPatchPath {
        /// The rejected path.
        path: String,
    },
}

/// Error returned when a body cannot be projected into the requested shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// There is no body to extract from.
    #[error("Response has no body to extract.")]
    EmptyBody,

    /// The body does not have the requested shape.
    #[error("Response body is incompatible with the requested shape: {reason}")]
    Incompatible {
        /// Decoder message.
        reason: String,
    },

    /// A page does not have the shape its pagination scheme expects.
    #[error("Page does not match its pagination scheme: {reason}")]
    PaginationScheme {
        /// What was missing or malformed.
        reason: String,
    },
}

/// Unified error type for every call made through the client.
///
/// `Clone`, so an [`ApiResult`](crate::clients::ApiResult) can hand out its
/// error from every extraction.
///
/// # Example
///
/// ```rust,ignore
/// use cloudplane::HttpError;
///
/// match client.request(request).await {
///     Ok(response) => { /* handle success */ }
///     Err(HttpError::Response(e)) => { /* status error */ }
///     Err(HttpError::Authentication(e)) => { /* reauthentication failed */ }
///     Err(HttpError::DeadlineExceeded { .. }) => { /* caller deadline */ }
///     Err(e) => { /* transport, decode or validation */ }
/// }
/// ```
#[derive(Clone, Debug, Error)]
pub enum HttpError {
    /// A status outside the acceptable set.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Reauthentication failed or the retried request was rejected again.
    #[error(transparent)]
    Authentication(#[from] AuthError),

    /// A body could not be decoded into the requested shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The call did not complete within its deadline.
    #[error("Request did not complete within {timeout:?}")]
    DeadlineExceeded {
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[source] Arc<reqwest::Error>),
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(Arc::new(error))
    }
}

impl HttpError {
    /// Returns the status error kind, if this is a status error.
    #[must_use]
    pub const fn status_kind(&self) -> Option<StatusErrorKind> {
        match self {
            Self::Response(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Returns `true` if the server reported the resource missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status_kind(), Some(StatusErrorKind::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_error(code: u16) -> HttpResponseError {
        HttpResponseError {
            code,
            kind: StatusErrorKind::from_status(code),
            message: "boom".to_string(),
            body: b"boom".to_vec(),
            headers: HashMap::new(),
            error_reference: None,
        }
    }

    #[test]
    fn test_status_table() {
        let table = [
            (400, StatusErrorKind::BadRequest),
            (401, StatusErrorKind::Unauthorized),
            (403, StatusErrorKind::Forbidden),
            (404, StatusErrorKind::NotFound),
            (405, StatusErrorKind::MethodNotAllowed),
            (409, StatusErrorKind::Conflict),
            (429, StatusErrorKind::RateLimited),
            (500, StatusErrorKind::ServerError),
            (503, StatusErrorKind::ServerError),
            (418, StatusErrorKind::Unexpected),
            (302, StatusErrorKind::Unexpected),
        ];
        for (code, kind) in table {
            assert_eq!(StatusErrorKind::from_status(code), kind, "status {code}");
        }
    }

    #[test]
    fn test_response_error_message_includes_code_and_kind() {
        let message = response_error(409).to_string();
        assert!(message.contains("409"));
        assert!(message.contains("Conflict"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_http_error_status_helpers() {
        let error = HttpError::from(response_error(404));
        assert!(error.is_not_found());
        assert_eq!(error.status_kind(), Some(StatusErrorKind::NotFound));

        let error = HttpError::from(DecodeError::EmptyBody);
        assert!(!error.is_not_found());
        assert!(error.status_kind().is_none());
    }

    #[test]
    fn test_max_retries_error_includes_retry_count() {
        let error = MaxHttpRetriesExceededError {
            code: 429,
            tries: 3,
            message: "slow down".to_string(),
            error_reference: None,
        };
        let message = error.to_string();
        assert!(message.contains('3'));
        assert!(message.contains("Exceeded maximum retry count"));
    }

    #[test]
    fn test_authentication_error_is_transparent() {
        let error = HttpError::from(AuthError::StillUnauthorized {
            url: "https://example.com/v1/nodes".to_string(),
        });
        assert!(error.to_string().contains("still unauthorized"));
    }

    #[test]
    fn test_deadline_message() {
        let error = HttpError::DeadlineExceeded {
            timeout: Duration::from_millis(250),
        };
        assert!(error.to_string().contains("250ms"));
    }
}
