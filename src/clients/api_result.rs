//! The outcome envelope of one call.
//!
//! [`ApiResult`] separates "did the call succeed" from "what shape is the
//! payload": the error is available through [`ApiResult::extract_err`] and
//! the body can be projected into any shape, as many times as needed.
//!
//! # Example
//!
//! ```rust
//! use cloudplane::clients::{ApiResult, HttpResponse};
//! use serde::Deserialize;
//! use std::collections::HashMap;
//!
//! #[derive(Deserialize)]
//! struct Node {
//!     uuid: String,
//! }
//!
//! let mut headers = HashMap::new();
//! headers.insert("content-type".to_string(), vec!["application/json".to_string()]);
//! let response = HttpResponse::new(200, headers, br#"{"node": {"uuid": "abc"}}"#.to_vec(), true);
//!
//! let result = ApiResult::from(Ok(response));
//! let node: Node = result.extract_into_at("node").unwrap();
//! assert_eq!(node.uuid, "abc");
//! assert!(result.extract_err().is_none());
//! ```

use serde::de::DeserializeOwned;

use crate::clients::errors::{DecodeError, HttpError};
use crate::clients::http_response::HttpResponse;

/// The outcome of one call: a response or an error.
///
/// A status error keeps the raw body so callers can still inspect it.
#[derive(Clone, Debug)]
pub struct ApiResult {
    response: Option<HttpResponse>,
    error: Option<HttpError>,
}

impl From<Result<HttpResponse, HttpError>> for ApiResult {
    fn from(outcome: Result<HttpResponse, HttpError>) -> Self {
        match outcome {
            Ok(response) => Self {
                response: Some(response),
                error: None,
            },
            Err(error) => Self {
                response: None,
                error: Some(error),
            },
        }
    }
}

impl ApiResult {
    /// Returns `true` if the call succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the stored error, if any.
    #[must_use]
    pub const fn extract_err(&self) -> Option<&HttpError> {
        self.error.as_ref()
    }

    /// Returns the successful response, if any.
    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Returns the status code of the response, including status errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match (&self.response, &self.error) {
            (Some(response), _) => Some(response.code),
            (None, Some(HttpError::Response(e))) => Some(e.code),
            _ => None,
        }
    }

    /// Returns the raw body bytes.
    ///
    /// Works on successful results and on status errors.
    #[must_use]
    pub fn raw_body(&self) -> Option<&[u8]> {
        match (&self.response, &self.error) {
            (Some(response), _) => Some(response.raw.as_slice()),
            (None, Some(HttpError::Response(e))) => Some(e.body.as_slice()),
            _ => None,
        }
    }

    /// Returns the first value of a response header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        match (&self.response, &self.error) {
            (Some(response), _) => response.header(name),
            (None, Some(HttpError::Response(e))) => e
                .headers
                .get(&name.to_lowercase())
                .and_then(|values| values.first())
                .map(String::as_str),
            _ => None,
        }
    }

    /// Decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// - The stored error, if the call failed
    /// - [`DecodeError::EmptyBody`] if there is no body (e.g. 204)
    /// - [`DecodeError::Incompatible`] if the body does not have `T`'s shape
    pub fn extract_into<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        let body = self.json_body()?;
        serde_json::from_value(body).map_err(incompatible)
    }

    /// Decodes the top-level field `label` of the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`extract_into`](Self::extract_into); a missing field is
    /// [`DecodeError::Incompatible`].
    pub fn extract_into_at<T: DeserializeOwned>(&self, label: &str) -> Result<T, HttpError> {
        let mut body = self.json_body()?;
        let field = body
            .get_mut(label)
            .map(serde_json::Value::take)
            .ok_or_else(|| DecodeError::Incompatible {
                reason: format!("missing field `{label}`"),
            })?;
        serde_json::from_value(field).map_err(incompatible)
    }

    /// Splits a plain-text body into its non-empty lines.
    ///
    /// A JSON array of strings is accepted too.
    ///
    /// # Errors
    ///
    /// - The stored error, if the call failed
    /// - [`DecodeError::Incompatible`] for JSON that is not a string array
    pub fn extract_lines(&self) -> Result<Vec<String>, HttpError> {
        let response = self.success()?;
        if let Some(body) = &response.body {
            return serde_json::from_value(body.clone()).map_err(incompatible);
        }
        Ok(response
            .text()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Converts into the underlying outcome.
    ///
    /// # Errors
    ///
    /// Returns the stored error if the call failed.
    pub fn into_result(self) -> Result<HttpResponse, HttpError> {
        match (self.response, self.error) {
            (_, Some(error)) => Err(error),
            (Some(response), None) => Ok(response),
            (None, None) => Err(DecodeError::EmptyBody.into()),
        }
    }

    fn success(&self) -> Result<&HttpResponse, HttpError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        self.response
            .as_ref()
            .ok_or_else(|| DecodeError::EmptyBody.into())
    }

    fn json_body(&self) -> Result<serde_json::Value, HttpError> {
        let response = self.success()?;
        if let Some(body) = &response.body {
            return Ok(body.clone());
        }
        if response.code == 204 || response.raw.is_empty() {
            return Err(DecodeError::EmptyBody.into());
        }
        serde_json::from_slice(&response.raw).map_err(incompatible)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn incompatible(error: serde_json::Error) -> HttpError {
    HttpError::Decode(DecodeError::Incompatible {
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::errors::{HttpResponseError, StatusErrorKind};
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Node {
        uuid: String,
    }

    fn response(code: u16, content_type: &str, body: &[u8]) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec![content_type.to_string()]);
        HttpResponse::new(code, headers, body.to_vec(), true)
    }

    fn not_found() -> ApiResult {
        ApiResult::from(Err(HttpError::Response(HttpResponseError {
            code: 404,
            kind: StatusErrorKind::NotFound,
            message: "missing".to_string(),
            body: br#"{"message": "missing"}"#.to_vec(),
            headers: HashMap::new(),
            error_reference: None,
        })))
    }

    #[test]
    fn test_extract_into_is_repeatable() {
        let result = ApiResult::from(Ok(response(200, "application/json", br#"{"uuid": "abc"}"#)));
        let first: Node = result.extract_into().unwrap();
        let second: Node = result.extract_into().unwrap();
        assert_eq!(first, second);
        assert!(result.extract_err().is_none());
        assert!(result.extract_err().is_none());
    }

    #[test]
    fn test_extract_from_204_is_empty_body() {
        let result = ApiResult::from(Ok(response(204, "application/json", b"")));
        assert!(result.is_ok());
        let err = result.extract_into::<Node>().unwrap_err();
        assert!(matches!(err, HttpError::Decode(DecodeError::EmptyBody)));
    }

    #[test]
    fn test_extract_incompatible_shape() {
        let result = ApiResult::from(Ok(response(200, "application/json", br#"{"id": 1}"#)));
        let err = result.extract_into::<Node>().unwrap_err();
        assert!(matches!(
            err,
            HttpError::Decode(DecodeError::Incompatible { .. })
        ));
    }

    #[test]
    fn test_extract_into_at_missing_field() {
        let result = ApiResult::from(Ok(response(200, "application/json", br#"{"nodes": []}"#)));
        let err = result.extract_into_at::<Node>("node").unwrap_err();
        assert!(err.to_string().contains("missing field `node`"));

        let nodes: Vec<Node> = result.extract_into_at("nodes").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_error_result_keeps_raw_body() {
        let result = not_found();
        assert!(!result.is_ok());
        assert_eq!(result.status(), Some(404));
        assert_eq!(result.raw_body(), Some(br#"{"message": "missing"}"#.as_slice()));
        assert!(result.extract_err().unwrap().is_not_found());
        let err = result.extract_into::<Node>().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_raw_json_body_still_extractable() {
        let raw = HttpResponse::new(200, HashMap::new(), br#"{"uuid": "raw"}"#.to_vec(), false);
        let result = ApiResult::from(Ok(raw));
        let node: Node = result.extract_into().unwrap();
        assert_eq!(node.uuid, "raw");
    }

    #[test]
    fn test_extract_lines_from_text_and_json() {
        let text = ApiResult::from(Ok(response(200, "text/plain", b"janeausten\nmarktwain\n")));
        assert_eq!(text.extract_lines().unwrap(), vec!["janeausten", "marktwain"]);

        let json = ApiResult::from(Ok(response(200, "application/json", br#"["a", "b"]"#)));
        assert_eq!(json.extract_lines().unwrap(), vec!["a", "b"]);

        let empty = ApiResult::from(Ok(response(204, "text/plain", b"")));
        assert!(empty.extract_lines().unwrap().is_empty());
    }

    #[test]
    fn test_into_result() {
        assert!(not_found().into_result().is_err());
        let ok = ApiResult::from(Ok(response(200, "text/plain", b"x")));
        assert_eq!(ok.into_result().unwrap().code, 200);
    }
}
