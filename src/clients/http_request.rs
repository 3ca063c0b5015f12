//! HTTP request types for the cloudplane SDK.
//!
//! This module provides the [`HttpRequest`] type and its builder: the
//! descriptor of one call made through an [`HttpClient`](crate::clients::HttpClient).

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::clients::errors::InvalidHttpRequestError;
use crate::config::Microversion;
use crate::patch::PatchDocument;

/// HTTP methods supported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP HEAD method for retrieving metadata only.
    Head,
    /// HTTP POST method for creating resources and actions.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP PATCH method for partial updates.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Head => reqwest::Method::HEAD,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Head => write!(f, "head"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Patch => write!(f, "patch"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Payload format for request bodies and the `Accept` header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataType {
    /// JSON content type (`application/json`).
    #[default]
    Json,
    /// Plain text content type (`text/plain`).
    Text,
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }
}

/// A request body.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON.
    Json(serde_json::Value),
    /// Sent verbatim.
    Text(String),
}

impl RequestBody {
    /// Returns the default content type of this body.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Json(_) => DataType::Json,
            Self::Text(_) => DataType::Text,
        }
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Text(text) => text.clone().into_bytes(),
        }
    }
}

/// A request to be sent through an [`HttpClient`](crate::clients::HttpClient).
///
/// Use [`HttpRequest::builder`] to construct requests with the builder pattern.
///
/// # Example
///
/// ```rust
/// use cloudplane::clients::{DataType, HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// // GET request for a plain-text listing
/// let list = HttpRequest::builder(HttpMethod::Get, "")
///     .accept(DataType::Text)
///     .build()
///     .unwrap();
///
/// // POST request with a JSON body that only accepts 202
/// let action = HttpRequest::builder(HttpMethod::Post, "servers/abc/action")
///     .json(json!({"reboot": {"type": "SOFT"}}))
///     .ok_codes([202])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// A path relative to the endpoint, or an absolute http(s) URL.
    pub path: String,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Overrides the `Content-Type` derived from the body.
    pub content_type: Option<String>,
    /// The payload format to ask for.
    pub accept: DataType,
    /// Query parameters to append to the URL.
    pub query: Option<HashMap<String, String>>,
    /// Additional headers to include in the request.
    pub extra_headers: Option<HashMap<String, String>>,
    /// Acceptable status codes; `None` accepts any 2xx.
    pub ok_codes: Option<Vec<u16>>,
    /// Surfaces a 401 as a status error instead of reauthenticating.
    pub omit_reauth: bool,
    /// Keeps the body as bytes without decoding JSON.
    pub raw_body: bool,
    /// Number of times to attempt the request on 429 (default: 1).
    pub tries: u32,
    /// Deadline for the whole call, including reauthentication.
    pub timeout: Option<Duration>,
    /// Overrides the client's microversion for this call.
    pub microversion: Option<Microversion>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method for the request
    /// * `path` - A path relative to the endpoint, or an absolute URL
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `ok_codes` is `Some` but empty
    /// - a `HEAD` request carries a body
    /// - `path` is an absolute URL with a scheme other than http(s)
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.ok_codes.as_ref().is_some_and(Vec::is_empty) {
            return Err(InvalidHttpRequestError::EmptyOkCodes);
        }

        if self.http_method == HttpMethod::Head && self.body.is_some() {
            return Err(InvalidHttpRequestError::BodyNotAllowed {
                method: self.http_method.to_string(),
            });
        }

        if self.path.contains("://") && !self.is_absolute() {
            return Err(InvalidHttpRequestError::InvalidUrl {
                url: self.path.clone(),
            });
        }

        Ok(())
    }

    /// Returns `true` if `path` is an absolute http(s) URL.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }

    /// Returns `true` if `code` is in the acceptable set.
    #[must_use]
    pub fn accepts(&self, code: u16) -> bool {
        self.ok_codes
            .as_ref()
            .map_or((200..=299).contains(&code), |codes| codes.contains(&code))
    }

    /// Returns the `Content-Type` to send, if the request has a body.
    #[must_use]
    pub fn body_content_type(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        Some(
            self.content_type
                .as_deref()
                .unwrap_or_else(|| body.data_type().as_content_type()),
        )
    }

    /// Returns a copy of this request with one query parameter set.
    #[must_use]
    pub fn with_query_param(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut request = self.clone();
        request
            .query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        request
    }

    /// Returns a copy of this request aimed at another URL, without query parameters.
    #[must_use]
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            path: url.into(),
            query: None,
            ..self.clone()
        }
    }
}

/// Builder for constructing [`HttpRequest`] instances.
///
/// Provides a fluent API for building requests with optional parameters.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    /// Creates a new builder with the required method and path.
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            request: HttpRequest {
                http_method: method,
                path: path.into(),
                body: None,
                content_type: None,
                accept: DataType::Json,
                query: None,
                extra_headers: None,
                ok_codes: None,
                omit_reauth: false,
                raw_body: false,
                tries: 1,
                timeout: None,
                microversion: None,
            },
        }
    }

    /// Sets a JSON request body.
    #[must_use]
    pub fn json(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.request.body = Some(RequestBody::Json(body.into()));
        self
    }

    /// Sets a plain-text request body.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.request.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Sets a patch document as the request body.
    ///
    /// The document is sent as `application/json` unless
    /// [`content_type`](Self::content_type) says otherwise.
    #[must_use]
    pub fn patch_document(mut self, document: &PatchDocument) -> Self {
        self.request.body = Some(RequestBody::Json(document.to_json()));
        self
    }

    /// Overrides the `Content-Type` header of the body.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.request.content_type = Some(content_type.into());
        self
    }

    /// Sets the payload format to ask for.
    #[must_use]
    pub const fn accept(mut self, accept: DataType) -> Self {
        self.request.accept = accept;
        self
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.request.query = Some(query);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets all extra headers at once.
    #[must_use]
    pub fn extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.request.extra_headers = Some(headers);
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the acceptable status codes.
    ///
    /// When unset any 2xx is accepted.
    #[must_use]
    pub fn ok_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.request.ok_codes = Some(codes.into_iter().collect());
        self
    }

    /// Disables reauthentication for this request.
    #[must_use]
    pub const fn omit_reauth(mut self) -> Self {
        self.request.omit_reauth = true;
        self
    }

    /// Keeps the response body as raw bytes.
    #[must_use]
    pub const fn raw_body(mut self) -> Self {
        self.request.raw_body = true;
        self
    }

    /// Sets the number of times to attempt the request.
    ///
    /// Default is 1 (no retries). Higher values retry 429 responses,
    /// honouring `Retry-After`.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.request.tries = tries;
        self
    }

    /// Sets a deadline for the whole call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    /// Overrides the client's microversion for this call.
    #[must_use]
    pub const fn microversion(mut self, microversion: Microversion) -> Self {
        self.request.microversion = Some(microversion);
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        self.request.verify()?;
        Ok(self.request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "get");
        assert_eq!(HttpMethod::Head.to_string(), "head");
        assert_eq!(HttpMethod::Patch.to_string(), "patch");
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_data_type_content_type() {
        assert_eq!(DataType::Json.as_content_type(), "application/json");
        assert_eq!(DataType::Text.as_content_type(), "text/plain");
    }

    #[test]
    fn test_builder_defaults() {
        let request = HttpRequest::builder(HttpMethod::Get, "nodes")
            .build()
            .unwrap();

        assert_eq!(request.http_method, HttpMethod::Get);
        assert_eq!(request.path, "nodes");
        assert!(request.body.is_none());
        assert_eq!(request.accept, DataType::Json);
        assert!(request.ok_codes.is_none());
        assert!(!request.omit_reauth);
        assert!(!request.raw_body);
        assert_eq!(request.tries, 1);
    }

    #[test]
    fn test_default_ok_codes_accept_any_2xx() {
        let request = HttpRequest::builder(HttpMethod::Get, "nodes")
            .build()
            .unwrap();
        assert!(request.accepts(200));
        assert!(request.accepts(204));
        assert!(!request.accepts(301));
        assert!(!request.accepts(404));
    }

    #[test]
    fn test_explicit_ok_codes() {
        let request = HttpRequest::builder(HttpMethod::Post, "action")
            .ok_codes([202])
            .build()
            .unwrap();
        assert!(request.accepts(202));
        assert!(!request.accepts(200));
    }

    #[test]
    fn test_empty_ok_codes_rejected() {
        let result = HttpRequest::builder(HttpMethod::Get, "nodes")
            .ok_codes(Vec::new())
            .build();
        assert!(matches!(result, Err(InvalidHttpRequestError::EmptyOkCodes)));
    }

    #[test]
    fn test_head_with_body_rejected() {
        let result = HttpRequest::builder(HttpMethod::Head, "nodes")
            .json(json!({}))
            .build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::BodyNotAllowed { method }) if method == "head"
        ));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let result = HttpRequest::builder(HttpMethod::Get, "ftp://example.com/nodes").build();
        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_body_content_type() {
        let json_request = HttpRequest::builder(HttpMethod::Post, "nodes")
            .json(json!({"name": "n1"}))
            .build()
            .unwrap();
        assert_eq!(json_request.body_content_type(), Some("application/json"));

        let text_request = HttpRequest::builder(HttpMethod::Post, "")
            .text("a\nb\n")
            .build()
            .unwrap();
        assert_eq!(text_request.body_content_type(), Some("text/plain"));

        let overridden = HttpRequest::builder(HttpMethod::Patch, "nodes/n1")
            .json(json!([]))
            .content_type("text/plain")
            .build()
            .unwrap();
        assert_eq!(overridden.body_content_type(), Some("text/plain"));

        let no_body = HttpRequest::builder(HttpMethod::Get, "nodes")
            .build()
            .unwrap();
        assert!(no_body.body_content_type().is_none());
    }

    #[test]
    fn test_with_query_param_replaces_value() {
        let request = HttpRequest::builder(HttpMethod::Get, "nodes")
            .query_param("marker", "a")
            .query_param("limit", "2")
            .build()
            .unwrap();

        let next = request.with_query_param("marker", "b");
        let query = next.query.unwrap();
        assert_eq!(query.get("marker"), Some(&"b".to_string()));
        assert_eq!(query.get("limit"), Some(&"2".to_string()));
        assert_eq!(
            request.query.unwrap().get("marker"),
            Some(&"a".to_string())
        );
    }

    #[test]
    fn test_with_url_drops_query() {
        let request = HttpRequest::builder(HttpMethod::Get, "nodes")
            .query_param("limit", "2")
            .build()
            .unwrap();
        let next = request.with_url("https://example.com/v1/nodes?marker=x");
        assert!(next.is_absolute());
        assert!(next.query.is_none());
    }
}
