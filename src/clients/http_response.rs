//! HTTP response types for the cloudplane SDK.
//!
//! This module provides the [`HttpResponse`] type and the `Link` header
//! parsing used by link-based pagination.

use std::collections::HashMap;

/// Link relations parsed from a `Link` header.
///
/// The header format is `<url>; rel="next", <url>; rel="prev"`. Only the
/// `next` relation drives pagination; other relations are ignored.
///
/// # Example
///
/// ```rust
/// use cloudplane::clients::LinkHeader;
///
/// let links = LinkHeader::parse(r#"<https://example.com/v2/images?marker=b>; rel="next""#);
/// assert_eq!(links.next.as_deref(), Some("https://example.com/v2/images?marker=b"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkHeader {
    /// URL of the next page, if any.
    pub next: Option<String>,
}

impl LinkHeader {
    /// Parses a `Link` header value.
    #[must_use]
    pub fn parse(header_value: &str) -> Self {
        let mut result = Self::default();

        for link in header_value.split(',') {
            let mut parts = link.split(';');
            let Some(url) = parts
                .next()
                .map(|s| s.trim().trim_start_matches('<').trim_end_matches('>'))
                .filter(|s| !s.is_empty())
            else {
                continue;
            };

            let rel = parts.find_map(|part| {
                part.trim()
                    .strip_prefix("rel=")
                    .map(|rel| rel.trim_matches('"'))
            });

            if rel == Some("next") {
                result.next = Some(url.to_string());
            }
        }

        result
    }
}

/// A response received through an [`HttpClient`](crate::clients::HttpClient).
///
/// The raw body bytes are always kept. JSON bodies are additionally decoded
/// into [`body`](Self::body) when the content type says JSON.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers with lower-cased names (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub raw: Vec<u8>,
    /// The decoded JSON body, if the response carried one.
    pub body: Option<serde_json::Value>,
    /// URL of the next page (from `Link` header).
    pub next_link: Option<String>,
    /// Seconds to wait before retrying (from `Retry-After` header).
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing headers and decoding JSON.
    ///
    /// The body is decoded only when `decode` is set, the status is not 204,
    /// the body is non-empty and the content type names JSON. A body that
    /// fails to decode leaves [`body`](Self::body) unset; the bytes remain
    /// available in [`raw`](Self::raw).
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, raw: Vec<u8>, decode: bool) -> Self {
        let first = |name: &str| headers.get(name).and_then(|values| values.first());

        let next_link = first("link").and_then(|link| LinkHeader::parse(link).next);
        let retry_request_after = first("retry-after").and_then(|value| value.parse::<f64>().ok());
        let is_json = first("content-type").is_some_and(|ct| ct.contains("json"));

        let body = if decode && is_json && code != 204 && !raw.is_empty() {
            serde_json::from_slice(&raw).ok()
        } else {
            None
        };

        Self {
            code,
            headers,
            raw,
            body,
            next_link,
            retry_request_after,
        }
    }

    /// Returns the first value of a header, by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `Content-Type` header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }

    /// Returns the request id reported by the server, if present.
    ///
    /// Checks `X-Openstack-Request-Id` first, then `X-Request-Id`.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-openstack-request-id")
            .or_else(|| self.header("x-request-id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_headers() -> HashMap<String, Vec<String>> {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            vec!["application/json; charset=utf-8".to_string()],
        );
        headers
    }

    #[test]
    fn test_json_body_decoded_for_json_content_type() {
        let response = HttpResponse::new(200, json_headers(), br#"{"nodes": []}"#.to_vec(), true);
        assert_eq!(response.body, Some(serde_json::json!({"nodes": []})));
    }

    #[test]
    fn test_body_not_decoded_for_text() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), vec!["text/plain".to_string()]);
        let response = HttpResponse::new(200, headers, b"a\nb\n".to_vec(), true);
        assert!(response.body.is_none());
        assert_eq!(response.text(), "a\nb\n");
    }

    #[test]
    fn test_body_not_decoded_when_raw_requested_or_204() {
        let raw = HttpResponse::new(200, json_headers(), br#"{"a": 1}"#.to_vec(), false);
        assert!(raw.body.is_none());
        assert_eq!(raw.raw, br#"{"a": 1}"#.to_vec());

        let no_content = HttpResponse::new(204, json_headers(), Vec::new(), true);
        assert!(no_content.body.is_none());
    }

    #[test]
    fn test_malformed_json_keeps_raw_bytes() {
        let response = HttpResponse::new(200, json_headers(), b"{not json".to_vec(), true);
        assert!(response.body.is_none());
        assert_eq!(response.text(), "{not json");
    }

    #[test]
    fn test_link_header_parsing() {
        let link = r#"<https://example.com/v2/images?marker=b>; rel="next", <https://example.com/v2/images>; rel="prev""#;
        let parsed = LinkHeader::parse(link);
        assert_eq!(
            parsed,
            LinkHeader {
                next: Some("https://example.com/v2/images?marker=b".to_string()),
            }
        );

        assert_eq!(LinkHeader::parse(""), LinkHeader::default());
        assert!(LinkHeader::parse(r#"<https://example.com>; rel="self""#).next.is_none());
    }

    #[test]
    fn test_next_link_from_header() {
        let mut headers = HashMap::new();
        headers.insert(
            "link".to_string(),
            vec![r#"<https://example.com/v1/items?page=2>; rel="next""#.to_string()],
        );
        let response = HttpResponse::new(200, headers, Vec::new(), true);
        assert_eq!(
            response.next_link.as_deref(),
            Some("https://example.com/v1/items?page=2")
        );
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["2.5".to_string()]);

        let response = HttpResponse::new(429, headers, Vec::new(), true);
        assert!((response.retry_request_after.unwrap() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_request_id_prefers_openstack_header() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["generic".to_string()]);
        headers.insert(
            "x-openstack-request-id".to_string(),
            vec!["req-abc".to_string()],
        );
        let response = HttpResponse::new(200, headers, Vec::new(), true);
        assert_eq!(response.request_id(), Some("req-abc"));

        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["generic".to_string()]);
        let response = HttpResponse::new(200, headers, Vec::new(), true);
        assert_eq!(response.request_id(), Some("generic"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = HttpResponse::new(200, json_headers(), Vec::new(), true);
        assert!(response.header("Content-Type").is_some());
        assert!(response.content_type().unwrap().starts_with("application/json"));
    }
}
