//! HTTP client for cloud service endpoints.
//!
//! This module provides the [`HttpClient`] type: the request executor that
//! attaches the session token, classifies responses and reauthenticates
//! at most once per call.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::auth::{AuthError, Session, TokenSnapshot};
use crate::clients::api_result::ApiResult;
use crate::clients::errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
    StatusErrorKind,
};
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;
use crate::config::{Microversion, ServiceConfig};

/// Header carrying the session token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Fixed retry wait time in seconds when no `Retry-After` is given.
pub const RETRY_WAIT_TIME: u64 = 1;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request executor bound to one service endpoint and one session.
///
/// The client handles:
/// - URL construction from the endpoint and relative paths
/// - Default headers including User-Agent, token and microversion
/// - Reauthentication and a single retry when the token is rejected
/// - Classification of the status against the request's acceptable codes
/// - Opt-in retries for 429 responses
///
/// Cloning is cheap; clones share the transport and the session.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use cloudplane::{EndpointUrl, HttpClient, HttpMethod, HttpRequest, ServiceConfig, Session, Token};
///
/// let session = Session::new(Token::new("gAAAAABk"));
/// let config = ServiceConfig::builder()
///     .endpoint(EndpointUrl::new("https://baremetal.example.com/v1")?)
///     .build()?;
/// let client = HttpClient::new(&session, &config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "nodes").build()?;
/// let nodes: serde_json::Value = client.call(request).await.extract_into()?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// The shared credential session.
    session: Session,
    /// The endpoint binding.
    config: ServiceConfig,
    /// Headers included in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new client with its own transport.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the transport cannot be created.
    pub fn new(session: &Session, config: &ServiceConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self::with_transport(client, session, config))
    }

    /// Creates a new client over a caller-supplied transport.
    #[must_use]
    pub fn with_transport(client: reqwest::Client, session: &Session, config: &ServiceConfig) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} "));
        let user_agent = format!("{user_agent_prefix}cloudplane-sdk/{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        for (name, value) in config.default_headers() {
            default_headers.insert(name.clone(), value.clone());
        }

        Self {
            client,
            session: session.clone(),
            config: config.clone(),
            default_headers,
        }
    }

    /// Returns the session this client authenticates with.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the endpoint binding.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns a client for the same endpoint and session at another microversion.
    #[must_use]
    pub fn with_microversion(&self, microversion: Microversion) -> Self {
        Self {
            config: self.config.with_microversion(microversion),
            ..self.clone()
        }
    }

    /// Resolves a request path against the endpoint.
    ///
    /// Absolute http(s) URLs are returned unchanged.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.config.endpoint().join(path)
        }
    }

    /// Builds an endpoint URL from path segments, percent-encoding each one.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let url = client.url_for(&["containers", "my container"]);
    /// assert!(url.ends_with("/containers/my%20container"));
    /// ```
    #[must_use]
    pub fn url_for(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|segment| urlencoding::encode(segment))
            .collect::<Vec<_>>()
            .join("/");
        self.config.endpoint().join(&path)
    }

    /// Sends a request and wraps the outcome in an [`ApiResult`].
    pub async fn call(&self, request: HttpRequest) -> ApiResult {
        ApiResult::from(self.request(request).await)
    }

    /// Sends a request.
    ///
    /// This method handles:
    /// - Request validation
    /// - URL construction and header merging
    /// - Proactive reauthentication when the stored token is known to be expired
    /// - Reauthentication and one retry on 401
    /// - Retry logic for 429 responses when `tries > 1`
    /// - The per-call deadline from the request or the config
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Reauthentication fails or the retry is rejected again (`Authentication`)
    /// - The status is outside the acceptable set (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    /// - The deadline elapsed (`DeadlineExceeded`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        // Validate request first
        request.verify()?;

        match request.timeout.or_else(|| self.config.timeout()) {
            Some(timeout) => tokio::time::timeout(timeout, self.execute(&request))
                .await
                .map_err(|_| HttpError::DeadlineExceeded { timeout })?,
            None => self.execute(&request).await,
        }
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.resolve_url(&request.path);
        let may_reauth = !request.omit_reauth && self.session.can_reauthenticate();

        let mut token = self.session.current_token().await;
        let mut reauthenticated = false;
        if token.stale && may_reauth {
            tracing::debug!(url = %url, "Stored token is missing or expired, reauthenticating");
            token = self.session.reauthenticate(token.generation).await?;
            reauthenticated = true;
        }

        let mut rate_limited: u32 = 0;
        loop {
            let response = self.send(request, &url, &token).await?;

            if response.code == 401 && may_reauth {
                if reauthenticated {
                    return Err(AuthError::StillUnauthorized { url }.into());
                }
                tracing::warn!(
                    url = %url,
                    generation = token.generation,
                    "Request was rejected with 401, reauthenticating"
                );
                token = self.session.reauthenticate(token.generation).await?;
                reauthenticated = true;
                continue;
            }

            if request.accepts(response.code) {
                return Ok(response);
            }

            if response.code != 429 || request.tries <= 1 {
                return Err(Self::status_error(response).into());
            }

            rate_limited += 1;
            if rate_limited >= request.tries {
                let message = Self::error_message(&response);
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code: response.code,
                    tries: request.tries,
                    message,
                    error_reference: response.request_id().map(String::from),
                }));
            }

            let delay = Self::calculate_retry_delay(&response);
            tracing::debug!(url = %url, attempt = rate_limited, ?delay, "Rate limited, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    async fn send(
        &self,
        request: &HttpRequest,
        url: &str,
        token: &TokenSnapshot,
    ) -> Result<HttpResponse, HttpError> {
        let mut req_builder = self
            .client
            .request(request.http_method.as_reqwest(), url)
            .headers(self.build_headers(request, token)?);

        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.to_bytes());
        }

        tracing::debug!(method = %request.http_method, url = %url, "Sending request");
        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let raw = res.bytes().await?.to_vec();
        tracing::debug!(url = %url, status = code, bytes = raw.len(), "Received response");

        Ok(HttpResponse::new(code, res_headers, raw, !request.raw_body))
    }

    /// Assembles the outgoing headers.
    ///
    /// Later sources replace earlier ones: defaults, then `Accept`, the token,
    /// microversion headers, `Content-Type`, and finally per-request headers.
    fn build_headers(
        &self,
        request: &HttpRequest,
        token: &TokenSnapshot,
    ) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        let mut set = |name: &str, value: &str| -> Result<(), HttpError> {
            let invalid = || InvalidHttpRequestError::InvalidHeader {
                name: name.to_string(),
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            headers.insert(header_name, header_value);
            Ok(())
        };

        for (key, value) in &self.default_headers {
            set(key, value)?;
        }
        set("Accept", request.accept.as_content_type())?;

        if !token.id.is_empty() {
            set(AUTH_TOKEN_HEADER, &token.id)?;
        }

        let microversion = request.microversion.or_else(|| self.config.microversion());
        match (self.config.service_type(), microversion) {
            (Some(service), Some(version)) => {
                for (name, value) in service.microversion_headers(version) {
                    set(name, &value)?;
                }
            }
            (None, Some(version)) => {
                return Err(InvalidHttpRequestError::MicroversionWithoutServiceType {
                    version: version.to_string(),
                }
                .into());
            }
            _ => {}
        }

        if let Some(content_type) = request.body_content_type() {
            set("Content-Type", content_type)?;
        }

        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                set(key, value)?;
            }
        }

        Ok(headers)
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Uses `Retry-After` if present, otherwise a fixed delay.
    fn calculate_retry_delay(response: &HttpResponse) -> Duration {
        response
            .retry_request_after
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map_or(Duration::from_secs(RETRY_WAIT_TIME), Duration::from_secs_f64)
    }

    fn status_error(response: HttpResponse) -> HttpResponseError {
        let message = Self::error_message(&response);
        let error_reference = response.request_id().map(String::from);
        HttpResponseError {
            code: response.code,
            kind: StatusErrorKind::from_status(response.code),
            message,
            body: response.raw,
            headers: response.headers,
            error_reference,
        }
    }

    /// Best-effort error description from a failed response.
    fn error_message(response: &HttpResponse) -> String {
        let decoded = response
            .body
            .clone()
            .or_else(|| serde_json::from_slice(&response.raw).ok());
        if let Some(message) = decoded.as_ref().and_then(find_error_message) {
            return message;
        }

        let text = response.text();
        let text = text.trim();
        if text.is_empty() {
            StatusErrorKind::from_status(response.code).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Looks for a message in the error shapes services return.
///
/// Handles flat bodies (`{"message": ..}`), single-key wrappers
/// (`{"itemNotFound": {"message": ..}}`) and JSON-encoded strings
/// (`{"error_message": "{\"faultstring\": ..}"}`).
fn find_error_message(body: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    for key in ["error_message", "faultstring", "message", "error", "title"] {
        match body.get(key) {
            Some(Value::String(text)) => {
                if let Ok(nested @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
                    if let Some(message) = find_error_message(&nested) {
                        return Some(message);
                    }
                }
                return Some(text.clone());
            }
            Some(nested @ Value::Object(_)) => {
                if let Some(message) = find_error_message(nested) {
                    return Some(message);
                }
            }
            _ => {}
        }
    }

    match body {
        Value::Object(map) if map.len() == 1 => map.values().next().and_then(find_error_message),
        _ => None,
    }
}
