//! HTTP client types for cloud service endpoints.
//!
//! This module provides the request executor every resource binding sits
//! on: it attaches the session token, recovers from rejected tokens,
//! classifies responses and wraps them for extraction.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: The async request executor for one endpoint
//! - [`HttpRequest`]: A request descriptor
//! - [`HttpResponse`]: A received response with raw and decoded body
//! - [`ApiResult`]: The outcome of one call, for repeated extraction
//! - [`HttpMethod`]: Supported HTTP methods
//! - [`DataType`]: Payload formats for bodies and `Accept`
//! - [`BulkDeleteResponse`]: Summary of a bulk delete
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudplane::{EndpointUrl, HttpClient, HttpMethod, HttpRequest, ServiceConfig, Session, Token};
//!
//! let session = Session::new(Token::new("gAAAAABk"));
//! let config = ServiceConfig::builder()
//!     .endpoint(EndpointUrl::new("https://object.example.com/v1/AUTH_demo")?)
//!     .build()?;
//! let client = HttpClient::new(&session, &config)?;
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "")
//!     .accept(cloudplane::DataType::Text)
//!     .build()?;
//! let containers = client.call(request).await.extract_lines()?;
//! ```
//!
//! # Reauthentication
//!
//! When a request is rejected with 401 and the session has a
//! [`Reauthenticator`](crate::auth::Reauthenticator), the client refreshes
//! the token through the session and retries once. A second 401 surfaces as
//! [`AuthError::StillUnauthorized`](crate::auth::AuthError::StillUnauthorized).
//! Use [`HttpRequestBuilder::omit_reauth`] to get the 401 as a status error
//! instead.
//!
//! # Retry Behavior
//!
//! The default `tries` is 1, meaning no automatic retries. With `.tries(n)`,
//! 429 responses are retried using the `Retry-After` header value, or 1
//! second if not present. Other statuses return immediately.

mod api_result;
mod bulk;
mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use api_result::ApiResult;
pub use bulk::BulkDeleteResponse;
pub use errors::{
    DecodeError, HttpError, HttpResponseError, InvalidHttpRequestError,
    MaxHttpRetriesExceededError, StatusErrorKind,
};
pub use http_client::{HttpClient, AUTH_TOKEN_HEADER, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder, RequestBody};
pub use http_response::{HttpResponse, LinkHeader};
