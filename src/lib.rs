//! # cloudplane SDK
//!
//! The request, pagination and result-extraction engine for versioned,
//! token-authenticated cloud control-plane APIs. Resource bindings (nodes,
//! servers, containers, images) are thin layers over this crate.
//!
//! ## Overview
//!
//! This SDK provides:
//! - A shared credential [`Session`] that refreshes its token at most once per
//!   rejection, however many tasks observe the rejection
//! - An async [`HttpClient`] that attaches the token and microversion headers,
//!   retries once after reauthentication, and maps statuses onto stable error kinds
//! - [`ApiResult`], a repeatable extractor over JSON or plain-text bodies
//! - A [`pagination::Pager`] over marker, link and single-page listings
//! - [`patch::PatchDocument`] for ordered partial updates
//! - Type-safe endpoint configuration via [`ServiceConfig`] and [`ServiceConfigBuilder`]
//!
//! ## Quick Start
//!
//! ```rust
//! use cloudplane::{EndpointUrl, Microversion, ServiceConfig, ServiceType};
//!
//! let config = ServiceConfig::builder()
//!     .endpoint(EndpointUrl::new("https://compute.example.com/v2.1").unwrap())
//!     .service_type(ServiceType::Compute)
//!     .microversion(Microversion::new(2, 79))
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Sessions and Reauthentication
//!
//! ```rust,ignore
//! use cloudplane::auth::identity::PasswordIssuer;
//! use cloudplane::{EndpointUrl, HttpClient, Session};
//!
//! let issuer = PasswordIssuer::builder()
//!     .identity_endpoint(EndpointUrl::new("https://keystone.example.com/v3")?)
//!     .username("demo")
//!     .password("secret")
//!     .project("demo-project")
//!     .build()?;
//!
//! // The first request authenticates; later 401s refresh the token.
//! let session = Session::unauthenticated(issuer);
//! let compute = HttpClient::new(&session, &compute_config)?;
//! let images = HttpClient::new(&session, &image_config)?;
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use cloudplane::{HttpMethod, HttpRequest};
//! use cloudplane::patch::PatchDocument;
//! use serde_json::json;
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "servers/abc").build()?;
//! let server: Server = client.call(request).await.extract_into_at("server")?;
//!
//! let patch = PatchDocument::builder()
//!     .replace("/name", json!("web-2"))
//!     .build()?;
//! let request = HttpRequest::builder(HttpMethod::Patch, "nodes/abc")
//!     .patch_document(&patch)
//!     .build()?;
//! client.request(request).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Sessions and configs are instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes, requests and patch documents validate before any request
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **No read-ahead**: Pagers fetch a page only when the caller asks for it

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod pagination;
pub mod patch;

// Re-export public types at crate root for convenience
pub use auth::{AuthError, ReauthState, Reauthenticator, Session, Token};
pub use config::{
    EndpointUrl, Microversion, ServiceConfig, ServiceConfigBuilder, ServiceType,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    ApiResult, BulkDeleteResponse, DataType, DecodeError, HttpClient, HttpError, HttpMethod,
    HttpRequest, HttpRequestBuilder, HttpResponse, HttpResponseError, InvalidHttpRequestError,
    MaxHttpRetriesExceededError, StatusErrorKind,
};

// Re-export pagination types
pub use pagination::{Page, Pager, PaginationScheme};
