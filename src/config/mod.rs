//! Configuration types for the cloudplane SDK.
//!
//! This module provides the service endpoint binding used to construct an
//! [`HttpClient`](crate::clients::HttpClient).
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ServiceConfig`]: The immutable binding of one service endpoint
//! - [`ServiceConfigBuilder`]: A builder for constructing [`ServiceConfig`] instances
//! - [`EndpointUrl`]: A validated http(s) base URL
//! - [`Microversion`]: A `MAJOR.MINOR` (or `latest`) microversion selector
//! - [`ServiceType`]: The service kind, which decides the microversion headers
//!
//! Many configs may share a single [`Session`](crate::auth::Session); the
//! session owns the token, the config owns everything else.
//!
//! # Example
//!
//! ```rust
//! use cloudplane::{EndpointUrl, Microversion, ServiceConfig, ServiceType};
//!
//! let config = ServiceConfig::builder()
//!     .endpoint(EndpointUrl::new("https://baremetal.example.com/v1").unwrap())
//!     .service_type(ServiceType::Baremetal)
//!     .microversion(Microversion::new(1, 38))
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;
mod service;
mod version;

pub use newtypes::EndpointUrl;
pub use service::{ServiceType, MICROVERSION_HEADER};
pub use version::Microversion;

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// The binding of one service endpoint.
///
/// Holds the base URL, the service type and default microversion, and the
/// headers sent on every request. Immutable once built.
///
/// # Thread Safety
///
/// `ServiceConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    endpoint: EndpointUrl,
    service_type: Option<ServiceType>,
    microversion: Option<Microversion>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
    default_headers: HashMap<String, String>,
}

impl ServiceConfig {
    /// Creates a new builder for constructing a `ServiceConfig`.
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointUrl {
        &self.endpoint
    }

    /// Returns the service type, if configured.
    #[must_use]
    pub const fn service_type(&self) -> Option<&ServiceType> {
        self.service_type.as_ref()
    }

    /// Returns the default microversion, if configured.
    #[must_use]
    pub const fn microversion(&self) -> Option<Microversion> {
        self.microversion
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the default per-call deadline, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the headers added to every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns a copy of this config with a different microversion.
    #[must_use]
    pub fn with_microversion(&self, microversion: Microversion) -> Self {
        Self {
            microversion: Some(microversion),
            ..self.clone()
        }
    }
}

// Verify ServiceConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServiceConfig>();
};

/// Builder for constructing [`ServiceConfig`] instances.
///
/// `endpoint` is required. All other fields default to unset.
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    endpoint: Option<EndpointUrl>,
    service_type: Option<ServiceType>,
    microversion: Option<Microversion>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
    default_headers: HashMap<String, String>,
}

impl ServiceConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint URL (required).
    #[must_use]
    pub fn endpoint(mut self, endpoint: EndpointUrl) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the service type.
    #[must_use]
    pub fn service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = Some(service_type);
        self
    }

    /// Sets the microversion sent on every request.
    #[must_use]
    pub const fn microversion(mut self, microversion: Microversion) -> Self {
        self.microversion = Some(microversion);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the default per-call deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header sent on every request.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Builds the [`ServiceConfig`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] if `endpoint` is not set
    /// - [`ConfigError::EmptyHeaderName`] if a default header has an empty name
    /// - [`ConfigError::MicroversionWithoutServiceType`] if a microversion is
    ///   set without a service type
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .ok_or(ConfigError::MissingRequiredField { field: "endpoint" })?;

        if self.default_headers.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::EmptyHeaderName);
        }

        if let (Some(version), None) = (self.microversion, &self.service_type) {
            return Err(ConfigError::MicroversionWithoutServiceType {
                version: version.to_string(),
            });
        }

        Ok(ServiceConfig {
            endpoint,
            service_type: self.service_type,
            microversion: self.microversion,
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
            default_headers: self.default_headers,
        })
    }
}
