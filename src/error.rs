//! Configuration error types for the cloudplane SDK.
//!
//! This module contains the error type returned when building a service
//! configuration or one of its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Errors raised while talking to a service live in
//! [`crate::clients::HttpError`] instead.
//!
//! # Example
//!
//! ```rust
//! use cloudplane::{ConfigError, EndpointUrl};
//!
//! let result = EndpointUrl::new("not a url");
//! assert!(matches!(result, Err(ConfigError::InvalidEndpoint { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while building SDK configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The endpoint URL is invalid.
    #[error("Invalid endpoint URL '{url}'. Please provide an absolute http(s) URL (e.g., 'https://compute.example.com/v2.1').")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The microversion string is invalid.
    #[error("Invalid microversion '{version}'. Expected format: 'MAJOR.MINOR' (e.g., '1.38') or 'latest'.")]
    InvalidMicroversion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// A default header was configured with an empty name.
    #[error("Default header names cannot be empty.")]
    EmptyHeaderName,

    /// A microversion was configured without the service type that names its header.
    #[error("Microversion {version} needs a service type to be sent. Set service_type alongside microversion.")]
    MicroversionWithoutServiceType {
        /// The configured microversion.
        version: String,
    },
}
