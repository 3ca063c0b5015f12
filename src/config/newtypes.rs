//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated service endpoint URL.
///
/// The URL must be absolute and use the `http` or `https` scheme. It is
/// normalized to always end in `/` so that relative resource paths can be
/// appended with [`EndpointUrl::join`].
///
/// # Example
///
/// ```rust
/// use cloudplane::EndpointUrl;
///
/// let url = EndpointUrl::new("https://baremetal.example.com/v1").unwrap();
/// assert_eq!(url.as_ref(), "https://baremetal.example.com/v1/");
/// assert_eq!(url.join("nodes"), "https://baremetal.example.com/v1/nodes");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EndpointUrl {
    url: String,
}

impl EndpointUrl {
    /// Creates a new validated endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the URL has no `http`/`https`
    /// scheme or no host, or carries a query string or fragment.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let mut url = url.trim().to_string();
        let invalid = |url: &str| ConfigError::InvalidEndpoint {
            url: url.to_string(),
        };

        let scheme_end = url.find("://").ok_or_else(|| invalid(&url))?;
        let scheme = url[..scheme_end].to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(&url));
        }
        if url.contains(['?', '#']) {
            return Err(invalid(&url));
        }

        let host_start = scheme_end + 3;
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/'])
            .map_or(url.len(), |i| host_start + i);
        if host_end == host_start {
            return Err(invalid(&url));
        }

        if !url.ends_with('/') {
            url.push('/');
        }

        Ok(Self { url })
    }

    /// Appends a relative path to this endpoint.
    ///
    /// Leading slashes on `path` are ignored so that `"nodes"` and `"/nodes"`
    /// resolve to the same URL. An empty path yields the endpoint itself.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.url, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for EndpointUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for EndpointUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for EndpointUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_appends_trailing_slash() {
        let url = EndpointUrl::new("http://localhost:6385/v1").unwrap();
        assert_eq!(url.as_ref(), "http://localhost:6385/v1/");

        let url = EndpointUrl::new("https://object.example.com/v1/AUTH_abc/").unwrap();
        assert_eq!(url.as_ref(), "https://object.example.com/v1/AUTH_abc/");
    }

    #[test]
    fn test_endpoint_url_join_ignores_leading_slash() {
        let url = EndpointUrl::new("https://compute.example.com/v2.1").unwrap();
        assert_eq!(url.join("servers"), "https://compute.example.com/v2.1/servers");
        assert_eq!(url.join("/servers"), "https://compute.example.com/v2.1/servers");
        assert_eq!(url.join(""), "https://compute.example.com/v2.1/");
    }

    #[test]
    fn test_endpoint_url_rejects_invalid() {
        assert!(EndpointUrl::new("compute.example.com").is_err());
        assert!(EndpointUrl::new("ftp://compute.example.com").is_err());
        assert!(EndpointUrl::new("https://").is_err());
        assert!(EndpointUrl::new("https:///v1").is_err());
        assert!(EndpointUrl::new("https://example.com/v1?x=1").is_err());
    }

    #[test]
    fn test_endpoint_url_serde_round_trip() {
        let url = EndpointUrl::new("https://image.example.com").unwrap();
        let json = serde_json::to_string(&url).unwrap();
        assert_eq!(json, r#""https://image.example.com/""#);

        let restored: EndpointUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, url);

        let invalid: Result<EndpointUrl, _> = serde_json::from_str(r#""nope""#);
        assert!(invalid.is_err());
    }
}
