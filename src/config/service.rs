//! Service type catalogue and microversion header selection.

use std::fmt;

use crate::config::Microversion;

/// Generic microversion header understood by every typed service.
pub const MICROVERSION_HEADER: &str = "OpenStack-API-Version";

/// The kind of service an endpoint belongs to.
///
/// The service type decides which headers carry the microversion: some
/// services predate the generic `OpenStack-API-Version` header and still
/// expect their own legacy header as well.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ServiceType {
    /// Compute (servers, flavors).
    Compute,
    /// Block storage volumes.
    Volume,
    /// Bare metal nodes.
    Baremetal,
    /// Bare metal hardware introspection.
    BaremetalIntrospection,
    /// Shared file systems.
    SharedFileSystem,
    /// Container orchestration engine clusters.
    ContainerInfra,
    /// Placement inventories and allocations.
    Placement,
    /// Object storage containers and objects.
    ObjectStore,
    /// Images.
    Image,
    /// Networking.
    Network,
    /// Identity (tokens, projects).
    Identity,
    /// Any other catalog type, sent verbatim.
    Other(String),
}

impl ServiceType {
    /// Returns the catalog name of this service type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Compute => "compute",
            Self::Volume => "volume",
            Self::Baremetal => "baremetal",
            Self::BaremetalIntrospection => "baremetal-introspection",
            Self::SharedFileSystem => "sharev2",
            Self::ContainerInfra => "container-infra",
            Self::Placement => "placement",
            Self::ObjectStore => "object-store",
            Self::Image => "image",
            Self::Network => "network",
            Self::Identity => "identity",
            Self::Other(name) => name,
        }
    }

    /// Returns the service-specific legacy microversion header, if any.
    #[must_use]
    pub const fn legacy_microversion_header(&self) -> Option<&'static str> {
        match self {
            Self::Compute => Some("X-OpenStack-Nova-API-Version"),
            Self::Volume => Some("X-OpenStack-Volume-API-Version"),
            Self::Baremetal => Some("X-OpenStack-Ironic-API-Version"),
            Self::BaremetalIntrospection => Some("X-OpenStack-Ironic-Inspector-API-Version"),
            Self::SharedFileSystem => Some("X-OpenStack-Manila-API-Version"),
            _ => None,
        }
    }

    /// Returns every header needed to request `version` from this service.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cloudplane::{Microversion, ServiceType};
    ///
    /// let headers = ServiceType::Baremetal.microversion_headers(Microversion::new(1, 38));
    /// assert!(headers.contains(&("X-OpenStack-Ironic-API-Version", "1.38".to_string())));
    /// assert!(headers.contains(&("OpenStack-API-Version", "baremetal 1.38".to_string())));
    /// ```
    #[must_use]
    pub fn microversion_headers(&self, version: Microversion) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(legacy) = self.legacy_microversion_header() {
            headers.push((legacy, version.to_string()));
        }
        headers.push((MICROVERSION_HEADER, format!("{} {version}", self.as_str())));
        headers
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
