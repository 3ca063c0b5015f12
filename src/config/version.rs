//! Microversion definitions.
//!
//! This module provides the [`Microversion`] type used to select the server
//! behaviour (and therefore the response schema) of a versioned service.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A service microversion.
///
/// Microversions are `MAJOR.MINOR` pairs negotiated per request through a
/// dedicated header. The special value `latest` asks the server for the
/// newest version it supports and sorts after every numbered version.
///
/// # Example
///
/// ```rust
/// use cloudplane::Microversion;
///
/// let version: Microversion = "1.38".parse().unwrap();
/// assert_eq!(version, Microversion::new(1, 38));
/// assert_eq!(version.to_string(), "1.38");
///
/// assert!(Microversion::new(1, 38) < Microversion::new(1, 50));
/// assert!(Microversion::new(2, 0) < Microversion::Latest);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Microversion {
    /// A numbered `MAJOR.MINOR` microversion.
    Version {
        /// Major version component.
        major: u32,
        /// Minor version component.
        minor: u32,
    },
    /// The newest microversion the server supports.
    Latest,
}

impl Microversion {
    /// Creates a numbered microversion.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self::Version { major, minor }
    }

    /// Returns `true` if this is a numbered microversion at least `major.minor`.
    ///
    /// `Latest` always satisfies the requirement.
    #[must_use]
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        *self >= Self::new(major, minor)
    }
}

impl fmt::Display for Microversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version { major, minor } => write!(f, "{major}.{minor}"),
            Self::Latest => f.write_str("latest"),
        }
    }
}

impl FromStr for Microversion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "latest" {
            return Ok(Self::Latest);
        }

        let invalid = || ConfigError::InvalidMicroversion { version: s.clone() };
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        if major.is_empty()
            || minor.is_empty()
            || !major.chars().all(|c| c.is_ascii_digit())
            || !minor.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let major = major.parse().map_err(|_| invalid())?;
        let minor = minor.parse().map_err(|_| invalid())?;
        Ok(Self::new(major, minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microversion_parses_numbered_and_latest() {
        assert_eq!("2.1".parse::<Microversion>().unwrap(), Microversion::new(2, 1));
        assert_eq!(
            " 1.50 ".parse::<Microversion>().unwrap(),
            Microversion::new(1, 50)
        );
        assert_eq!(
            "LATEST".parse::<Microversion>().unwrap(),
            Microversion::Latest
        );
    }

    #[test]
    fn test_microversion_rejects_invalid() {
        assert!("".parse::<Microversion>().is_err());
        assert!("1".parse::<Microversion>().is_err());
        assert!("1.".parse::<Microversion>().is_err());
        assert!(".5".parse::<Microversion>().is_err());
        assert!("1.x".parse::<Microversion>().is_err());
        assert!("1.2.3".parse::<Microversion>().is_err());
        assert!("-1.2".parse::<Microversion>().is_err());
    }

    #[test]
    fn test_microversion_ordering_is_numeric() {
        // 1.9 < 1.10 even though "1.9" > "1.10" lexicographically
        assert!(Microversion::new(1, 9) < Microversion::new(1, 10));
        assert!(Microversion::new(1, 99) < Microversion::new(2, 0));
        assert!(Microversion::new(99, 99) < Microversion::Latest);
    }

    #[test]
    fn test_microversion_at_least() {
        let version = Microversion::new(1, 38);
        assert!(version.at_least(1, 38));
        assert!(version.at_least(1, 1));
        assert!(!version.at_least(1, 50));
        assert!(Microversion::Latest.at_least(9, 9));
    }

    #[test]
    fn test_microversion_display() {
        assert_eq!(Microversion::new(2, 79).to_string(), "2.79");
        assert_eq!(Microversion::Latest.to_string(), "latest");
    }
}
