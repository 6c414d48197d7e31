//! API version type and parsing
//!
//! Versions are two-part (`major.minor`) discriminators used to pick between
//! handler implementations of the same logical route.

use super::error::VersionParseError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// API version
///
/// Supports formats like:
/// - `1`, `2` (major only, minor defaults to 0)
/// - `1.0`, `2.1` (major.minor)
/// - `v1`, `v1.0`, `V2.0` (with a `v` prefix, as carried by URL segments)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiVersion {
    /// Major version number
    pub major: u32,
    /// Minor version number
    pub minor: u32,
}

impl ApiVersion {
    /// Create a new version
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Create a version with only a major number
    pub const fn major(major: u32) -> Self {
        Self::new(major, 0)
    }

    /// Version 1.0
    pub const fn v1() -> Self {
        Self::new(1, 0)
    }

    /// Version 2.0
    pub const fn v2() -> Self {
        Self::new(2, 0)
    }

    /// Group name in the `'v'VVV` format: the minor part is omitted when it
    /// is zero (`v1`, `v1.5`).
    pub fn group_name(&self) -> String {
        if self.minor == 0 {
            format!("v{}", self.major)
        } else {
            format!("v{}.{}", self.major, self.minor)
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::v1()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix('v')
            .or_else(|| s.strip_prefix('V'))
            .unwrap_or(s);

        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut parts = s.split('.');
        let major = parse_component(parts.next())?;
        let minor = match parts.next() {
            Some(part) => parse_component(Some(part))?,
            None => 0,
        };

        if parts.next().is_some() {
            return Err(VersionParseError::InvalidFormat);
        }

        Ok(ApiVersion::new(major, minor))
    }
}

fn parse_component(part: Option<&str>) -> Result<u32, VersionParseError> {
    match part {
        Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => {
            p.parse().map_err(|_| VersionParseError::InvalidNumber)
        }
        _ => Err(VersionParseError::InvalidNumber),
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("1".parse::<ApiVersion>().unwrap(), ApiVersion::major(1));
        assert_eq!("v1".parse::<ApiVersion>().unwrap(), ApiVersion::major(1));
        assert_eq!("1.0".parse::<ApiVersion>().unwrap(), ApiVersion::v1());
        assert_eq!("v2.0".parse::<ApiVersion>().unwrap(), ApiVersion::v2());
        assert_eq!("V2".parse::<ApiVersion>().unwrap(), ApiVersion::v2());
        assert_eq!(" 1.5 ".parse::<ApiVersion>().unwrap(), ApiVersion::new(1, 5));
    }

    #[test]
    fn test_version_parsing_errors() {
        assert_eq!("".parse::<ApiVersion>(), Err(VersionParseError::Empty));
        assert_eq!("v".parse::<ApiVersion>(), Err(VersionParseError::Empty));
        assert_eq!("x".parse::<ApiVersion>(), Err(VersionParseError::InvalidNumber));
        assert_eq!("1.".parse::<ApiVersion>(), Err(VersionParseError::InvalidNumber));
        assert_eq!("+1".parse::<ApiVersion>(), Err(VersionParseError::InvalidNumber));
        assert_eq!("1.2.3".parse::<ApiVersion>(), Err(VersionParseError::InvalidFormat));
    }

    #[test]
    fn test_version_comparison() {
        assert!(ApiVersion::new(2, 0) > ApiVersion::new(1, 0));
        assert!(ApiVersion::new(1, 1) > ApiVersion::new(1, 0));
        assert!(ApiVersion::new(1, 10) > ApiVersion::new(1, 9));
        assert_eq!(ApiVersion::new(1, 0), ApiVersion::major(1));
    }

    #[test]
    fn test_group_name() {
        assert_eq!(ApiVersion::v1().group_name(), "v1");
        assert_eq!(ApiVersion::v2().group_name(), "v2");
        assert_eq!(ApiVersion::new(1, 5).group_name(), "v1.5");
    }

    #[test]
    fn test_version_display() {
        assert_eq!(ApiVersion::v1().to_string(), "1.0");
        assert_eq!(ApiVersion::new(2, 1).to_string(), "2.1");
    }
}
