use crate::error::{ReleaseError, Result};
use std::fmt;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a release variable value (e.g., "1.2.3" or "v1.2.3")
    ///
    /// Only plain `X.Y.Z` is accepted; pre-release and build metadata are rejected.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let clean = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

        let parsed = semver::Version::parse(clean).map_err(|e| {
            ReleaseError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z ({})",
                value, e
            ))
        })?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaseError::version(format!(
                "Invalid version format: '{}' - pre-release and build metadata are not supported",
                value
            )));
        }

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
        })
    }

    /// Bump version according to bump type
    ///
    /// Fails when the bumped component would overflow.
    pub fn bump(&self, bump_type: &VersionBump) -> Result<Self> {
        let overflow = || {
            ReleaseError::version(format!(
                "Cannot apply a {} bump to {}: component out of range",
                bump_type, self
            ))
        };

        let next = match bump_type {
            VersionBump::Major => Version {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            VersionBump::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            VersionBump::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        };
        Ok(next)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        };
        f.write_str(name)
    }
}
