//! Schema version numbers.
//!
//! A [`SchemaVersion`] is written `<MAJOR>.<MINOR>` (for example `1.0` or
//! `2.10`). Ordering compares the major component and then the minor
//! component as integers, so `1.10` sorts after `1.9`.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A `<MAJOR>.<MINOR>` schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    major: u32,
    minor: u32,
}

impl SchemaVersion {
    /// Version assumed when the target has no persisted version record.
    pub const BASELINE: SchemaVersion = SchemaVersion { major: 1, minor: 0 };

    /// Build a version from its components
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Major component
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor component
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Parse a version string, trimming surrounding whitespace.
    pub fn parse(value: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidVersion {
            value: value.to_string(),
        };
        let (major, minor) = value.trim().split_once('.').ok_or_else(invalid)?;
        if !is_digits(major) || !is_digits(minor) {
            return Err(invalid());
        }
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for SchemaVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
