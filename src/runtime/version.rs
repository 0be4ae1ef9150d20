//! Runtime version triples.
//!
//! A [`VersionTriple`] is compared for exact equality only. There is
//! deliberately no ordering: 3.9.14 is as wrong as 3.11.0 when 3.9.13 is
//! required.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static RE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap());

/// A `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the first `X.Y.Z` occurrence from interpreter output.
    ///
    /// Returns `None` when nothing matches or a component overflows `u32`.
    pub fn parse_from_output(output: &str) -> Option<Self> {
        let caps = RE_VERSION.captures(output)?;
        let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        Some(Self::new(part(1)?, part(2)?, part(3)?))
    }

    /// The `X.Y` form used by the `py` selector and install directory names.
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTriple {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(format!("expected MAJOR.MINOR.PATCH, got '{s}'"));
        }
        let parse = |p: &str| {
            p.parse::<u32>()
                .map_err(|_| format!("invalid version component '{p}' in '{s}'"))
        };
        Ok(Self::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

impl TryFrom<String> for VersionTriple {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionTriple> for String {
    fn from(value: VersionTriple) -> Self {
        value.to_string()
    }
}
