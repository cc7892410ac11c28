//! Test case identifiers of the form `TC-<section>-<seq>`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Regex fragment matching a TCID, shared by the extractor and the document parser
pub const TCID_PATTERN: &str = r"TC-\d+\.\d+(?:\.\d+)?-\d+";

static TCID_EXACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^TC-(\d+\.\d+(?:\.\d+)?)-(\d+)$").expect("TCID regex is valid")
});

/// A test case identifier such as `TC-4.1.1-001`
///
/// The section is a dot-separated numeric path with two or three components.
/// The sequence keeps its original digits so that `001` round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tcid {
    section: Vec<u32>,
    seq: String,
}

impl Tcid {
    /// Section components, e.g. `[4, 1, 1]` for `TC-4.1.1-001`
    pub fn components(&self) -> &[u32] {
        &self.section
    }

    fn full_section(&self) -> String {
        join_components(&self.section)
    }
}

fn join_components(parts: &[u32]) -> String {
    parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

impl fmt::Display for Tcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TC-{}-{}", self.full_section(), self.seq)
    }
}

impl FromStr for Tcid {
    type Err = TcidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TCID_EXACT
            .captures(s)
            .ok_or_else(|| TcidParseError::Malformed(s.to_string()))?;

        let section = caps[1]
            .split('.')
            .map(|p| {
                p.parse::<u32>()
                    .map_err(|_| TcidParseError::Malformed(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            section,
            seq: caps[2].to_string(),
        })
    }
}

impl Serialize for Tcid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Tcid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors from parsing a TCID
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TcidParseError {
    #[error("malformed test case id '{0}' (expected TC-<n>.<n>[.<n>]-<seq>)")]
    Malformed(String),
}
