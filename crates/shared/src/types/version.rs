//! Accounting server API revisions.
//!
//! The server changed the shape of its JSON several times. Each revision the
//! client understands gets a variant here; `Auto` and `Html` are sentinels
//! stored in profiles that have not been probed yet or that predate the JSON
//! API. Variants are declared in capability order so `Ord` compares them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server API revision used to pick a wire dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiVersion {
    /// Not probed yet; must be resolved before decoding.
    #[serde(rename = "auto")]
    Auto,
    /// Legacy HTML scraping; no JSON dialect.
    #[serde(rename = "html")]
    Html,
    /// Server 1.14.
    #[serde(rename = "1.14", alias = "v1_14")]
    V1_14,
    /// Server 1.15 to 1.19.0.
    #[serde(rename = "1.15", alias = "v1_15")]
    V1_15,
    /// Server 1.19.1 to 1.22.
    #[serde(rename = "1.19.1", alias = "v1_19_1")]
    V1_19_1,
    /// Server 1.23 to 1.31.
    #[serde(rename = "1.23", alias = "v1_23")]
    V1_23,
    /// Server 1.32 to 1.39.
    #[serde(rename = "1.32", alias = "v1_32")]
    V1_32,
    /// Server 1.40 to 1.49.
    #[serde(rename = "1.40", alias = "v1_40")]
    V1_40,
    /// Server 1.50 and newer.
    #[serde(rename = "1.50", alias = "v1_50")]
    V1_50,
}

/// Error returned when a version tag cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown API version: {0}")]
pub struct ParseApiVersionError(pub String);

impl ApiVersion {
    /// Every JSON revision, oldest first.
    pub const JSON_VERSIONS: [Self; 7] = [
        Self::V1_14,
        Self::V1_15,
        Self::V1_19_1,
        Self::V1_23,
        Self::V1_32,
        Self::V1_40,
        Self::V1_50,
    ];

    /// The newest revision; the only one transactions are posted with.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V1_50
    }

    /// Returns true for revisions that speak JSON.
    #[must_use]
    pub const fn is_json(self) -> bool {
        !matches!(self, Self::Auto | Self::Html)
    }

    /// Returns true if transactions can be encoded for this revision.
    #[must_use]
    pub const fn supports_posting(self) -> bool {
        matches!(self, Self::V1_50)
    }

    /// Short tag used in configuration files and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Html => "html",
            Self::V1_14 => "1.14",
            Self::V1_15 => "1.15",
            Self::V1_19_1 => "1.19.1",
            Self::V1_23 => "1.23",
            Self::V1_32 => "1.32",
            Self::V1_40 => "1.40",
            Self::V1_50 => "1.50",
        }
    }

    /// Picks the newest revision a probed server version can speak.
    ///
    /// Returns `None` for servers older than the first JSON API.
    #[must_use]
    pub fn for_server_version(major: u32, minor: u32, patch: u32) -> Option<Self> {
        if major > 1 {
            return Some(Self::V1_50);
        }
        if major < 1 {
            return None;
        }
        let version = match (minor, patch) {
            (50.., _) => Self::V1_50,
            (40..=49, _) => Self::V1_40,
            (32..=39, _) => Self::V1_32,
            (23..=31, _) => Self::V1_23,
            (20..=22, _) | (19, 1..) => Self::V1_19_1,
            (15..=19, _) => Self::V1_15,
            (14, _) => Self::V1_14,
            _ => return None,
        };
        Some(version)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let normalized = normalized.trim_start_matches('v').replace('_', ".");
        match normalized.as_str() {
            "auto" => Ok(Self::Auto),
            "html" => Ok(Self::Html),
            "1.14" => Ok(Self::V1_14),
            "1.15" => Ok(Self::V1_15),
            "1.19.1" => Ok(Self::V1_19_1),
            "1.23" => Ok(Self::V1_23),
            "1.32" => Ok(Self::V1_32),
            "1.40" => Ok(Self::V1_40),
            "1.50" => Ok(Self::V1_50),
            _ => Err(ParseApiVersionError(s.to_string())),
        }
    }
}
