//! Common types used throughout flowspec
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Ordered key-value map with string keys and values
pub type StringMap = BTreeMap<String, String>;

/// Ordered key-value map with string keys and JSON values
pub type ValueMap = BTreeMap<String, JsonValue>;

// ============================================================================
// Connector Direction
// ============================================================================

/// Role of a connector in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Records are read from this connector
    Source,
    /// Records are written to this connector
    Destination,
}

impl Direction {
    /// Wire name of the direction
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Source => "source",
            Direction::Destination => "destination",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Language
// ============================================================================

/// Language of the application that declared the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "go")]
    Golang,
    #[serde(alias = "js")]
    Javascript,
    Nodejs,
    #[serde(alias = "py")]
    Python,
    Python3,
    #[serde(alias = "rb")]
    Ruby,
}

impl Language {
    /// Canonical wire name of the language
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Golang => "golang",
            Language::Javascript => "javascript",
            Language::Nodejs => "nodejs",
            Language::Python => "python",
            Language::Python3 => "python3",
            Language::Ruby => "ruby",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "golang" | "go" => Ok(Language::Golang),
            "javascript" | "js" => Ok(Language::Javascript),
            "nodejs" => Ok(Language::Nodejs),
            "python" | "py" => Ok(Language::Python),
            "python3" => Ok(Language::Python3),
            "ruby" | "rb" => Ok(Language::Ruby),
            _ => Err(Error::UnsupportedLanguage {
                language: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Spec Version
// ============================================================================

/// A `spec_version` this crate can validate and load
///
/// Each version pins a wire generation and a JSON Schema. `V3` is the shape of
/// the canonical entity model; older generations are upgraded on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecVersion {
    /// `0.1.1`: `id`/`type`/`resource`/`collection` connectors
    V0_1_1,
    /// `0.3.0`: `uuid`/`plugin_type`/`plugin_name` connectors keyed by collection
    V0_3_0,
    /// `v3`: named connectors with a plugin config map
    V3,
}

impl SpecVersion {
    /// All supported versions, oldest first
    pub const ALL: [SpecVersion; 3] = [SpecVersion::V0_1_1, SpecVersion::V0_3_0, SpecVersion::V3];

    /// Version stamped on every specification produced by this crate
    pub const LATEST: SpecVersion = SpecVersion::V3;

    /// Wire string of the version
    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V0_1_1 => "0.1.1",
            SpecVersion::V0_3_0 => "0.3.0",
            SpecVersion::V3 => "v3",
        }
    }

    /// Whether this is the canonical (non-legacy) generation
    pub fn is_latest(self) -> bool {
        self == Self::LATEST
    }
}

impl FromStr for SpecVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| Error::unsupported_version(s))
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SpecVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SpecVersion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Identifiers
// ============================================================================

/// Generate a fresh unique identifier for an entity
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
