//! Entity types
//!
//! Value objects for the pipeline topology and the `DeploymentSpec` aggregate
//! that owns them. Field names are the canonical (`v3`) wire names.

use crate::types::{Direction, JsonValue, Language, SpecVersion, StringMap, ValueMap};
use serde::{Deserialize, Serialize};

// ============================================================================
// Connector
// ============================================================================

/// A declared data endpoint, either a source or a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    /// Unique id; assigned by the builder when left empty
    #[serde(default)]
    pub uuid: String,
    /// Human name
    #[serde(default)]
    pub name: String,
    /// Source or destination
    pub plugin_type: Direction,
    /// Integration driver (e.g. `builtin:postgres@1.0.0`)
    pub plugin_name: String,
    /// Opaque driver configuration
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub plugin_config: StringMap,
}

impl Connector {
    /// Create a connector with the given direction
    pub fn new(
        plugin_type: Direction,
        name: impl Into<String>,
        plugin_name: impl Into<String>,
    ) -> Self {
        Self {
            uuid: String::new(),
            name: name.into(),
            plugin_type,
            plugin_name: plugin_name.into(),
            plugin_config: StringMap::new(),
        }
    }

    /// Create a source connector
    pub fn source(name: impl Into<String>, plugin_name: impl Into<String>) -> Self {
        Self::new(Direction::Source, name, plugin_name)
    }

    /// Create a destination connector
    pub fn destination(name: impl Into<String>, plugin_name: impl Into<String>) -> Self {
        Self::new(Direction::Destination, name, plugin_name)
    }

    /// Set an explicit id
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Add a plugin config entry
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.plugin_config.insert(key.into(), value.into());
        self
    }

    /// Whether this connector reads records
    pub fn is_source(&self) -> bool {
        self.plugin_type == Direction::Source
    }

    /// Whether this connector writes records
    pub fn is_destination(&self) -> bool {
        self.plugin_type == Direction::Destination
    }
}

// ============================================================================
// Function
// ============================================================================

/// A transform stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Unique id; assigned by the builder when left empty
    #[serde(default)]
    pub uuid: String,
    /// Function name
    pub name: String,
    /// Execution image, stamped once the application has been packaged
    #[serde(default)]
    pub image: String,
    /// Function configuration
    #[serde(default, skip_serializing_if = "ValueMap::is_empty")]
    pub config: ValueMap,
}

impl Function {
    /// Create a function with no image
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: String::new(),
            name: name.into(),
            image: String::new(),
            config: ValueMap::new(),
        }
    }

    /// Set an explicit id
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Set the execution image
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Add a config entry
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

// ============================================================================
// Stream
// ============================================================================

/// A directed edge between two nodes (connector or function ids)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Unique id; assigned by the builder when left empty
    #[serde(default)]
    pub uuid: String,
    /// Human name; defaults to `<from>_<to>`
    #[serde(default)]
    pub name: String,
    /// Upstream node id
    pub from_uuid: String,
    /// Downstream node id
    pub to_uuid: String,
}

impl Stream {
    /// Create a stream between two node ids
    pub fn new(from_uuid: impl Into<String>, to_uuid: impl Into<String>) -> Self {
        Self {
            uuid: String::new(),
            name: String::new(),
            from_uuid: from_uuid.into(),
            to_uuid: to_uuid.into(),
        }
    }

    /// Set an explicit id
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Set the human name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name used when none was declared
    pub fn default_name(&self) -> String {
        format!("{}_{}", self.from_uuid, self.to_uuid)
    }
}

// ============================================================================
// Definition
// ============================================================================

/// Top-level definition block: source revision and metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Source-control revision of the application
    pub git_sha: String,
    /// Declaring application and spec version
    pub metadata: Metadata,
}

impl Definition {
    /// Create a definition stamped with the latest spec version
    pub fn new(
        git_sha: impl Into<String>,
        language: Language,
        version: impl Into<String>,
    ) -> Self {
        Self {
            git_sha: git_sha.into(),
            metadata: Metadata {
                turbine: RuntimeInfo {
                    language,
                    version: version.into(),
                },
                spec_version: SpecVersion::LATEST.as_str().to_string(),
            },
        }
    }
}

/// Metadata about the declaring application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Language runtime that declared the pipeline
    pub turbine: RuntimeInfo,
    /// Shape version this specification declares
    pub spec_version: String,
}

/// Language and library version of the declaring application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// Application language
    pub language: Language,
    /// Library version used by the application
    pub version: String,
}

// ============================================================================
// Deployment Spec
// ============================================================================

/// The aggregate specification of a full pipeline topology
///
/// The flat lists are the serialization surface. The live graph over them is
/// owned by [`crate::builder::SpecBuilder`] and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Opaque secrets made available to the pipeline
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub secrets: StringMap,
    /// Sources and destinations
    #[serde(default)]
    pub connectors: Vec<Connector>,
    /// Transform stages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Function>,
    /// Edges between connectors and functions
    #[serde(default, alias = "stream", skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<Stream>,
    /// Revision and metadata
    pub definition: Definition,
}
