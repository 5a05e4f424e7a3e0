//! Wire generations of the deployment specification
//!
//! Older generations are modelled as their own structs and converted into the
//! canonical entity model by [`VersionedSpec::upgrade`].

use crate::error::Result;
use crate::spec::{Connector, Definition, DeploymentSpec, Function, Stream};
use crate::types::{new_id, Direction, JsonValue, SpecVersion, StringMap, ValueMap};
use serde::{Deserialize, Serialize};

// ============================================================================
// 0.1.1
// ============================================================================

/// `0.1.1` connector: `id`/`type`/`resource`/`collection`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorV1 {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Direction,
    pub resource: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default, skip_serializing_if = "ValueMap::is_empty")]
    pub config: ValueMap,
}

/// `0.1.1` function with environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionV1 {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "StringMap::is_empty")]
    pub env_vars: StringMap,
}

/// `0.1.1` stream; either endpoint may still be unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamV1 {
    #[serde(default)]
    pub from_id: String,
    #[serde(default)]
    pub to_id: String,
}

/// `0.1.1` specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecV1 {
    #[serde(default)]
    pub secrets: StringMap,
    pub connectors: Vec<ConnectorV1>,
    #[serde(default)]
    pub functions: Vec<FunctionV1>,
    #[serde(default)]
    pub streams: Vec<StreamV1>,
    pub definition: Definition,
}

// ============================================================================
// 0.3.0
// ============================================================================

/// `0.3.0` connector keyed by collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorV2 {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub collection: String,
    pub plugin_type: Direction,
    pub plugin_name: String,
    #[serde(default, skip_serializing_if = "ValueMap::is_empty")]
    pub plugin_config: ValueMap,
}

/// `0.3.0` function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionV2 {
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// `0.3.0` specification; streams already use the canonical shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecV2 {
    #[serde(default)]
    pub secrets: StringMap,
    pub connectors: Vec<ConnectorV2>,
    #[serde(default)]
    pub functions: Vec<FunctionV2>,
    #[serde(default, alias = "stream")]
    pub streams: Vec<Stream>,
    pub definition: Definition,
}

// ============================================================================
// Versioned Spec
// ============================================================================

/// A specification in the wire generation it declared
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedSpec {
    V0_1_1(SpecV1),
    V0_3_0(SpecV2),
    V3(DeploymentSpec),
}

impl VersionedSpec {
    /// Deserialize a document as the given generation
    pub fn from_value(value: JsonValue, version: SpecVersion) -> Result<Self> {
        Ok(match version {
            SpecVersion::V0_1_1 => Self::V0_1_1(serde_json::from_value(value)?),
            SpecVersion::V0_3_0 => Self::V0_3_0(serde_json::from_value(value)?),
            SpecVersion::V3 => Self::V3(serde_json::from_value(value)?),
        })
    }

    /// Generation this document was written in
    pub fn version(&self) -> SpecVersion {
        match self {
            Self::V0_1_1(_) => SpecVersion::V0_1_1,
            Self::V0_3_0(_) => SpecVersion::V0_3_0,
            Self::V3(_) => SpecVersion::V3,
        }
    }

    /// Convert into the canonical entity model
    ///
    /// Missing ids are generated, streams with an unset endpoint are dropped,
    /// and the result declares the latest spec version.
    pub fn upgrade(self) -> DeploymentSpec {
        let mut spec = match self {
            Self::V0_1_1(legacy) => upgrade_v1(legacy),
            Self::V0_3_0(legacy) => upgrade_v2(legacy),
            Self::V3(spec) => spec,
        };

        for connector in &mut spec.connectors {
            fill_id(&mut connector.uuid);
        }
        for function in &mut spec.functions {
            fill_id(&mut function.uuid);
        }
        spec.streams
            .retain(|s| !s.from_uuid.is_empty() && !s.to_uuid.is_empty());
        for stream in &mut spec.streams {
            fill_id(&mut stream.uuid);
            if stream.name.is_empty() {
                stream.name = stream.default_name();
            }
        }
        spec.definition.metadata.spec_version = SpecVersion::LATEST.as_str().to_string();
        spec
    }
}

fn upgrade_v1(legacy: SpecV1) -> DeploymentSpec {
    let mut spec = DeploymentSpec::new(legacy.definition);
    spec.secrets = legacy.secrets;
    spec.connectors = legacy
        .connectors
        .into_iter()
        .map(|c| {
            let name = legacy_name(&c.collection, &c.resource);
            Connector {
                uuid: c.id,
                name,
                plugin_type: c.kind,
                plugin_name: c.resource,
                plugin_config: flatten_config(c.collection, c.config),
            }
        })
        .collect();
    spec.functions = legacy
        .functions
        .into_iter()
        .map(|f| Function {
            uuid: f.id,
            name: f.name,
            image: f.image,
            config: f
                .env_vars
                .into_iter()
                .map(|(k, v)| (k, JsonValue::String(v)))
                .collect(),
        })
        .collect();
    spec.streams = legacy
        .streams
        .into_iter()
        .map(|s| Stream::new(s.from_id, s.to_id))
        .collect();
    spec
}

fn upgrade_v2(legacy: SpecV2) -> DeploymentSpec {
    let mut spec = DeploymentSpec::new(legacy.definition);
    spec.secrets = legacy.secrets;
    spec.connectors = legacy
        .connectors
        .into_iter()
        .map(|c| {
            let name = legacy_name(&c.collection, &c.plugin_name);
            Connector {
                uuid: c.uuid,
                name,
                plugin_type: c.plugin_type,
                plugin_name: c.plugin_name,
                plugin_config: flatten_config(c.collection, c.plugin_config),
            }
        })
        .collect();
    spec.functions = legacy
        .functions
        .into_iter()
        .map(|f| Function::new(f.name).with_uuid(f.uuid).with_image(f.image))
        .collect();
    spec.streams = legacy.streams;
    spec
}

fn legacy_name(collection: &str, fallback: &str) -> String {
    if collection.is_empty() {
        fallback.to_string()
    } else {
        collection.to_string()
    }
}

/// Fold the collection and a loosely typed config into a string map
fn flatten_config(collection: String, config: ValueMap) -> StringMap {
    let mut flat: StringMap = config
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();
    if !collection.is_empty() {
        flat.insert("collection".to_string(), collection);
    }
    flat
}

fn fill_id(id: &mut String) {
    if id.is_empty() {
        *id = new_id();
    }
}
