//! Parser for serialized deployment specifications
//!
//! Accepts JSON or YAML in any supported wire generation. Every document is
//! validated against the schema of the version it declares before it is
//! deserialized and upgraded.

use crate::error::{Error, Result};
use crate::loader::types::VersionedSpec;
use crate::schema;
use crate::spec::DeploymentSpec;
use crate::types::{JsonValue, SpecVersion};
use std::fs;
use std::path::Path;

const SPEC_VERSION_POINTER: &str = "/definition/metadata/spec_version";

/// Load and upgrade a specification from a `.json`, `.yaml` or `.yml` file
///
/// # Examples
///
/// ```ignore
/// let spec = load_spec("./deploy/spec.json")?;
/// spec.build_dag()?;
/// ```
pub fn load_spec(path: impl AsRef<Path>) -> Result<DeploymentSpec> {
    load_spec_from_value(read_document(path)?)
}

/// Read a JSON or YAML document from disk without interpreting it
pub fn read_document(path: impl AsRef<Path>) -> Result<JsonValue> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    parse_document(&content)
}

/// Load and upgrade a specification from a JSON or YAML string
pub fn load_spec_from_str(content: &str) -> Result<DeploymentSpec> {
    load_spec_from_value(parse_document(content)?)
}

/// Load and upgrade a specification from JSON bytes
pub fn load_spec_from_slice(data: &[u8]) -> Result<DeploymentSpec> {
    load_spec_from_value(serde_json::from_slice(data)?)
}

/// Validate and upgrade an already-parsed document
pub fn load_spec_from_value(value: JsonValue) -> Result<DeploymentSpec> {
    Ok(parse_versioned(value)?.upgrade())
}

/// Validate a document and deserialize it as the generation it declares
pub fn parse_versioned(value: JsonValue) -> Result<VersionedSpec> {
    let version = match detect_spec_version(&value) {
        Ok(version) => version,
        Err(err @ Error::MissingField { .. }) => {
            // Report the structural problem when the document is malformed
            schema::validate_value(&value, SpecVersion::LATEST)?;
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    schema::validate_value(&value, version)?;
    VersionedSpec::from_value(value, version)
}

/// Read the version a document declares
pub fn detect_spec_version(value: &JsonValue) -> Result<SpecVersion> {
    value
        .pointer(SPEC_VERSION_POINTER)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::missing_field("definition.metadata.spec_version"))?
        .parse()
}

/// Parse JSON, falling back to YAML
fn parse_document(content: &str) -> Result<JsonValue> {
    if content.trim_start().starts_with('{') {
        return Ok(serde_json::from_str(content)?);
    }
    Ok(serde_yaml::from_str(content)?)
}
