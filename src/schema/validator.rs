//! Schema validator implementation
//!
//! One JSON Schema document is embedded per supported `spec_version`. Each
//! is compiled on first use and cached for the life of the process.

use crate::error::{Error, Result};
use crate::types::{JsonValue, SpecVersion};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use once_cell::sync::OnceCell;

const SCHEMA_0_1_1: &str = include_str!("specs/0.1.1.json");
const SCHEMA_0_3_0: &str = include_str!("specs/0.3.0.json");
const SCHEMA_V3: &str = include_str!("specs/v3.json");

static VALIDATOR_0_1_1: OnceCell<Validator> = OnceCell::new();
static VALIDATOR_0_3_0: OnceCell<Validator> = OnceCell::new();
static VALIDATOR_V3: OnceCell<Validator> = OnceCell::new();

/// Raw JSON Schema document registered for a version
pub fn schema_document(version: SpecVersion) -> &'static str {
    match version {
        SpecVersion::V0_1_1 => SCHEMA_0_1_1,
        SpecVersion::V0_3_0 => SCHEMA_0_3_0,
        SpecVersion::V3 => SCHEMA_V3,
    }
}

fn validator(version: SpecVersion) -> Result<&'static Validator> {
    let cell = match version {
        SpecVersion::V0_1_1 => &VALIDATOR_0_1_1,
        SpecVersion::V0_3_0 => &VALIDATOR_0_3_0,
        SpecVersion::V3 => &VALIDATOR_V3,
    };
    cell.get_or_try_init(|| compile(version))
}

fn compile(version: SpecVersion) -> Result<Validator> {
    let compile_error = |message: String| Error::SchemaCompile {
        version: version.to_string(),
        message,
    };

    let schema: JsonValue =
        serde_json::from_str(schema_document(version)).map_err(|e| compile_error(e.to_string()))?;
    jsonschema::validator_for(&schema).map_err(|e| compile_error(e.to_string()))
}

/// Validate serialized bytes against the schema of a claimed version
///
/// An unrecognized version is rejected before any schema is compiled.
pub fn validate_spec(data: &[u8], spec_version: &str) -> Result<()> {
    let version: SpecVersion = spec_version.parse()?;
    let instance: JsonValue = serde_json::from_slice(data)?;
    validate_value(&instance, version)
}

/// Validate a parsed document against the schema of a version
///
/// Reports the first failing rule. Missing required properties of the same
/// object are reported together, in the order the schema lists them.
pub fn validate_value(instance: &JsonValue, version: SpecVersion) -> Result<()> {
    let validator = validator(version)?;
    let mut errors = validator.iter_errors(instance);
    let Some(first) = errors.next() else {
        return Ok(());
    };

    let path = first.instance_path.to_string();
    let rule = first.schema_path.to_string();
    let message = match &first.kind {
        ValidationErrorKind::Required { property } => {
            let mut missing = vec![quote_property(property)];
            missing.extend(
                errors
                    .filter(|e| same_location(e, &path, &rule))
                    .filter_map(|e| match &e.kind {
                        ValidationErrorKind::Required { property } => Some(quote_property(property)),
                        _ => None,
                    }),
            );
            format!("missing properties: {}", missing.join(", "))
        }
        ValidationErrorKind::Enum { options } => {
            format!("value must be one of {}", join_options(options))
        }
        _ => first.to_string(),
    };

    Err(Error::SchemaValidation {
        path,
        rule,
        message,
    })
}

/// Whether a document satisfies the schema of a version
pub fn is_valid(instance: &JsonValue, version: SpecVersion) -> Result<bool> {
    Ok(validator(version)?.is_valid(instance))
}

fn same_location(error: &ValidationError<'_>, path: &str, rule: &str) -> bool {
    error.instance_path.to_string() == path && error.schema_path.to_string() == rule
}

fn quote_property(property: &JsonValue) -> String {
    match property.as_str() {
        Some(name) => format!("'{name}'"),
        None => format!("'{property}'"),
    }
}

fn join_options(options: &JsonValue) -> String {
    match options.as_array() {
        Some(values) => values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        None => options.to_string(),
    }
}
