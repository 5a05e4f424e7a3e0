//! Tests for the versioned spec loader

use super::*;
use crate::error::Error;
use crate::types::{Direction, Language, SpecVersion};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn definition(version: &str) -> serde_json::Value {
    json!({
        "git_sha": "3630e05a",
        "metadata": {
            "turbine": {"language": "golang", "version": "0.19"},
            "spec_version": version
        }
    })
}

fn legacy_v1() -> serde_json::Value {
    json!({
        "connectors": [
            {"id": "src", "type": "source", "resource": "pg", "collection": "accounts",
             "config": {"batch": 10, "mode": "cdc"}},
            {"id": "dst", "type": "destination", "resource": "s3", "collection": "accounts_copy"}
        ],
        "functions": [
            {"id": "fn", "name": "enrich", "image": "img:1", "env_vars": {"KEY": "value"}}
        ],
        "streams": [
            {"from_id": "src", "to_id": "fn"},
            {"from_id": "fn", "to_id": "dst"},
            {"from_id": "dst", "to_id": ""}
        ],
        "definition": definition("0.1.1")
    })
}

// ============================================================================
// Version Detection
// ============================================================================

#[test]
fn test_detect_spec_version() {
    assert_eq!(detect_spec_version(&json!({"definition": definition("0.3.0")})).unwrap(), SpecVersion::V0_3_0);

    let err = detect_spec_version(&json!({"definition": definition("1.0")})).unwrap_err();
    assert!(matches!(err, Error::UnsupportedSpecVersion { .. }));

    let err = detect_spec_version(&json!({})).unwrap_err();
    assert!(matches!(err, Error::MissingField { .. }));
}

#[test]
fn test_missing_version_reports_schema_error() {
    let err = load_spec_from_value(json!({})).unwrap_err();
    assert!(err
        .to_string()
        .contains("missing properties: 'connectors', 'definition'"));
}

// ============================================================================
// Upgrade Tests
// ============================================================================

#[test]
fn test_upgrade_0_1_1() {
    let versioned = parse_versioned(legacy_v1()).unwrap();
    assert_eq!(versioned.version(), SpecVersion::V0_1_1);

    let spec = versioned.upgrade();
    assert_eq!(spec.spec_version(), "v3");
    assert_eq!(spec.connectors.len(), 2);

    let source = &spec.connectors[0];
    assert_eq!(source.uuid, "src");
    assert_eq!(source.name, "accounts");
    assert_eq!(source.plugin_type, Direction::Source);
    assert_eq!(source.plugin_name, "pg");
    assert_eq!(source.plugin_config.get("collection").map(String::as_str), Some("accounts"));
    assert_eq!(source.plugin_config.get("batch").map(String::as_str), Some("10"));
    assert_eq!(source.plugin_config.get("mode").map(String::as_str), Some("cdc"));

    assert_eq!(spec.functions[0].uuid, "fn");
    assert_eq!(spec.functions[0].config["KEY"], json!("value"));

    // The dangling stream is dropped
    assert_eq!(spec.streams.len(), 2);
    assert_eq!(spec.streams[0].name, "src_fn");
    assert!(!spec.streams[0].uuid.is_empty());

    assert!(spec.build_dag().is_ok());
}

#[test]
fn test_upgrade_0_3_0() {
    let raw = json!({
        "connectors": [
            {"collection": "users", "plugin_type": "source", "plugin_name": "builtin:pg"},
            {"uuid": "d", "collection": "users_copy", "plugin_type": "destination",
             "plugin_name": "builtin:s3", "plugin_config": {"region": "eu"}}
        ],
        "stream": [],
        "definition": definition("0.3.0")
    });

    let spec = load_spec_from_value(raw).unwrap();
    assert_eq!(spec.connectors[0].uuid.len(), 36);
    assert_eq!(spec.connectors[0].name, "users");
    assert_eq!(spec.connectors[1].uuid, "d");
    assert_eq!(spec.connectors[1].plugin_config.get("region").map(String::as_str), Some("eu"));
    assert_eq!(spec.parsed_spec_version().unwrap(), SpecVersion::V3);
}

#[test]
fn test_v3_is_loaded_unchanged() {
    let raw = json!({
        "connectors": [{"uuid": "a", "name": "src", "plugin_type": "source", "plugin_name": "pg"}],
        "definition": {
            "git_sha": "sha",
            "metadata": {"turbine": {"language": "py", "version": "1"}, "spec_version": "v3"}
        }
    });

    let spec = load_spec_from_slice(raw.to_string().as_bytes()).unwrap();
    assert_eq!(spec.connectors[0].uuid, "a");
    assert_eq!(spec.definition.metadata.turbine.language, Language::Python);
}

#[test]
fn test_schema_runs_before_deserialization() {
    let mut raw = legacy_v1();
    raw["connectors"][0]["type"] = json!("sideways");

    let err = load_spec_from_value(raw).unwrap_err();
    assert!(matches!(err, Error::SchemaValidation { ref path, .. } if path == "/connectors/0/type"));
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn test_load_spec_from_yaml_string() {
    let yaml = r#"
connectors:
  - uuid: src
    name: pg
    plugin_type: source
    plugin_name: builtin:postgres
definition:
  git_sha: abc
  metadata:
    turbine:
      language: ruby
      version: "2.1"
    spec_version: v3
"#;

    let spec = load_spec_from_str(yaml).unwrap();
    assert_eq!(spec.connectors[0].plugin_name, "builtin:postgres");
    assert_eq!(spec.definition.metadata.turbine.version, "2.1");
}

#[test]
fn test_load_spec_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(legacy_v1().to_string().as_bytes()).unwrap();

    let spec = load_spec(file.path()).unwrap();
    assert_eq!(spec.functions.len(), 1);
}

#[test]
fn test_load_spec_missing_file() {
    let err = load_spec("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}
