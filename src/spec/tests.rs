//! Tests for the entity model and its serialization

use super::*;
use crate::types::{Direction, Language};
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_spec() -> DeploymentSpec {
    let mut spec = DeploymentSpec::new(Definition::new("3630e05a", Language::Golang, "0.1.0"));
    spec.secrets.insert("API_KEY".to_string(), "token".to_string());
    spec.connectors.push(
        Connector::source("my-source", "builtin:postgres@1.0.0")
            .with_uuid("1")
            .with_config("collection", "accounts"),
    );
    spec.connectors.push(
        Connector::destination("my-destination", "builtin:postgres@1.0.0")
            .with_uuid("3")
            .with_config("collection", "accounts_copy"),
    );
    spec.functions.push(
        Function::new("enrich")
            .with_uuid("2")
            .with_image("ftorres/enrich:9")
            .with_config("CLEARBIT_API_KEY", json!("token-1")),
    );
    spec.streams
        .push(Stream::new("1", "2").with_uuid("1_2").with_name("1_2"));
    spec.streams
        .push(Stream::new("2", "3").with_uuid("2_3").with_name("2_3"));
    spec
}

// ============================================================================
// Serialization Tests
// ============================================================================

#[test]
fn test_round_trip() {
    let spec = sample_spec();
    let bytes = spec.marshal().unwrap();
    let decoded = DeploymentSpec::unmarshal(&bytes).unwrap();
    assert_eq!(decoded, spec);
}

#[test]
fn test_round_trip_minimal() {
    let spec = DeploymentSpec::new(Definition::new("sha", Language::Ruby, "0.1.0"));
    let decoded = DeploymentSpec::unmarshal(&spec.marshal().unwrap()).unwrap();
    assert_eq!(decoded, spec);
}

#[test]
fn test_wire_field_names() {
    let value: serde_json::Value = serde_json::from_slice(&sample_spec().marshal().unwrap()).unwrap();

    assert_eq!(value["secrets"]["API_KEY"], "token");
    assert_eq!(value["connectors"][0]["uuid"], "1");
    assert_eq!(value["connectors"][0]["plugin_type"], "source");
    assert_eq!(value["connectors"][0]["plugin_name"], "builtin:postgres@1.0.0");
    assert_eq!(value["connectors"][0]["plugin_config"]["collection"], "accounts");
    assert_eq!(value["functions"][0]["image"], "ftorres/enrich:9");
    assert_eq!(value["streams"][1]["from_uuid"], "2");
    assert_eq!(value["streams"][1]["to_uuid"], "3");
    assert_eq!(value["definition"]["git_sha"], "3630e05a");
    assert_eq!(value["definition"]["metadata"]["turbine"]["language"], "golang");
    assert_eq!(value["definition"]["metadata"]["spec_version"], "v3");
}

#[test]
fn test_empty_collections_are_omitted() {
    let spec = DeploymentSpec::new(Definition::new("sha", Language::Python, "1.5.1"));
    let value: serde_json::Value = serde_json::from_slice(&spec.marshal().unwrap()).unwrap();

    assert!(value.get("secrets").is_none());
    assert!(value.get("functions").is_none());
    assert!(value.get("streams").is_none());
    assert_eq!(value["connectors"], json!([]));
}

#[test]
fn test_unmarshal_accepts_stream_alias() {
    let raw = json!({
        "connectors": [
            {"uuid": "a", "name": "src", "plugin_type": "source", "plugin_name": "pg"}
        ],
        "stream": [
            {"uuid": "s1", "name": "s1", "from_uuid": "a", "to_uuid": "b"}
        ],
        "definition": {
            "git_sha": "sha",
            "metadata": {"turbine": {"language": "py", "version": "1.5.1"}, "spec_version": "v3"}
        }
    });

    let spec = DeploymentSpec::unmarshal(raw.to_string().as_bytes()).unwrap();
    assert_eq!(spec.streams.len(), 1);
    assert_eq!(spec.streams[0].to_uuid, "b");
    assert_eq!(spec.definition.metadata.turbine.language, Language::Python);
}

#[test]
fn test_unmarshal_rejects_unknown_direction() {
    let raw = json!({
        "connectors": [{"uuid": "a", "plugin_type": "sideways", "plugin_name": "pg"}],
        "definition": {
            "git_sha": "sha",
            "metadata": {"turbine": {"language": "golang", "version": "1"}, "spec_version": "v3"}
        }
    });
    assert!(DeploymentSpec::unmarshal(raw.to_string().as_bytes()).is_err());
}

// ============================================================================
// Accessor Tests
// ============================================================================

#[test]
fn test_lookup_helpers() {
    let spec = sample_spec();
    assert_eq!(spec.connector("1").unwrap().plugin_type, Direction::Source);
    assert!(spec.connector("2").is_none());
    assert_eq!(spec.function("2").unwrap().name, "enrich");
    assert_eq!(spec.sources().count(), 1);
    assert_eq!(spec.destinations().count(), 1);
    assert!(spec.has_functions());
    assert_eq!(spec.parsed_spec_version().unwrap(), crate::types::SpecVersion::V3);
}

// ============================================================================
// Image Stamping Tests
// ============================================================================

#[test]
fn test_set_image_for_functions() {
    let mut spec = sample_spec();
    spec.functions.push(Function::new("second").with_uuid("4"));

    spec.set_image_for_functions("some/image").unwrap();
    assert!(spec.functions.iter().all(|f| f.image == "some/image"));
}

#[test]
fn test_set_image_without_functions_fails() {
    let mut spec = DeploymentSpec::new(Definition::new("sha", Language::Golang, "1"));
    let err = spec.set_image_for_functions("some/image").unwrap_err();
    assert!(matches!(err, Error::NoFunctions));
    assert_eq!(err.to_string(), "cannot set image without defined functions");
}

// ============================================================================
// Build Tests
// ============================================================================

#[test]
fn test_build_dag_from_flat_lists() {
    let dag = sample_spec().build_dag().unwrap();
    assert_eq!(dag.node_count(), 3);
    assert_eq!(dag.edge_count(), 2);
}
