//! Integration tests
//!
//! Tests the full end-to-end flow: recording session → serialized spec →
//! schema validation → reload → DAG

use flowspec::loader::{load_spec, load_spec_from_slice};
use flowspec::schema::validate_spec;
use flowspec::session::{
    AddDestinationRequest, AddSourceRequest, GetSpecRequest, InitRequest, Plugin, Process,
    ProcessRecordsRequest, ReadRecordsRequest, StreamRecords, WriteRecordsRequest,
};
use flowspec::{Direction, Error, ErrorKind, RecordingSession, SpecBuilder, SpecVersion};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn plugin(name: &str) -> Plugin {
    Plugin {
        name: name.to_string(),
        configs: [("collection".to_string(), "orders".to_string())].into(),
    }
}

fn record_pipeline(destinations: &[&str]) -> RecordingSession {
    let session = RecordingSession::new();
    session
        .init(&InitRequest {
            app_name: "orders".to_string(),
            config_file_path: String::new(),
            language: "js".to_string(),
            git_sha: "9c1f2e7".to_string(),
            turbine_version: "1.2.0".to_string(),
        })
        .unwrap();

    let source = session
        .add_source(&AddSourceRequest {
            name: "pg".to_string(),
            plugin: plugin("builtin:postgres"),
        })
        .unwrap()
        .stream_name;
    let records = session
        .read_records(&ReadRecordsRequest {
            source_stream: source,
        })
        .unwrap();
    let processed = session
        .process_records(&ProcessRecordsRequest {
            process: Process {
                name: "Enrich".to_string(),
            },
            stream_records: records,
        })
        .unwrap();

    for name in destinations {
        let destination = session
            .add_destination(&AddDestinationRequest {
                name: (*name).to_string(),
                plugin: plugin("builtin:s3"),
            })
            .unwrap()
            .stream_name;
        session
            .write_records(&WriteRecordsRequest {
                destination_id: destination,
                stream_records: StreamRecords {
                    stream_name: processed.stream_name.clone(),
                    records: Vec::new(),
                },
            })
            .unwrap();
    }
    session
}

// ============================================================================
// Session Round Trip
// ============================================================================

#[test]
fn test_recorded_spec_reloads_into_same_topology() {
    let session = record_pipeline(&["archive", "warehouse"]);
    let bytes = session
        .get_spec(&GetSpecRequest {
            image: "registry/orders:7".to_string(),
        })
        .unwrap();

    validate_spec(&bytes, "v3").unwrap();

    let spec = load_spec_from_slice(&bytes).unwrap();
    assert_eq!(spec.connectors.len(), 3);
    assert_eq!(spec.functions[0].name, "enrich");
    assert_eq!(spec.functions[0].image, "registry/orders:7");

    let dag = spec.build_dag().unwrap();
    assert_eq!(dag.node_count(), 4);
    assert_eq!(dag.edge_count(), 3);
    assert_eq!(dag.roots(), vec![spec.connectors[0].uuid.as_str()]);

    let function = spec.functions[0].uuid.as_str();
    let mut downstream = dag.downstream(function);
    downstream.sort_unstable();
    let mut expected: Vec<&str> = spec.destinations().map(|c| c.uuid.as_str()).collect();
    expected.sort_unstable();
    assert_eq!(downstream, expected);

    // Rehydrating a builder preserves the serialized form
    let builder = SpecBuilder::from_spec(&spec).unwrap();
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&builder.marshal().unwrap()).unwrap(),
        serde_json::from_slice::<serde_json::Value>(&bytes).unwrap()
    );
}

#[test]
fn test_rehydrated_builder_still_rejects_loops() {
    let session = record_pipeline(&["warehouse"]);
    let bytes = session.get_spec(&GetSpecRequest::default()).unwrap();
    let spec = load_spec_from_slice(&bytes).unwrap();

    let builder = SpecBuilder::from_spec(&spec).unwrap();
    let source = spec.sources().next().unwrap().uuid.clone();
    let function = spec.functions[0].uuid.clone();

    let err = builder
        .add_stream(flowspec::Stream::new(&function, &source))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Entity);

    let second = builder
        .attach_function(flowspec::Function::new("audit"), &function)
        .unwrap();
    assert_eq!(second.1.from_uuid, function);
    assert!(matches!(
        builder.build_dag(),
        Err(Error::InvalidShape { max: 1, found: 2 })
    ));
}

// ============================================================================
// Legacy Files
// ============================================================================

#[test]
fn test_legacy_file_upgrades_and_validates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeline.yaml");
    fs::write(
        &path,
        r"
connectors:
  - id: src
    type: source
    resource: pg
    collection: orders
  - id: dst
    type: destination
    resource: s3
    collection: orders_archive
functions:
  - id: fn
    name: enrich
    image: registry/orders:1
streams:
  - from_id: src
    to_id: fn
  - from_id: fn
    to_id: dst
definition:
  git_sha: 9c1f2e7
  metadata:
    turbine:
      language: ruby
      version: '0.4'
    spec_version: 0.1.1
",
    )
    .unwrap();

    let spec = load_spec(&path).unwrap();
    assert_eq!(spec.parsed_spec_version().unwrap(), SpecVersion::V3);
    assert_eq!(spec.connectors[0].plugin_type, Direction::Source);
    assert_eq!(spec.connectors[1].plugin_config["collection"], "orders_archive");
    assert_eq!(spec.streams.len(), 2);
    assert_eq!(spec.build_dag().unwrap().topological_order(), vec!["src", "fn", "dst"]);

    // The upgraded document satisfies the latest schema
    let upgraded = spec.marshal().unwrap();
    validate_spec(&upgraded, "v3").unwrap();
}

#[test]
fn test_document_checked_against_declared_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeline.json");
    fs::write(
        &path,
        json!({
            "connectors": [{"uuid": "src", "type": "source"}],
            "definition": {
                "git_sha": "9c1f2e7",
                "metadata": {
                    "turbine": {"language": "golang", "version": "0.4"},
                    "spec_version": "0.3.0"
                }
            }
        })
        .to_string(),
    )
    .unwrap();

    let err = load_spec(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}
