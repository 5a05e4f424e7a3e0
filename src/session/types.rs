//! Request and response types for recording sessions
//!
//! These are the transport-neutral shapes of each session call; the HTTP
//! server deserializes them directly from request bodies.

use crate::error::{Error, Result};
use crate::types::{JsonValue, StringMap};
use serde::{Deserialize, Serialize};

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_request(field, "value is required"));
    }
    Ok(())
}

// ============================================================================
// Init
// ============================================================================

/// Start a session for an application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRequest {
    /// Application name; overrides the configured name when replaying
    pub app_name: String,
    /// Application directory or config file, used to resolve fixtures
    #[serde(default)]
    pub config_file_path: String,
    /// Application language
    pub language: String,
    /// Source-control revision
    #[serde(default)]
    pub git_sha: String,
    /// Version of the library the application was declared with
    pub turbine_version: String,
}

impl InitRequest {
    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require("app_name", &self.app_name)?;
        require("language", &self.language)?;
        require("turbine_version", &self.turbine_version)
    }
}

// ============================================================================
// Connectors
// ============================================================================

/// Integration driver and its configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Driver name (e.g. `builtin:postgres`)
    pub name: String,
    /// Driver configuration
    #[serde(default)]
    pub configs: StringMap,
}

/// Declare the source connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSourceRequest {
    /// Logical resource name
    pub name: String,
    pub plugin: Plugin,
}

impl AddSourceRequest {
    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("plugin.name", &self.plugin.name)
    }
}

/// Declare a destination connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDestinationRequest {
    /// Logical resource name
    pub name: String,
    pub plugin: Plugin,
}

impl AddDestinationRequest {
    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("plugin.name", &self.plugin.name)
    }
}

/// Id of the node a declaration created; records flow out of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamName {
    pub stream_name: String,
}

// ============================================================================
// Records
// ============================================================================

/// Opaque records flowing out of a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecords {
    /// Id of the node the records flow out of
    pub stream_name: String,
    #[serde(default)]
    pub records: Vec<JsonValue>,
}

/// Read the records of the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRecordsRequest {
    /// Id of the source connector
    pub source_stream: String,
}

impl ReadRecordsRequest {
    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require("source_stream", &self.source_stream)
    }
}

/// Route records into a destination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRecordsRequest {
    /// Id of the destination connector
    pub destination_id: String,
    pub stream_records: StreamRecords,
}

impl WriteRecordsRequest {
    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require("destination_id", &self.destination_id)?;
        require("stream_records.stream_name", &self.stream_records.stream_name)
    }
}

/// Function applied to records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub name: String,
}

/// Route records through a function stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecordsRequest {
    pub process: Process,
    pub stream_records: StreamRecords,
}

impl ProcessRecordsRequest {
    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require("process.name", &self.process.name)?;
        require("stream_records.stream_name", &self.stream_records.stream_name)
    }
}

// ============================================================================
// Secrets and Spec
// ============================================================================

/// Secret made available to the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub value: String,
}

impl Secret {
    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("value", &self.value)
    }
}

/// Finish the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSpecRequest {
    /// Execution image for the functions; left unset when empty
    #[serde(default)]
    pub image: String,
}
