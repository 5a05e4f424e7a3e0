//! Record fixtures
//!
//! Ordered change-data-capture records replayed for a named resource while an
//! application is run locally. Records are opaque JSON values.
//!
//! A fixture file is either an array of records or an object mapping
//! collection names to arrays of records.

use crate::error::{Error, Result, ResultExt};
use crate::types::JsonValue;
use std::fs;
use std::path::Path;

/// Yields the records stored for a resource
pub trait FixtureReader: Send + Sync {
    /// Read records from `path`, optionally selecting one collection
    fn read_fixture(&self, path: &Path, collection: Option<&str>) -> Result<Vec<JsonValue>>;
}

/// Reads JSON fixture files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFixtureReader;

impl JsonFixtureReader {
    /// Create a JSON fixture reader
    pub fn new() -> Self {
        Self
    }
}

impl FixtureReader for JsonFixtureReader {
    fn read_fixture(&self, path: &Path, collection: Option<&str>) -> Result<Vec<JsonValue>> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let document: JsonValue = serde_json::from_str(&content)
            .with_context(|| format!("invalid fixture {}", path.display()))?;
        records_from_document(document, collection)
    }
}

/// Extract the records of a parsed fixture document
pub fn records_from_document(document: JsonValue, collection: Option<&str>) -> Result<Vec<JsonValue>> {
    match (document, collection) {
        (JsonValue::Array(records), _) => Ok(records),
        (JsonValue::Object(mut collections), Some(name)) => match collections.remove(name) {
            Some(JsonValue::Array(records)) => Ok(records),
            Some(_) => Err(Error::config(format!(
                "fixture collection '{name}' is not an array of records"
            ))),
            None => Err(Error::config(format!(
                "fixture has no collection '{name}'"
            ))),
        },
        (JsonValue::Object(_), None) => Err(Error::config(
            "fixture is keyed by collection but no collection was requested",
        )),
        _ => Err(Error::config("fixture must be an array or an object of arrays")),
    }
}
