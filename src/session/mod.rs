//! Recording session module
//!
//! Drives a [`SpecBuilder`] call by call on behalf of an application that is
//! declaring its pipeline.
//!
//! # Overview
//!
//! A session is initialized once, then receives declarations in whatever
//! order the application issues them:
//!
//! ```text
//! init -> add_source -> read_records -> process_records -> add_destination
//!      -> write_records -> get_spec
//! ```
//!
//! Records are never inspected; they are forwarded so the application can
//! keep chaining calls. When the session is given a [`ConfigReader`] and a
//! [`FixtureReader`], `read_records` replays the fixture configured for the
//! source resource instead of returning an empty batch.

mod types;

pub use types::{
    AddDestinationRequest, AddSourceRequest, GetSpecRequest, InitRequest, Plugin, Process,
    ProcessRecordsRequest, ReadRecordsRequest, Secret, StreamName, StreamRecords,
    WriteRecordsRequest,
};

use crate::builder::SpecBuilder;
use crate::config::{AppConfig, ConfigReader};
use crate::error::{Error, Result};
use crate::fixture::FixtureReader;
use crate::spec::{Connector, Definition, Function, Stream};
use crate::types::{JsonValue, Language};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Collaborators used to replay fixture records
#[derive(Clone)]
struct Replay {
    config_reader: Arc<dyn ConfigReader>,
    fixture_reader: Arc<dyn FixtureReader>,
}

/// Application configuration resolved at init
#[derive(Debug)]
struct App {
    config: AppConfig,
    path: PathBuf,
}

/// Everything `init` establishes, published at once
struct Active {
    builder: SpecBuilder,
    app: Option<App>,
}

/// One application's declaration session
pub struct RecordingSession {
    active: OnceCell<Active>,
    replay: Option<Replay>,
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("initialized", &self.is_initialized())
            .field("replay", &self.replay.is_some())
            .finish()
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    /// Create a session that forwards empty record batches
    pub fn new() -> Self {
        Self {
            active: OnceCell::new(),
            replay: None,
        }
    }

    /// Create a session that replays fixture records
    pub fn with_fixtures(
        config_reader: Arc<dyn ConfigReader>,
        fixture_reader: Arc<dyn FixtureReader>,
    ) -> Self {
        Self {
            replay: Some(Replay {
                config_reader,
                fixture_reader,
            }),
            ..Self::new()
        }
    }

    /// Whether `init` has completed
    pub fn is_initialized(&self) -> bool {
        self.active.get().is_some()
    }

    fn builder(&self) -> Result<&SpecBuilder> {
        self.active
            .get()
            .map(|active| &active.builder)
            .ok_or(Error::SessionNotInitialized)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Start the session
    pub fn init(&self, req: &InitRequest) -> Result<()> {
        req.validate()?;
        if self.is_initialized() {
            return Err(Error::SessionAlreadyInitialized);
        }

        let language: Language = req.language.parse()?;
        let definition = Definition::new(&req.git_sha, language, &req.turbine_version);

        let app = match &self.replay {
            Some(replay) if !req.config_file_path.is_empty() => {
                let path = PathBuf::from(&req.config_file_path);
                let config = replay
                    .config_reader
                    .read_config(Some(&req.app_name), &path)?;
                let path = app_dir(&path);
                debug!(app = %config.name, path = %path.display(), "Loaded app config");
                Some(App { config, path })
            }
            _ => None,
        };

        self.active
            .set(Active {
                builder: SpecBuilder::new(definition),
                app,
            })
            .map_err(|_| Error::SessionAlreadyInitialized)?;
        info!(app = %req.app_name, language = %language, "Session initialized");
        Ok(())
    }

    /// Declare the source connector; returns its id
    pub fn add_source(&self, req: &AddSourceRequest) -> Result<StreamName> {
        req.validate()?;
        let connector = Connector::source(&req.name, &req.plugin.name);
        let connector = self.builder()?.add_source(Connector {
            plugin_config: req.plugin.configs.clone(),
            ..connector
        })?;

        debug!(name = %connector.name, id = %connector.uuid, "Added source");
        Ok(StreamName {
            stream_name: connector.uuid,
        })
    }

    /// Read the records of the source
    pub fn read_records(&self, req: &ReadRecordsRequest) -> Result<StreamRecords> {
        req.validate()?;
        let builder = self.builder()?;
        let source = builder
            .snapshot()
            .sources()
            .find(|c| c.uuid == req.source_stream)
            .cloned()
            .ok_or_else(|| Error::UnknownEndpoint {
                role: "source",
                id: req.source_stream.clone(),
            })?;

        let records = self.replay_records(&source)?;
        debug!(source = %source.uuid, records = records.len(), "Read records");
        Ok(StreamRecords {
            stream_name: source.uuid,
            records,
        })
    }

    fn replay_records(&self, source: &Connector) -> Result<Vec<JsonValue>> {
        let app = self.active.get().and_then(|active| active.app.as_ref());
        let (Some(replay), Some(app)) = (&self.replay, app) else {
            return Ok(Vec::new());
        };
        let Some(path) = app.config.resource_path(&app.path, &source.name) else {
            return Err(Error::config(format!(
                "no fixture configured for resource '{}'",
                source.name
            )));
        };

        let collection = source.plugin_config.get("collection").map(String::as_str);
        replay.fixture_reader.read_fixture(&path, collection)
    }

    /// Declare a destination connector; returns its id
    pub fn add_destination(&self, req: &AddDestinationRequest) -> Result<StreamName> {
        req.validate()?;
        let connector = Connector::destination(&req.name, &req.plugin.name);
        let connector = self.builder()?.add_destination(Connector {
            plugin_config: req.plugin.configs.clone(),
            ..connector
        })?;

        debug!(name = %connector.name, id = %connector.uuid, "Added destination");
        Ok(StreamName {
            stream_name: connector.uuid,
        })
    }

    /// Route records into a destination
    pub fn write_records(&self, req: &WriteRecordsRequest) -> Result<()> {
        req.validate()?;
        let stream = self.builder()?.add_stream(Stream::new(
            &req.stream_records.stream_name,
            &req.destination_id,
        ))?;

        debug!(
            stream = %stream.name,
            records = req.stream_records.records.len(),
            "Wrote records"
        );
        Ok(())
    }

    /// Route records through a new function stage
    ///
    /// The records are forwarded unchanged under the function's id.
    pub fn process_records(&self, req: &ProcessRecordsRequest) -> Result<StreamRecords> {
        req.validate()?;
        let function = Function::new(req.process.name.to_lowercase());
        let (function, stream) = self
            .builder()?
            .attach_function(function, &req.stream_records.stream_name)?;

        debug!(function = %function.name, stream = %stream.name, "Added function");
        Ok(StreamRecords {
            stream_name: function.uuid,
            records: req.stream_records.records.clone(),
        })
    }

    /// Register a secret for the pipeline
    pub fn register_secret(&self, req: &Secret) -> Result<()> {
        req.validate()?;
        self.builder()?.add_secret(&req.name, &req.value);
        debug!(name = %req.name, "Registered secret");
        Ok(())
    }

    /// Finish the session and return the serialized specification
    ///
    /// The image is stamped onto the functions only when one is given.
    pub fn get_spec(&self, req: &GetSpecRequest) -> Result<Vec<u8>> {
        let spec = self.builder()?.finish(&req.image)?;
        info!(bytes = spec.len(), "Built deployment spec");
        Ok(spec)
    }

    /// Whether any function stage has been declared
    pub fn has_functions(&self) -> Result<bool> {
        Ok(self.builder()?.has_functions())
    }

    /// Application configuration, when replaying fixtures
    pub fn app_config(&self) -> Option<&AppConfig> {
        self.active
            .get()
            .and_then(|active| active.app.as_ref())
            .map(|app| &app.config)
    }
}

/// Directory fixture paths are resolved against
fn app_dir(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        path.to_path_buf()
    }
}
