//! Error types for flowspec
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Every variant names the entity ids and the rule that was violated so the
//! message can be shown directly to the developer who issued the declaration.

use thiserror::Error;

/// The main error type for flowspec
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Schema Errors
    // ============================================================================
    #[error("\"{path}\" field fails {rule} validation: {message}")]
    SchemaValidation {
        path: String,
        rule: String,
        message: String,
    },

    #[error("Failed to compile schema for spec version \"{version}\": {message}")]
    SchemaCompile { version: String, message: String },

    // ============================================================================
    // Version Errors
    // ============================================================================
    #[error("spec version \"{version}\" is invalid, supported versions: {supported}")]
    UnsupportedSpecVersion { version: String, supported: String },

    // ============================================================================
    // Entity Errors
    // ============================================================================
    #[error("connector '{id}' is not a source connector")]
    NotSourceConnector { id: String },

    #[error("connector '{id}' is not a destination connector")]
    NotDestinationConnector { id: String },

    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} id must not be empty")]
    EmptyId { kind: &'static str },

    #[error("source connector already exists, can only add one per application (existing source: '{existing}')")]
    SourceAlreadyExists { existing: String },

    #[error("{role} '{id}' does not exist")]
    UnknownEndpoint { role: &'static str, id: String },

    #[error("stream cannot connect '{id}' to itself")]
    SelfLoop { id: String },

    #[error("stream cannot flow into source connector '{id}'")]
    StreamIntoSource { id: String },

    #[error("stream cannot flow out of destination connector '{id}'")]
    StreamFromDestination { id: String },

    #[error("stream between '{from}' and '{to}' already exists")]
    DuplicateStream { from: String, to: String },

    // ============================================================================
    // Topology Errors
    // ============================================================================
    #[error("edge between '{from}' and '{to}' would create a loop")]
    WouldCreateLoop { from: String, to: String },

    #[error("invalid DAG, no sources found")]
    NoSources,

    #[error("invalid DAG, too many sources: {roots}")]
    TooManySources { roots: String },

    #[error("invalid DAG, there has to be at least one source, at most {max} function(s), and zero or more destinations (found {found} functions)")]
    InvalidShape { max: usize, found: usize },

    #[error("cannot set image without defined functions")]
    NoFunctions,

    // ============================================================================
    // Session Errors
    // ============================================================================
    #[error("invalid {field}: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("language \"{language}\" not supported, use one of: golang, javascript, nodejs, python, python3, ruby")]
    UnsupportedLanguage { language: String },

    #[error("session has not been initialized")]
    SessionNotInitialized,

    #[error("session has already been initialized")]
    SessionAlreadyInitialized,

    #[error("session '{id}' not found")]
    SessionNotFound { id: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Error family, mirroring how callers are expected to react to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Serialized spec does not match its declared schema
    Schema,
    /// Unrecognized `spec_version`
    Version,
    /// Rejected declaration (duplicate id, wrong direction, unknown endpoint)
    Entity,
    /// Graph shape violation (loop, no source, too many sources)
    Topology,
    /// Misuse of a recording session
    Session,
    /// Configuration or parse failure
    Config,
    /// Filesystem failure
    Io,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported spec version error listing the supported versions
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        let supported = crate::types::SpecVersion::ALL
            .iter()
            .map(|v| format!("\"{v}\""))
            .collect::<Vec<_>>()
            .join(", ");
        Self::UnsupportedSpecVersion {
            version: version.into(),
            supported,
        }
    }

    /// Create a duplicate id error
    pub fn duplicate(kind: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            kind,
            id: id.into(),
        }
    }

    /// Create a loop error for the edge `from -> to`
    pub fn would_create_loop(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::WouldCreateLoop {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Classify this error into its family
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SchemaValidation { .. } | Error::SchemaCompile { .. } => ErrorKind::Schema,
            Error::UnsupportedSpecVersion { .. } => ErrorKind::Version,
            Error::NotSourceConnector { .. }
            | Error::NotDestinationConnector { .. }
            | Error::DuplicateId { .. }
            | Error::EmptyId { .. }
            | Error::SourceAlreadyExists { .. }
            | Error::UnknownEndpoint { .. }
            | Error::SelfLoop { .. }
            | Error::StreamIntoSource { .. }
            | Error::StreamFromDestination { .. }
            | Error::DuplicateStream { .. } => ErrorKind::Entity,
            Error::WouldCreateLoop { .. }
            | Error::NoSources
            | Error::TooManySources { .. }
            | Error::InvalidShape { .. }
            | Error::NoFunctions => ErrorKind::Topology,
            Error::InvalidRequest { .. }
            | Error::UnsupportedLanguage { .. }
            | Error::SessionNotInitialized
            | Error::SessionAlreadyInitialized
            | Error::SessionNotFound { .. } => ErrorKind::Session,
            Error::Config { .. }
            | Error::MissingField { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_)
            | Error::Other(_) => ErrorKind::Config,
            Error::Io(_) | Error::FileNotFound { .. } => ErrorKind::Io,
        }
    }
}

/// Result type alias for flowspec
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
