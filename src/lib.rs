// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Flowspec
//!
//! Deployment specifications for streaming data pipelines.
//!
//! A pipeline is one source connector, at most one function stage and any
//! number of destination connectors, wired together by directed streams.
//! This crate models those entities, checks that every declared stream
//! keeps the topology acyclic, validates serialized specifications against
//! a JSON Schema per spec version and upgrades older wire generations.
//!
//! ## Features
//!
//! - **Entity Model**: Connectors, functions, streams and pipeline metadata
//! - **Incremental Builder**: Declarations checked for loops as they arrive
//! - **DAG Validation**: Exactly one root, bounded number of functions
//! - **Schema Validation**: Field paths and rule paths in every error
//! - **Versioned Loading**: `0.1.1`, `0.3.0` and `v3` documents
//! - **Recording Sessions**: Build a spec call by call, locally or over HTTP
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowspec::{Connector, Definition, Function, Language, SpecBuilder, Stream};
//!
//! let builder = SpecBuilder::new(Definition::new("3630e05a", Language::Golang, "0.1.0"));
//! let source = builder.add_source(Connector::source("pg", "builtin:postgres"))?;
//! let (function, _) = builder.attach_function(Function::new("anonymize"), &source.uuid)?;
//! let sink = builder.add_destination(Connector::destination("s3", "builtin:s3"))?;
//! builder.add_stream(Stream::new(&function.uuid, &sink.uuid))?;
//!
//! builder.set_image_for_functions("registry/app:1")?;
//! builder.build_dag()?;
//! let bytes = builder.marshal()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        CLI (validate, upgrade, inspect)  /  HTTP sessions    │
//! └──────────────────────────────────────────────────────────────┘
//!                 │                               │
//! ┌───────────────┴──────────┐      ┌─────────────┴──────────────┐
//! │  Loader                  │      │  RecordingSession          │
//! │  detect → schema → parse │      │  config + fixture replay   │
//! │  → upgrade               │      │                            │
//! └───────────────┬──────────┘      └─────────────┬──────────────┘
//!                 │                               │
//! ┌───────────────┴───────────┬───────────────────┴──────────────┐
//! │  DeploymentSpec / Dag     │  SpecBuilder (graph + cycle check)│
//! └───────────────────────────┴──────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pipeline entity model
pub mod spec;

/// Directed graph with reachability checks
pub mod graph;

/// Incremental, cycle-checked specification builder
pub mod builder;

/// DAG assembly and shape validation
pub mod dag;

/// JSON Schema validation per spec version
pub mod schema;

/// Versioned specification loading
pub mod loader;

/// Application configuration
pub mod config;

/// Fixture records for replayed reads
pub mod fixture;

/// Recording sessions
pub mod session;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use builder::SpecBuilder;
pub use dag::Dag;
pub use loader::{load_spec, load_spec_from_slice, load_spec_from_str};
pub use session::RecordingSession;
pub use spec::{Connector, Definition, DeploymentSpec, Function, Metadata, RuntimeInfo, Stream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
