//! Graph builder module
//!
//! Incremental construction of a [`DeploymentSpec`] one declaration at a time.
//!
//! # Overview
//!
//! The builder owns the specification and the live graph over it behind a
//! single exclusive lock:
//! - `add_source` / `add_destination` / `add_function` insert nodes
//! - `add_stream` inserts an edge after a reachability check from its target
//!   back to its origin, so the graph is acyclic after every accepted call
//! - `build_dag` / `validate_dag` run the global checks once the caller is done
//!
//! Every operation either commits completely or leaves the specification
//! untouched, so a rejected declaration can be corrected and retried.
//!
//! # Example
//!
//! ```ignore
//! use flowspec::{Connector, Definition, Function, Language, SpecBuilder, Stream};
//!
//! let builder = SpecBuilder::new(Definition::new("sha", Language::Golang, "1.0"));
//! let src = builder.add_source(Connector::source("pg", "builtin:postgres"))?;
//! let func = builder.add_function(Function::new("enrich"))?;
//! builder.add_stream(Stream::new(&src.uuid, &func.uuid))?;
//! builder.build_dag()?;
//! ```

use crate::dag::{validate_graph, Dag};
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeKind};
use crate::spec::{Connector, Definition, DeploymentSpec, Function, Stream};
use crate::types::new_id;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// State guarded by the builder lock
#[derive(Debug)]
struct BuildState {
    spec: DeploymentSpec,
    graph: Graph,
    stream_ids: HashSet<String>,
}

/// Lock-guarded incremental builder for a deployment specification
#[derive(Debug)]
pub struct SpecBuilder {
    state: RwLock<BuildState>,
}

impl SpecBuilder {
    /// Create an empty builder for the given definition
    pub fn new(definition: Definition) -> Self {
        Self {
            state: RwLock::new(BuildState {
                spec: DeploymentSpec::new(definition),
                graph: Graph::new(),
                stream_ids: HashSet::new(),
            }),
        }
    }

    /// Rehydrate a builder from an existing specification
    ///
    /// Every entity is replayed through the add operations, so the result
    /// satisfies the same incremental invariants as one built call by call.
    pub fn from_spec(spec: &DeploymentSpec) -> Result<Self> {
        let builder = Self::new(spec.definition.clone());

        for (name, value) in &spec.secrets {
            builder.add_secret(name.clone(), value.clone());
        }
        for connector in &spec.connectors {
            if connector.is_source() {
                builder.add_source(connector.clone())?;
            } else {
                builder.add_destination(connector.clone())?;
            }
        }
        for function in &spec.functions {
            builder.add_function(function.clone())?;
        }
        for stream in &spec.streams {
            builder.add_stream(stream.clone())?;
        }

        Ok(builder)
    }

    // A panic never happens mid-mutation, so a poisoned guard still holds
    // a consistent state.
    fn read(&self) -> RwLockReadGuard<'_, BuildState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BuildState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Declare the source connector
    ///
    /// Only one source may be declared per application.
    pub fn add_source(&self, mut connector: Connector) -> Result<Connector> {
        if !connector.is_source() {
            return Err(Error::NotSourceConnector {
                id: connector_label(&connector),
            });
        }
        assign_id(&mut connector.uuid);

        let mut state = self.write();
        if state.graph.contains(&connector.uuid) {
            return Err(Error::duplicate("connector", connector.uuid));
        }
        if let Some(existing) = state.spec.sources().next() {
            return Err(Error::SourceAlreadyExists {
                existing: existing.uuid.clone(),
            });
        }

        state.graph.add_node(connector.uuid.as_str(), NodeKind::Source)?;
        state.spec.connectors.push(connector.clone());
        Ok(connector)
    }

    /// Declare a destination connector
    pub fn add_destination(&self, mut connector: Connector) -> Result<Connector> {
        if !connector.is_destination() {
            return Err(Error::NotDestinationConnector {
                id: connector_label(&connector),
            });
        }
        assign_id(&mut connector.uuid);

        let mut state = self.write();
        state
            .graph
            .add_node(connector.uuid.as_str(), NodeKind::Destination)?;
        state.spec.connectors.push(connector.clone());
        Ok(connector)
    }

    /// Declare a function stage; no stream is required yet
    pub fn add_function(&self, mut function: Function) -> Result<Function> {
        assign_id(&mut function.uuid);

        let mut state = self.write();
        state
            .graph
            .add_node(function.uuid.as_str(), NodeKind::Function)?;
        state.spec.functions.push(function.clone());
        Ok(function)
    }

    /// Declare a stream between two already-declared nodes
    ///
    /// Rejected when `to` can already reach `from`. Which of two conflicting
    /// streams is refused therefore depends on the order they are declared in.
    pub fn add_stream(&self, mut stream: Stream) -> Result<Stream> {
        assign_id(&mut stream.uuid);
        if stream.name.is_empty() {
            stream.name = stream.default_name();
        }

        let mut state = self.write();
        if state.stream_ids.contains(&stream.uuid) {
            return Err(Error::duplicate("stream", stream.uuid));
        }
        let (from, to) = state.graph.check_edge(&stream.from_uuid, &stream.to_uuid)?;

        state.graph.add_edge(from, to);
        state.stream_ids.insert(stream.uuid.clone());
        state.spec.streams.push(stream.clone());
        Ok(stream)
    }

    /// Declare a function fed by `from`, together with the stream into it
    ///
    /// Both are committed under one lock acquisition, or neither is.
    pub fn attach_function(&self, mut function: Function, from: &str) -> Result<(Function, Stream)> {
        assign_id(&mut function.uuid);
        let mut stream = Stream::new(from, function.uuid.as_str()).with_uuid(new_id());
        stream.name = stream.default_name();

        let mut state = self.write();
        if state.graph.contains(&function.uuid) {
            return Err(Error::duplicate("function", function.uuid));
        }
        let from_idx = state
            .graph
            .node_index(from)
            .ok_or_else(|| Error::UnknownEndpoint {
                role: "source",
                id: from.to_string(),
            })?;
        if state.graph.node(from_idx).kind == NodeKind::Destination {
            return Err(Error::StreamFromDestination {
                id: from.to_string(),
            });
        }

        // A fresh node has no edges, so neither a loop nor a duplicate is possible.
        let to_idx = state
            .graph
            .add_node(function.uuid.as_str(), NodeKind::Function)?;
        state.graph.add_edge(from_idx, to_idx);
        state.stream_ids.insert(stream.uuid.clone());
        state.spec.functions.push(function.clone());
        state.spec.streams.push(stream.clone());
        Ok((function, stream))
    }

    /// Register an opaque secret, replacing any previous value
    pub fn add_secret(&self, name: impl Into<String>, value: impl Into<String>) {
        self.write().spec.secrets.insert(name.into(), value.into());
    }

    /// Stamp the resolved execution image onto every function
    pub fn set_image_for_functions(&self, image: &str) -> Result<()> {
        self.write().spec.set_image_for_functions(image)
    }

    // ========================================================================
    // Global checks
    // ========================================================================

    /// Assemble the graph from the flat lists and validate it
    pub fn build_dag(&self) -> Result<Dag> {
        self.read().spec.build_dag()
    }

    /// Stamp the image, validate and serialize in one step
    ///
    /// The write lock is held throughout, so no declaration can land between
    /// validation and serialization. An empty `image` leaves functions as
    /// they are.
    pub fn finish(&self, image: &str) -> Result<Vec<u8>> {
        let mut state = self.write();
        if !image.is_empty() {
            state.spec.set_image_for_functions(image)?;
        }
        state.spec.build_dag()?;
        state.spec.marshal()
    }

    /// Validate the live graph without reassembling it
    pub fn validate_dag(&self) -> Result<()> {
        let state = self.read();
        state.spec.parsed_spec_version()?;
        validate_graph(&state.graph)
    }

    /// Copy of the live graph, for inspection mid-build
    pub fn dag(&self) -> Dag {
        Dag::from_graph(self.read().graph.clone())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Copy of the specification as declared so far
    pub fn snapshot(&self) -> DeploymentSpec {
        self.read().spec.clone()
    }

    /// Serialize the specification as declared so far
    pub fn marshal(&self) -> Result<Vec<u8>> {
        self.read().spec.marshal()
    }

    /// Whether any function stage has been declared
    pub fn has_functions(&self) -> bool {
        self.read().spec.has_functions()
    }

    /// Whether a node with this id has been declared
    pub fn contains(&self, id: &str) -> bool {
        self.read().graph.contains(id)
    }
}

fn assign_id(id: &mut String) {
    if id.is_empty() {
        *id = new_id();
    }
}

fn connector_label(connector: &Connector) -> String {
    if connector.uuid.is_empty() {
        connector.name.clone()
    } else {
        connector.uuid.clone()
    }
}
