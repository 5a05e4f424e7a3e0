//! DAG assembly and validation
//!
//! Materializes the full graph from a specification's flat lists and checks
//! the global invariants that cannot be decided one declaration at a time.
//!
//! # Overview
//!
//! - [`Dag::assemble`] - version check, then replays connectors, functions
//!   and streams through the same checks the builder applies incrementally
//! - [`Dag::validate`] / [`validate_graph`] - source cardinality, single
//!   root, function limit
//!
//! Assembly is O(V + E) plus one reachability query per stream; validation
//! is a single O(V + E) sweep.

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeIndex, NodeKind};
use crate::spec::DeploymentSpec;
use std::collections::HashSet;

/// Maximum number of function stages a specification may declare
pub const MAX_FUNCTIONS: usize = 1;

/// An assembled, read-only view of a topology
#[derive(Debug, Clone)]
pub struct Dag {
    graph: Graph,
}

impl Dag {
    /// Build the graph from the flat entity lists
    ///
    /// Fails fast when the declared `spec_version` is not recognized. Node
    /// ids must be non-empty; stream ids, when set, must be unique.
    pub fn assemble(spec: &DeploymentSpec) -> Result<Self> {
        spec.parsed_spec_version()?;

        let mut graph = Graph::new();
        for connector in &spec.connectors {
            graph.add_node(connector.uuid.as_str(), connector.plugin_type.into())?;
        }
        for function in &spec.functions {
            graph.add_node(function.uuid.as_str(), NodeKind::Function)?;
        }
        let mut stream_ids = HashSet::new();
        for stream in &spec.streams {
            if !stream.uuid.is_empty() && !stream_ids.insert(stream.uuid.as_str()) {
                return Err(Error::duplicate("stream", stream.uuid.as_str()));
            }
            graph.connect(&stream.from_uuid, &stream.to_uuid)?;
        }

        Ok(Self { graph })
    }

    /// Wrap an already-acyclic graph
    pub(crate) fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    /// Check the global invariants
    pub fn validate(&self) -> Result<()> {
        validate_graph(&self.graph)
    }

    /// Underlying graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Ids of nodes without incoming edges
    pub fn roots(&self) -> Vec<&str> {
        self.ids(self.graph.roots())
    }

    /// Ids of source connectors
    pub fn sources(&self) -> Vec<&str> {
        self.ids_of(NodeKind::Source)
    }

    /// Ids of destination connectors
    pub fn destinations(&self) -> Vec<&str> {
        self.ids_of(NodeKind::Destination)
    }

    /// Ids of function stages
    pub fn functions(&self) -> Vec<&str> {
        self.ids_of(NodeKind::Function)
    }

    /// Deployment order: every node after everything that feeds it
    pub fn topological_order(&self) -> Vec<&str> {
        self.ids(self.graph.topological_order())
    }

    /// Ids directly downstream of `id`, empty when `id` is unknown
    pub fn downstream(&self, id: &str) -> Vec<&str> {
        self.graph
            .node_index(id)
            .map(|idx| self.ids(self.graph.successors(idx)))
            .unwrap_or_default()
    }

    fn ids(&self, indices: impl IntoIterator<Item = NodeIndex>) -> Vec<&str> {
        indices
            .into_iter()
            .map(|idx| self.graph.node(idx).id.as_str())
            .collect()
    }

    fn ids_of(&self, kind: NodeKind) -> Vec<&str> {
        self.graph
            .nodes()
            .filter(|(_, node)| node.kind == kind)
            .map(|(_, node)| node.id.as_str())
            .collect()
    }
}

/// Check global invariants over an acyclic graph
///
/// A node with no path from the source is itself a root, so disconnected
/// subgraphs and orphaned nodes surface as "too many sources".
pub fn validate_graph(graph: &Graph) -> Result<()> {
    if graph.count(NodeKind::Source) == 0 {
        return Err(Error::NoSources);
    }

    let roots = graph.roots();
    if roots.len() > 1 {
        let names = roots
            .iter()
            .map(|&idx| format!("'{}'", graph.node(idx).id))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::TooManySources { roots: names });
    }

    let functions = graph.count(NodeKind::Function);
    if functions > MAX_FUNCTIONS {
        return Err(Error::InvalidShape {
            max: MAX_FUNCTIONS,
            found: functions,
        });
    }

    Ok(())
}
