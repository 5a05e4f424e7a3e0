//! Graph module
//!
//! Directed graph over pipeline nodes, backed by a petgraph
//! [`StableDiGraph`].
//!
//! Nodes are addressed by [`NodeIndex`]; a side map resolves entity ids to
//! indices once, so the reachability check run on every edge insertion is a
//! plain index traversal. The graph is kept acyclic by construction:
//! [`Graph::connect`] refuses any edge whose target can already reach its
//! origin.

use crate::error::{Error, Result};
use crate::types::Direction;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::stable_graph::StableDiGraph;
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::HashMap;
use std::fmt;

pub use petgraph::stable_graph::NodeIndex;

// ============================================================================
// Node Types
// ============================================================================

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Source connector
    Source,
    /// Destination connector
    Destination,
    /// Transform stage
    Function,
}

impl NodeKind {
    /// Entity family used in error messages
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Source | NodeKind::Destination => "connector",
            NodeKind::Function => "function",
        }
    }
}

impl From<Direction> for NodeKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Source => NodeKind::Source,
            Direction::Destination => NodeKind::Destination,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Source => "source",
            NodeKind::Destination => "destination",
            NodeKind::Function => "function",
        };
        f.write_str(name)
    }
}

/// A node in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Entity id
    pub id: String,
    /// Entity kind
    pub kind: NodeKind,
}

// ============================================================================
// Graph
// ============================================================================

/// Directed acyclic graph with an id index
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: StableDiGraph<Node, ()>,
    index: HashMap<String, NodeIndex>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.inner.node_count()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether a node with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Resolve an id to its index
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Node at an index
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.inner[idx]
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.inner
            .node_indices()
            .map(move |idx| (idx, &self.inner[idx]))
    }

    /// Number of nodes of a kind
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes().filter(|(_, n)| n.kind == kind).count()
    }

    /// Direct downstream neighbours, in insertion order
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbours(idx, Outgoing)
    }

    /// Direct upstream neighbours, in insertion order
    pub fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbours(idx, Incoming)
    }

    fn neighbours(&self, idx: NodeIndex, direction: petgraph::Direction) -> Vec<NodeIndex> {
        let mut found: Vec<NodeIndex> = self.inner.neighbors_directed(idx, direction).collect();
        found.sort_unstable();
        found
    }

    /// Whether the edge `from -> to` exists
    pub fn has_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.inner.contains_edge(from, to)
    }

    /// Insert a node, rejecting empty and duplicate ids
    pub fn add_node(&mut self, id: impl Into<String>, kind: NodeKind) -> Result<NodeIndex> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::EmptyId { kind: kind.label() });
        }
        if self.index.contains_key(&id) {
            return Err(Error::duplicate(kind.label(), id));
        }

        let idx = self.inner.add_node(Node {
            id: id.clone(),
            kind,
        });
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Check that `from -> to` may be added without breaking an invariant
    ///
    /// Both endpoints must exist, differ, respect connector direction, not
    /// already be linked, and `to` must not already reach `from`.
    pub fn check_edge(&self, from: &str, to: &str) -> Result<(NodeIndex, NodeIndex)> {
        let from_idx = self.node_index(from).ok_or_else(|| Error::UnknownEndpoint {
            role: "source",
            id: from.to_string(),
        })?;
        let to_idx = self.node_index(to).ok_or_else(|| Error::UnknownEndpoint {
            role: "destination",
            id: to.to_string(),
        })?;

        if from_idx == to_idx {
            return Err(Error::SelfLoop {
                id: from.to_string(),
            });
        }
        if self.node(from_idx).kind == NodeKind::Destination {
            return Err(Error::StreamFromDestination {
                id: from.to_string(),
            });
        }
        if self.node(to_idx).kind == NodeKind::Source {
            return Err(Error::StreamIntoSource { id: to.to_string() });
        }
        if self.has_edge(from_idx, to_idx) {
            return Err(Error::DuplicateStream {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if self.can_reach(to_idx, from_idx) {
            return Err(Error::would_create_loop(from, to));
        }

        Ok((from_idx, to_idx))
    }

    /// Commit an edge that already passed [`Graph::check_edge`]
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.inner.add_edge(from, to, ());
    }

    /// Check and insert the edge `from -> to`
    pub fn connect(&mut self, from: &str, to: &str) -> Result<()> {
        let (from_idx, to_idx) = self.check_edge(from, to)?;
        self.add_edge(from_idx, to_idx);
        Ok(())
    }

    /// Whether `target` is reachable from `start` along existing edges
    pub fn can_reach(&self, start: NodeIndex, target: NodeIndex) -> bool {
        has_path_connecting(&self.inner, start, target, None)
    }

    /// Nodes without incoming edges, in insertion order
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.inner
            .node_indices()
            .filter(|&idx| self.inner.neighbors_directed(idx, Incoming).next().is_none())
            .collect()
    }

    /// Every node appears after all of its predecessors
    pub fn topological_order(&self) -> Vec<NodeIndex> {
        // Edges only enter through check_edge, so a cycle cannot exist
        toposort(&self.inner, None).unwrap_or_default()
    }
}
