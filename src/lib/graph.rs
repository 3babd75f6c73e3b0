//! Reference graph representation and GFA loading.
//!
//! The graph is stored as a dense-integer arena: nodes are numbered in
//! insertion order and adjacency is kept as index lists, so downstream code
//! (topological ranking, key extraction) never touches node names on the hot
//! path. Names are resolved once through a hash map when records are read.
//!
//! Only the subset of GFA needed for sorting is parsed: `S` (segment) lines
//! define nodes and `L` (link) lines define directed edges from the source
//! segment to the destination segment. Sequences, overlaps, paths and walks
//! are ignored.

use crate::errors::{GafSortError, Result};
use ahash::{AHashMap, AHashSet};
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dense node identifier (index into the graph's arenas).
pub type NodeId = u32;

/// A directed reference graph over named nodes.
///
/// Node IDs are assigned densely in insertion order. The graph is immutable
/// for the duration of a sort invocation; construction happens up front via
/// [`Graph::add_node`] / [`Graph::add_edge`] or [`read_gfa`].
#[derive(Debug, Default)]
pub struct Graph {
    /// Node name per dense ID, in insertion order.
    names: Vec<String>,
    /// Name → dense ID lookup for record anchor resolution.
    name_to_id: AHashMap<String, NodeId>,
    /// Outgoing edge lists, indexed by source node ID.
    adjacency: Vec<Vec<NodeId>>,
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with the given name, returning its dense ID.
    ///
    /// Adding a name that already exists returns the existing ID.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = self.names.len() as NodeId;
        self.names.push(name.to_string());
        self.name_to_id.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Add a directed edge between two existing nodes.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.adjacency[from as usize].push(to);
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Resolve a node name to its dense ID.
    #[must_use]
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.name_to_id.get(name).copied()
    }

    /// Name of a node.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> &str {
        &self.names[id as usize]
    }

    /// Outgoing edges of a node.
    #[must_use]
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.adjacency[id as usize]
    }
}

/// Read a reference graph from a GFA file.
///
/// Parses `S` lines as nodes and `L` lines as directed edges from the source
/// segment to the destination segment. A `-`/`-` link is the reverse-strand
/// statement of the forward edge (`L B - A -` ≡ `L A + B +`) and is
/// canonicalized to it; mixed-orientation links keep their written
/// direction. Duplicate edges are dropped. A link that names a segment with
/// no `S` line anywhere in the file is an error: sorting needs the full node
/// set up front.
///
/// # Errors
///
/// Returns [`GafSortError::InputIo`] on read failure and
/// [`GafSortError::InvalidGraph`] on malformed or out-of-order lines.
pub fn read_gfa<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let file = File::open(path.as_ref())
        .map_err(|source| GafSortError::InputIo { source })?;
    let reader = BufReader::new(file);
    let mut graph = Graph::new();
    // Links may appear before their segments in valid GFA, so buffer them.
    let mut pending_links: Vec<(u64, String, String)> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| GafSortError::InputIo { source })?;
        let line_number = idx as u64 + 1;
        let mut fields = line.split('\t');
        match fields.next() {
            Some("S") => {
                let name = fields.next().filter(|n| !n.is_empty()).ok_or_else(|| {
                    GafSortError::InvalidGraph {
                        line: line_number,
                        reason: "S line missing segment name".to_string(),
                    }
                })?;
                graph.add_node(name);
            }
            Some("L") => {
                let from = fields.next();
                let from_orient = fields.next();
                let to = fields.next();
                let to_orient = fields.next();
                let (from, from_orient, to, to_orient) =
                    match (from, from_orient, to, to_orient) {
                        (Some(f), Some(fo), Some(t), Some(to_o))
                            if !f.is_empty() && !t.is_empty() =>
                        {
                            (f, fo, t, to_o)
                        }
                        _ => {
                            return Err(GafSortError::InvalidGraph {
                                line: line_number,
                                reason: "L line missing source or destination segment"
                                    .to_string(),
                            });
                        }
                    };
                if !matches!(from_orient, "+" | "-") || !matches!(to_orient, "+" | "-") {
                    return Err(GafSortError::InvalidGraph {
                        line: line_number,
                        reason: format!(
                            "invalid link orientation '{from_orient}'/'{to_orient}'"
                        ),
                    });
                }
                // `L B - A -` states the same edge as `L A + B +`.
                if from_orient == "-" && to_orient == "-" {
                    pending_links.push((line_number, to.to_string(), from.to_string()));
                } else {
                    pending_links.push((line_number, from.to_string(), to.to_string()));
                }
            }
            // Headers, paths, walks and comments are not needed for sorting.
            _ => {}
        }
    }

    let mut seen_edges: AHashSet<(NodeId, NodeId)> = AHashSet::new();
    for (line_number, from, to) in pending_links {
        let from_id = graph.node_id(&from).ok_or_else(|| GafSortError::InvalidGraph {
            line: line_number,
            reason: format!("link references undeclared segment '{from}'"),
        })?;
        let to_id = graph.node_id(&to).ok_or_else(|| GafSortError::InvalidGraph {
            line: line_number,
            reason: format!("link references undeclared segment '{to}'"),
        })?;
        if seen_edges.insert((from_id, to_id)) {
            graph.add_edge(from_id, to_id);
        }
    }

    info!("Loaded graph: {} nodes, {} edges", graph.node_count(), graph.edge_count());
    Ok(graph)
}
