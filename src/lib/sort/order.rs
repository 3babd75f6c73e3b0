//! Topological ranking of the reference graph.
//!
//! Computes one integer rank per node such that `rank(from) < rank(to)` for
//! every directed edge, using Kahn's algorithm in O(V+E). Several valid
//! topological orders usually exist; this implementation commits to a fixed
//! tie-break so ranks are a pure function of the graph and reproducible
//! across runs: among nodes whose dependencies are all ranked, the lowest
//! dense `NodeId` is ranked next (a min-heap ready set). Nodes with no edges
//! have in-degree zero and therefore fall out in insertion order.

use crate::errors::{GafSortError, Result};
use crate::graph::{Graph, NodeId};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Rank table produced by [`topological_ranks`].
///
/// A flat array indexed by dense `NodeId`, owned by the engine for the
/// duration of one sort invocation and read-only thereafter.
#[derive(Debug)]
pub struct RankTable {
    ranks: Vec<u64>,
}

impl RankTable {
    /// Rank of a node.
    #[must_use]
    pub fn rank(&self, id: NodeId) -> u64 {
        self.ranks[id as usize]
    }

    /// Number of ranked nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// True if the graph had no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Compute topological ranks for every node of the graph.
///
/// # Errors
///
/// Returns [`GafSortError::CycleDetected`] if the ready queue drains while
/// nodes remain unranked, i.e. the graph contains a directed cycle. No
/// record processing has happened at that point.
pub fn topological_ranks(graph: &Graph) -> Result<RankTable> {
    let n = graph.node_count();
    let mut in_degree = vec![0u32; n];
    for id in 0..n {
        for &succ in graph.successors(id as NodeId) {
            in_degree[succ as usize] += 1;
        }
    }

    // Min-heap over NodeId: the deterministic ready-set tie-break.
    let mut ready: BinaryHeap<Reverse<NodeId>> = BinaryHeap::new();
    for (id, &deg) in in_degree.iter().enumerate() {
        if deg == 0 {
            ready.push(Reverse(id as NodeId));
        }
    }

    let mut ranks = vec![0u64; n];
    let mut next_rank = 0u64;

    while let Some(Reverse(id)) = ready.pop() {
        ranks[id as usize] = next_rank;
        next_rank += 1;
        for &succ in graph.successors(id) {
            in_degree[succ as usize] -= 1;
            if in_degree[succ as usize] == 0 {
                ready.push(Reverse(succ));
            }
        }
    }

    let ranked = next_rank as usize;
    if ranked < n {
        return Err(GafSortError::CycleDetected { remaining: n - ranked });
    }

    Ok(RankTable { ranks })
}
