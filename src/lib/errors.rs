//! Custom error types for gafsort operations.

use thiserror::Error;

/// Result type alias for gafsort operations
pub type Result<T> = std::result::Result<T, GafSortError>;

/// Error type for gafsort operations
#[derive(Error, Debug)]
pub enum GafSortError {
    /// The reference graph contains a directed cycle
    #[error("Reference graph contains a cycle: {remaining} node(s) could not be ranked")]
    CycleDetected {
        /// Number of nodes left unranked when the ready queue drained
        remaining: usize,
    },

    /// A record's anchor node is absent from the reference graph
    #[error("Record anchored at unknown node '{node}' (not present in the reference graph)")]
    UnknownNode {
        /// The anchor node name as written in the record
        node: String,
    },

    /// Failure reading or writing a temporary chunk file
    #[error("Chunk I/O error: {source}")]
    ChunkIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failure writing the final sorted output
    #[error("Output I/O error: {source}")]
    OutputIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failure reading the input record stream
    #[error("Input I/O error: {source}")]
    InputIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed line in the reference graph file
    #[error("Invalid graph line {line}: {reason}")]
    InvalidGraph {
        /// 1-based line number in the graph file
        line: u64,
        /// Explanation of the problem
        reason: String,
    },

    /// Malformed record line
    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord {
        /// 1-based line number in the record file
        line: u64,
        /// Explanation of the problem
        reason: String,
    },

    /// Required input file is missing
    #[error("{description} '{path}' does not exist")]
    MissingFile {
        /// Human-readable description of the file
        description: String,
        /// The path that was checked
        path: String,
    },

    /// The invocation was cancelled before completion
    #[error("Sort cancelled")]
    Cancelled,
}
