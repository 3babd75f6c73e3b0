//! Topological external sort engine.
//!
//! The engine has five cooperating parts:
//!
//! - [`order`] — topological ranking of the reference graph (Kahn's
//!   algorithm with a deterministic min-NodeId tie-break)
//! - [`keys`] — the record comparator: `(rank, offset, sequence number)`
//! - [`chunk`] — the temp-file record codec
//! - [`session`] — scoped temp-file ownership with cleanup on every exit
//!   path
//! - [`external`] — the spill/merge engine itself
//!
//! Record payloads stay opaque throughout: the format-specific collaborators
//! live in [`crate::graph`] and [`crate::gaf`].

pub mod chunk;
pub mod external;
pub mod keys;
pub mod order;
pub mod session;

pub use external::{CancelFlag, DEFAULT_CHUNK_CAPACITY, ExternalSorter, RecordSink, SortStats};
pub use keys::{SortKey, extract_key};
pub use order::{RankTable, topological_ranks};
