#![deny(unsafe_code)]
// Clippy lint configuration for CI
// - cast_*: bioinformatics code intentionally casts between numeric types
// - missing_errors_doc/panics_doc: documented at the module level where it matters
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args
)]

//! # gafsort - Topological sort for graph-anchored alignment records
//!
//! This library sorts GAF (Graph Alignment Format) records by the
//! topological order of the GFA reference graph they are anchored to, so
//! downstream tools can consume alignments in an order consistent with
//! graph traversal (coordinate-indexed access, streaming merges against
//! graph references).
//!
//! ## Overview
//!
//! - **[`graph`]** - Dense-arena reference graph and GFA loading
//! - **[`sort`]** - The sort engine: topological ranking, record
//!   comparator, chunk spill/merge, scoped temp-file management
//! - **[`gaf`]** - GAF record reading/writing (payloads stay opaque to the
//!   engine)
//! - **[`errors`]** - Typed errors (`CycleDetected`, `UnknownNode`,
//!   `ChunkIo`, `OutputIo`, ...)
//! - **[`logging`]** / **[`progress`]** - Formatted logging and progress
//!   tracking
//! - **[`validation`]** - Input validation with consistent messages
//!
//! ## Quick Start
//!
//! ```no_run
//! use gafsort_lib::gaf::{GafReader, GafWriter, keyed_stream};
//! use gafsort_lib::graph::read_gfa;
//! use gafsort_lib::sort::{ExternalSorter, topological_ranks};
//! use std::io::{BufReader, BufWriter};
//!
//! # fn main() -> gafsort_lib::errors::Result<()> {
//! let graph = read_gfa("graph.gfa")?;
//! let ranks = topological_ranks(&graph)?;
//!
//! let input = BufReader::new(std::fs::File::open("records.gaf")
//!     .map_err(|source| gafsort_lib::errors::GafSortError::InputIo { source })?);
//! let output = BufWriter::new(std::fs::File::create("sorted.gaf")
//!     .map_err(|source| gafsort_lib::errors::GafSortError::OutputIo { source })?);
//!
//! let mut writer = GafWriter::new(output);
//! let stats = ExternalSorter::new()
//!     .chunk_capacity(1_000_000)
//!     .sort(keyed_stream(GafReader::new(input), &graph, &ranks), &mut writer)?;
//! writer.finish()?;
//! assert_eq!(stats.total_records, stats.output_records);
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - Output order is the total `(rank, offset, input sequence)` order over
//!   the full input; every record appears exactly once.
//! - At most `chunk_capacity` records are held in memory at a time.
//! - The topological tie-break is fixed (ascending dense node ID among
//!   ready nodes), so ranks are reproducible across runs.
//! - No temp chunk file outlives its invocation, on success, error, panic
//!   or cancellation.

pub mod errors;
pub mod gaf;
pub mod graph;
pub mod logging;
pub mod progress;
pub mod sort;
pub mod validation;

pub use errors::{GafSortError, Result};
pub use sort::{CancelFlag, ExternalSorter, SortKey, SortStats};
