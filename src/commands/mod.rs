//! CLI command implementations for gafsort.
//!
//! Each submodule implements one command:
//!
//! - [`sort`] - Sort a GAF file by the topological order of its reference
//!   graph (or verify that one is already sorted)

#![allow(clippy::missing_errors_doc, clippy::too_many_lines, clippy::uninlined_format_args)]

pub mod command;
pub mod sort;
