//! Integration tests for gafsort.
//!
//! These tests validate end-to-end workflows that span multiple modules:
//! GFA loading, topological ranking, external sort, and verification.

mod test_error_paths;
mod test_sort_pipeline;
mod test_verify;
