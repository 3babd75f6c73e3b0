//! Failure-path tests: cycles, unknown anchors, malformed inputs, cleanup.

use crate::helpers::{chain_gfa, dir_is_empty, gaf_line, write_file};
use gafsort_lib::GafSortError;
use gafsort_lib::gaf::sort_gaf_file;
use gafsort_lib::graph::read_gfa;
use gafsort_lib::sort::{CancelFlag, ExternalSorter, topological_ranks};

#[test]
fn test_cyclic_graph_rejected_before_any_record_work() {
    let dir = tempfile::tempdir().unwrap();
    let gfa = write_file(
        dir.path(),
        "cyclic.gfa",
        "S\tA\tACGT\nS\tB\tACGT\nS\tC\tACGT\nL\tA\t+\tB\t+\t0M\nL\tB\t+\tC\t+\t0M\nL\tC\t+\tA\t+\t0M\n",
    );
    let graph = read_gfa(&gfa).unwrap();
    let err = topological_ranks(&graph).unwrap_err();
    assert!(matches!(err, GafSortError::CycleDetected { remaining: 3 }));
}

#[test]
fn test_unknown_anchor_is_fatal_and_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A", "B"]));
    let input_lines =
        [gaf_line("r1", ">A", 1), gaf_line("r2", ">ghost", 2), gaf_line("r3", ">B", 3)];
    let input = write_file(dir.path(), "input.gaf", &(input_lines.join("\n") + "\n"));
    let output = dir.path().join("output.gaf");

    let graph = read_gfa(&gfa).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    let sorter = ExternalSorter::new().temp_dir(tmp.path().to_path_buf());
    let err = sort_gaf_file(&graph, &ranks, &input, &output, &sorter).unwrap_err();

    match err {
        GafSortError::UnknownNode { node } => assert_eq!(node, "ghost"),
        other => panic!("expected UnknownNode, got {other:?}"),
    }
    assert!(!output.exists(), "partial output left behind");
    assert!(dir_is_empty(tmp.path()), "temp files left behind");
}

#[test]
fn test_unknown_anchor_fatal_even_when_spilling() {
    // The bad record sits in a late chunk; earlier chunks must be cleaned up.
    let dir = tempfile::tempdir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A", "B"]));
    let mut lines: Vec<String> = (0..20).map(|i| gaf_line(&format!("r{i}"), ">A", i)).collect();
    lines.push(gaf_line("bad", ">nope", 0));
    let input = write_file(dir.path(), "input.gaf", &(lines.join("\n") + "\n"));
    let output = dir.path().join("output.gaf");

    let graph = read_gfa(&gfa).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    let sorter =
        ExternalSorter::new().chunk_capacity(4).temp_dir(tmp.path().to_path_buf());
    let err = sort_gaf_file(&graph, &ranks, &input, &output, &sorter).unwrap_err();

    assert!(matches!(err, GafSortError::UnknownNode { .. }));
    assert!(!output.exists());
    assert!(dir_is_empty(tmp.path()));
}

#[test]
fn test_malformed_record_reports_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A"]));
    let content = format!("{}\nnot\ta\tvalid\tgaf\tline\n", gaf_line("r1", ">A", 0));
    let input = write_file(dir.path(), "input.gaf", &content);
    let output = dir.path().join("output.gaf");

    let graph = read_gfa(&gfa).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    let err =
        sort_gaf_file(&graph, &ranks, &input, &output, &ExternalSorter::new()).unwrap_err();

    assert!(matches!(err, GafSortError::InvalidRecord { line: 2, .. }));
    assert!(!output.exists());
}

#[test]
fn test_malformed_gfa_reports_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", "S\tA\tACGT\nL\tA\t+\n");
    let err = read_gfa(&gfa).unwrap_err();
    assert!(matches!(err, GafSortError::InvalidGraph { line: 2, .. }));
}

#[test]
fn test_cancellation_cleans_temp_dir() {
    let dir = tempfile::tempdir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A", "B"]));
    let lines: Vec<String> = (0..50).map(|i| gaf_line(&format!("r{i}"), ">A", i)).collect();
    let input = write_file(dir.path(), "input.gaf", &(lines.join("\n") + "\n"));
    let output = dir.path().join("output.gaf");

    let graph = read_gfa(&gfa).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let sorter = ExternalSorter::new()
        .chunk_capacity(4)
        .temp_dir(tmp.path().to_path_buf())
        .cancel_flag(cancel);
    let err = sort_gaf_file(&graph, &ranks, &input, &output, &sorter).unwrap_err();

    assert!(matches!(err, GafSortError::Cancelled));
    assert!(!output.exists());
    assert!(dir_is_empty(tmp.path()));
}
