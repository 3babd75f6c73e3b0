//! Sort-order verification tests.

use crate::helpers::{chain_gfa, gaf_line, write_file};
use gafsort_lib::gaf::{GafReader, count_order_violations, keyed_stream, sort_gaf_file};
use gafsort_lib::graph::read_gfa;
use gafsort_lib::sort::{ExternalSorter, topological_ranks};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn verify(graph_path: &Path, gaf_path: &Path) -> (u64, u64) {
    let graph = read_gfa(graph_path).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    let reader = GafReader::new(BufReader::new(File::open(gaf_path).unwrap()));
    let report = count_order_violations(keyed_stream(reader, &graph, &ranks)).unwrap();
    (report.total_records, report.violations)
}

#[test]
fn test_sorted_output_passes_verification() {
    let dir = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A", "B", "C", "D"]));
    let lines = [
        gaf_line("r1", ">C", 5),
        gaf_line("r2", ">A", 2),
        gaf_line("r3", ">D", 0),
        gaf_line("r4", ">B", 9),
    ];
    let input = write_file(dir.path(), "input.gaf", &(lines.join("\n") + "\n"));
    let output = dir.path().join("sorted.gaf");

    let graph = read_gfa(&gfa).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    sort_gaf_file(&graph, &ranks, &input, &output, &ExternalSorter::new()).unwrap();

    let (total, violations) = verify(&gfa, &output);
    assert_eq!(total, 4);
    assert_eq!(violations, 0);
}

#[test]
fn test_shuffled_input_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A", "B", "C"]));
    let lines = [gaf_line("r1", ">C", 0), gaf_line("r2", ">A", 0), gaf_line("r3", ">B", 0)];
    let input = write_file(dir.path(), "shuffled.gaf", &(lines.join("\n") + "\n"));

    let (total, violations) = verify(&gfa, &input);
    assert_eq!(total, 3);
    assert!(violations > 0);
}

#[test]
fn test_equal_coordinates_do_not_count_as_violations() {
    let dir = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A"]));
    let lines = [gaf_line("r1", ">A", 3), gaf_line("r2", ">A", 3), gaf_line("r3", ">A", 3)];
    let input = write_file(dir.path(), "equal.gaf", &(lines.join("\n") + "\n"));

    let (total, violations) = verify(&gfa, &input);
    assert_eq!(total, 3);
    assert_eq!(violations, 0);
}
