//! End-to-end sort pipeline tests: GFA in, ranked, spilled, merged, GAF out.

use crate::helpers::{chain_gfa, dir_is_empty, gaf_line, read_lines, write_file};
use gafsort_lib::gaf::sort_gaf_file;
use gafsort_lib::graph::read_gfa;
use gafsort_lib::sort::{ExternalSorter, topological_ranks};
use std::path::Path;

/// Sort `input_lines` against a chain graph over `names`, returning the
/// output lines. `chunk_capacity` controls spilling; temp files go under
/// `tmp`.
fn run_sort(
    names: &[&str],
    input_lines: &[String],
    chunk_capacity: usize,
    dir: &Path,
    tmp: &Path,
) -> Vec<String> {
    let gfa = write_file(dir, "graph.gfa", &chain_gfa(names));
    let input = write_file(dir, "input.gaf", &(input_lines.join("\n") + "\n"));
    let output = dir.join("output.gaf");

    let graph = read_gfa(&gfa).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    let sorter = ExternalSorter::new()
        .chunk_capacity(chunk_capacity)
        .temp_dir(tmp.to_path_buf());
    let stats = sort_gaf_file(&graph, &ranks, &input, &output, &sorter).unwrap();

    assert_eq!(stats.total_records, input_lines.len() as u64);
    assert_eq!(stats.output_records, stats.total_records);
    read_lines(&output)
}

#[test]
fn test_scenario_chain_graph() {
    // Graph A→B→C→D (ranks 0..3); records anchored at (C,5),(A,2),(A,1),
    // (D,0),(B,9) in that order must come out (A,1),(A,2),(B,9),(C,5),(D,0).
    let input = vec![
        gaf_line("r1", ">C", 5),
        gaf_line("r2", ">A", 2),
        gaf_line("r3", ">A", 1),
        gaf_line("r4", ">D", 0),
        gaf_line("r5", ">B", 9),
    ];
    let expected = vec![
        gaf_line("r3", ">A", 1),
        gaf_line("r2", ">A", 2),
        gaf_line("r5", ">B", 9),
        gaf_line("r1", ">C", 5),
        gaf_line("r4", ">D", 0),
    ];

    // Same output whether the sort spills (capacity 2) or not (capacity 100).
    for capacity in [2usize, 100] {
        let dir = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let output = run_sort(&["A", "B", "C", "D"], &input, capacity, dir.path(), tmp.path());
        assert_eq!(output, expected, "capacity {capacity}");
        assert!(dir_is_empty(tmp.path()), "temp files left behind at capacity {capacity}");
    }
}

#[test]
fn test_chunk_capacity_invariance() {
    let names: Vec<String> = (0..20).map(|i| format!("s{i:02}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

    // Records in scrambled anchor order with varying offsets.
    let n = 50usize;
    let input: Vec<String> = (0..n)
        .map(|i| {
            let anchor = &names[(i * 7) % names.len()];
            gaf_line(&format!("r{i}"), &format!(">{anchor}"), ((i * 13) % 17) as u64)
        })
        .collect();

    let mut outputs = Vec::new();
    for capacity in [1, 2, n / 2, n, n + 1] {
        let dir = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        outputs.push(run_sort(&name_refs, &input, capacity, dir.path(), tmp.path()));
    }
    for other in &outputs[1..] {
        assert_eq!(&outputs[0], other);
    }
}

#[test]
fn test_stability_for_equal_coordinates() {
    // All records share (anchor, offset): output must preserve input order,
    // at every capacity.
    let input: Vec<String> = (0..12).map(|i| gaf_line(&format!("r{i:02}"), ">B", 7)).collect();
    for capacity in [1usize, 3, 100] {
        let dir = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let output = run_sort(&["A", "B", "C"], &input, capacity, dir.path(), tmp.path());
        assert_eq!(output, input, "capacity {capacity}");
    }
}

#[test]
fn test_idempotence() {
    let input = vec![
        gaf_line("r1", ">C", 5),
        gaf_line("r2", ">A", 2),
        gaf_line("r3", ">A", 1),
        gaf_line("r4", ">B", 9),
    ];
    let dir = tempfile::tempdir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let sorted = run_sort(&["A", "B", "C"], &input, 2, dir.path(), tmp.path());

    let dir2 = tempfile::tempdir().unwrap();
    let tmp2 = tempfile::tempdir().unwrap();
    let resorted = run_sort(&["A", "B", "C"], &sorted, 2, dir2.path(), tmp2.path());
    assert_eq!(sorted, resorted);
}

#[test]
fn test_empty_input_is_valid_success() {
    let dir = tempfile::tempdir().unwrap();
    let gfa = write_file(dir.path(), "graph.gfa", &chain_gfa(&["A", "B"]));
    let input = write_file(dir.path(), "input.gaf", "");
    let output = dir.path().join("output.gaf");

    let graph = read_gfa(&gfa).unwrap();
    let ranks = topological_ranks(&graph).unwrap();
    let stats =
        sort_gaf_file(&graph, &ranks, &input, &output, &ExternalSorter::new()).unwrap();

    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.output_records, 0);
    assert_eq!(stats.chunks_written, 0);
    assert!(output.exists());
    assert!(read_lines(&output).is_empty());
}

#[test]
fn test_large_input_many_chunks() {
    let names: Vec<String> = (0..10).map(|i| format!("n{i}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let n = 1000usize;
    let input: Vec<String> = (0..n)
        .map(|i| {
            let anchor = &names[(i * 3) % names.len()];
            gaf_line(&format!("r{i:04}"), &format!(">{anchor}"), (i % 29) as u64)
        })
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    let output = run_sort(&name_refs, &input, 64, dir.path(), tmp.path());

    assert_eq!(output.len(), n);
    assert!(dir_is_empty(tmp.path()));

    // Spot-check ordering: recover (anchor index, offset) from each line.
    let coord = |line: &String| {
        let cols: Vec<&str> = line.split('\t').collect();
        let anchor = cols[5].trim_start_matches('>').to_string();
        let idx = names.iter().position(|n| *n == anchor).unwrap();
        let offset: u64 = cols[7].parse().unwrap();
        (idx, offset)
    };
    assert!(output.windows(2).all(|w| coord(&w[0]) <= coord(&w[1])));
}
