//! Sort GAF files by graph topological order.
//!
//! Computes a topological rank for every node of the GFA reference graph,
//! then runs a disk-backed external merge sort over the GAF records keyed by
//! `(anchor rank, offset within node, input order)`. Handles inputs larger
//! than available RAM by spilling sorted chunks to temporary files.
//!
//! Use `--verify` to check whether a GAF file is already correctly sorted
//! without writing any output.

use anyhow::{Result, bail};
use clap::Parser;
use gafsort_lib::gaf::{GafReader, count_order_violations, keyed_stream, sort_gaf_file};
use gafsort_lib::graph::read_gfa;
use gafsort_lib::logging::{OperationTimer, format_count};
use gafsort_lib::sort::{ExternalSorter, topological_ranks};
use gafsort_lib::validation::validate_files_exist;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::commands::command::Command;

/// Buffer size for reading the input GAF during verification.
const IO_BUFFER_SIZE: usize = 256 * 1024;

/// Sort a GAF file by graph topological order.
///
/// Records are ordered by the topological rank of their anchor node (the
/// first node of the path column), then by offset within that node, then by
/// original input order.
#[derive(Debug, Parser)]
#[command(
    name = "sort",
    about = "Sort a GAF file by the topological order of its reference graph",
    long_about = r#"
Sort a GAF file by graph topological order using external merge-sort.

The reference graph (GFA) must be a directed acyclic graph; a cycle is
reported as an error before any record is processed. Records anchored at a
node that is absent from the graph are an error, never silently dropped.

ORDERING:

  1. topological rank of the anchor node (first node of the path column)
  2. alignment start offset on that node
  3. original input order (stable tie-break)

The tie-break among simultaneously-ready graph nodes is fixed (ascending
node ID), so the same graph always yields the same ranks.

EXAMPLES:

  # Sort a GAF against its graph
  gafsort sort -g graph.gfa -i aln.gaf -o sorted.gaf

  # Bound memory to 500k records per chunk, spill to a fast disk
  gafsort sort -g graph.gfa -i aln.gaf -o sorted.gaf \
    --chunk-size 500000 --tmp-dir /scratch

  # Verify a GAF file is correctly sorted
  gafsort sort -g graph.gfa -i sorted.gaf --verify
"#
)]
pub struct Sort {
    /// Reference graph GFA file.
    #[arg(short = 'g', long = "graph")]
    pub graph: PathBuf,

    /// Input GAF file.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output GAF file (required unless --verify is used).
    #[arg(short = 'o', long = "output", conflicts_with = "verify")]
    pub output: Option<PathBuf>,

    /// Verify the input file is correctly sorted (no output written).
    ///
    /// Reads records sequentially and checks that each record's sort key
    /// is >= the previous record's key. Exits 0 if sorted correctly,
    /// non-zero if any records are out of order.
    #[arg(long = "verify", conflicts_with = "output")]
    pub verify: bool,

    /// Maximum number of records held in memory at once.
    ///
    /// When the limit is reached, the sorted chunk is written to a
    /// temporary file and merged at the end.
    #[arg(short = 'c', long = "chunk-size", default_value = "1000000")]
    pub chunk_size: usize,

    /// Temporary directory for intermediate chunk files.
    ///
    /// If not specified, uses the system default temp directory.
    #[arg(short = 'T', long = "tmp-dir")]
    pub tmp_dir: Option<PathBuf>,

    /// Number of threads for parallel in-memory chunk sorting.
    #[arg(short = '@', short_alias = 't', long = "threads", default_value = "1")]
    pub threads: usize,

    /// Keep intermediate chunk files instead of deleting them.
    #[arg(long = "retain-temp", default_value = "false")]
    pub retain_temp: bool,
}

impl Command for Sort {
    fn execute(&self) -> Result<()> {
        validate_files_exist(&[(&self.graph, "Reference graph"), (&self.input, "Input GAF")])?;

        if !self.verify && self.output.is_none() {
            bail!("Either --output or --verify must be specified");
        }
        if self.chunk_size == 0 {
            bail!("--chunk-size must be greater than 0");
        }

        if self.verify {
            return self.execute_verify();
        }
        self.execute_sort()
    }
}

impl Sort {
    /// Execute sort mode: rank the graph, then spill and merge records.
    fn execute_sort(&self) -> Result<()> {
        let output = self.output.as_ref().expect("output required for sort mode");

        let timer = OperationTimer::new("Sorting GAF");

        info!("Starting Sort");
        info!("Graph: {}", self.graph.display());
        info!("Input: {}", self.input.display());
        info!("Output: {}", output.display());
        info!("Chunk size: {} records", format_count(self.chunk_size as u64));
        info!("Threads: {}", self.threads);
        if let Some(ref tmp) = self.tmp_dir {
            info!("Temp directory: {}", tmp.display());
        }
        if self.retain_temp {
            info!("Retaining intermediate files");
        }

        let graph = read_gfa(&self.graph)?;
        let ranks = topological_ranks(&graph)?;
        info!("Ranked {} graph nodes", format_count(ranks.len() as u64));

        let mut sorter =
            ExternalSorter::new().chunk_capacity(self.chunk_size).threads(self.threads);
        if let Some(ref tmp) = self.tmp_dir {
            sorter = sorter.temp_dir(tmp.clone());
        }
        if self.retain_temp {
            sorter = sorter.retain_temp(true);
        }

        let stats = sort_gaf_file(&graph, &ranks, &self.input, output, &sorter)?;

        info!("=== Summary ===");
        info!("Records processed: {}", format_count(stats.total_records));
        info!("Records written: {}", format_count(stats.output_records));
        if stats.chunks_written > 0 {
            info!("Temporary chunks: {}", stats.chunks_written);
        }
        info!("Output: {}", output.display());

        timer.log_completion(stats.total_records);
        Ok(())
    }

    /// Execute verify mode: read records and check sort order.
    fn execute_verify(&self) -> Result<()> {
        let timer = OperationTimer::new("Verifying GAF sort order");

        info!("Starting Sort Verification");
        info!("Graph: {}", self.graph.display());
        info!("Input: {}", self.input.display());

        let graph = read_gfa(&self.graph)?;
        let ranks = topological_ranks(&graph)?;

        let input = File::open(&self.input)?;
        let reader = GafReader::new(BufReader::with_capacity(IO_BUFFER_SIZE, input));
        let report = count_order_violations(keyed_stream(reader, &graph, &ranks))?;

        info!("=== Verification Summary ===");
        info!("Records checked: {}", format_count(report.total_records));
        info!("Sort order violations: {}", report.violations);

        if report.violations > 0 {
            if let Some(record_num) = report.first_violation {
                info!("First violation at record {record_num}");
            }
            timer.log_completion(report.total_records);
            bail!(
                "GAF file is NOT correctly sorted: {} violations found",
                report.violations
            );
        }

        info!("Result: PASS - file is correctly sorted");
        timer.log_completion(report.total_records);
        Ok(())
    }
}
