//! GAF record reading and writing.
//!
//! GAF (Graph Alignment Format) is a 12-column tab-separated text format;
//! column 6 is the path through the graph and column 8 the alignment start
//! offset on that path. The sort engine only needs the anchor node (first
//! node of the path) and that offset, so parsing stops there: the rest of
//! the line is carried as an opaque payload and written back byte-for-byte.
//!
//! Path syntax handled here:
//! - oriented segment lists, e.g. `>s1>s2<s3` — the anchor is the first
//!   segment name regardless of orientation
//! - a bare stable name, e.g. `chr1` — the whole column is the anchor

use crate::errors::{GafSortError, Result};
use crate::graph::Graph;
use crate::sort::external::{ExternalSorter, RecordSink, SortStats};
use crate::sort::keys::{SortKey, extract_key};
use crate::sort::order::RankTable;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Buffer size for reading input GAF and writing sorted output.
const IO_BUFFER_SIZE: usize = 256 * 1024;

/// Column index of the path field (0-based).
const PATH_COLUMN: usize = 5;
/// Column index of the path start offset (0-based).
const PATH_START_COLUMN: usize = 7;
/// Number of mandatory GAF columns.
const MANDATORY_COLUMNS: usize = 12;

/// One parsed GAF record: the raw line plus its extracted sort coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GafRecord {
    /// The raw line, without the trailing newline. Never mutated.
    pub payload: Vec<u8>,
    /// Name of the anchor node (first node of the path column).
    pub anchor: String,
    /// Alignment start offset within the anchor node.
    pub offset: u64,
}

/// Extract the first node name from a GAF path column.
fn anchor_from_path(path: &str) -> Option<&str> {
    let mut chars = path.char_indices();
    match chars.next() {
        Some((_, '>' | '<')) => {
            let rest = &path[1..];
            let end = rest.find(['>', '<']).unwrap_or(rest.len());
            let name = &rest[..end];
            if name.is_empty() { None } else { Some(name) }
        }
        Some(_) => Some(path),
        None => None,
    }
}

/// Parse one GAF line.
///
/// # Errors
///
/// Returns [`GafSortError::InvalidRecord`] (with the 1-based line number)
/// when the line has fewer than 12 columns, an empty or non-UTF-8 path, or
/// a non-numeric path start.
pub fn parse_gaf_line(line: &[u8], line_number: u64) -> Result<GafRecord> {
    let invalid = |reason: String| GafSortError::InvalidRecord { line: line_number, reason };

    let mut path: Option<&[u8]> = None;
    let mut path_start: Option<&[u8]> = None;
    let mut count = 0usize;
    for (idx, column) in line.split(|&b| b == b'\t').enumerate() {
        match idx {
            PATH_COLUMN => path = Some(column),
            PATH_START_COLUMN => path_start = Some(column),
            _ => {}
        }
        count = idx + 1;
        if count >= MANDATORY_COLUMNS {
            break;
        }
    }
    if count < MANDATORY_COLUMNS {
        return Err(invalid(format!("expected {MANDATORY_COLUMNS} columns, found {count}")));
    }

    let path = std::str::from_utf8(path.expect("path column counted"))
        .map_err(|_| invalid("path column is not valid UTF-8".to_string()))?;
    let anchor = anchor_from_path(path)
        .ok_or_else(|| invalid("empty path column".to_string()))?
        .to_string();

    let start = path_start.expect("path start column counted");
    let offset = std::str::from_utf8(start)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| {
            invalid(format!("invalid path start '{}'", String::from_utf8_lossy(start)))
        })?;

    Ok(GafRecord { payload: line.to_vec(), anchor, offset })
}

/// Streaming reader over a GAF file.
///
/// Yields records in original input order; blank lines are skipped. I/O
/// errors surface as [`GafSortError::InputIo`], malformed lines as
/// [`GafSortError::InvalidRecord`].
pub struct GafReader<R: BufRead> {
    inner: R,
    line_number: u64,
    buf: Vec<u8>,
}

impl<R: BufRead> GafReader<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self { inner, line_number: 0, buf: Vec::new() }
    }
}

impl<R: BufRead> Iterator for GafReader<R> {
    type Item = Result<GafRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(source) => return Some(Err(GafSortError::InputIo { source })),
            }
            self.line_number += 1;
            // Strip the line terminator; keep payload bytes otherwise intact.
            if self.buf.last() == Some(&b'\n') {
                self.buf.pop();
            }
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
            if self.buf.is_empty() {
                continue;
            }
            return Some(parse_gaf_line(&self.buf, self.line_number));
        }
    }
}

/// Adapt a GAF record stream into the keyed `(SortKey, payload)` stream the
/// engine consumes, assigning input sequence numbers as it goes.
pub fn keyed_stream<'a, I>(
    records: I,
    graph: &'a Graph,
    ranks: &'a RankTable,
) -> impl Iterator<Item = Result<(SortKey, Vec<u8>)>> + 'a
where
    I: IntoIterator<Item = Result<GafRecord>> + 'a,
{
    records.into_iter().enumerate().map(move |(seq, result)| {
        let record = result?;
        let key = extract_key(graph, ranks, &record.anchor, record.offset, seq as u64)?;
        Ok((key, record.payload))
    })
}

/// Writes the merged record stream as GAF lines.
pub struct GafWriter<W: Write> {
    inner: W,
    records: u64,
}

impl<W: Write> GafWriter<W> {
    /// Wrap a writer (callers supply buffering).
    pub fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Flush buffered output.
    ///
    /// # Errors
    ///
    /// Returns [`GafSortError::OutputIo`] on flush failure.
    pub fn finish(mut self) -> Result<u64> {
        self.inner.flush().map_err(|source| GafSortError::OutputIo { source })?;
        Ok(self.records)
    }
}

impl<W: Write> RecordSink for GafWriter<W> {
    fn write_record(&mut self, payload: &[u8]) -> Result<()> {
        self.inner.write_all(payload).map_err(|source| GafSortError::OutputIo { source })?;
        self.inner.write_all(b"\n").map_err(|source| GafSortError::OutputIo { source })?;
        self.records += 1;
        Ok(())
    }
}

/// Sort a GAF file end to end: read `input`, sort by the graph's
/// topological order, and write `output`.
///
/// On any failure the partially written output file is removed before the
/// error returns, so callers never observe a half-sorted file; the sorter's
/// temp chunks are cleaned up by its own session.
///
/// # Errors
///
/// Propagates every engine and collaborator error ([`GafSortError`]).
pub fn sort_gaf_file(
    graph: &Graph,
    ranks: &RankTable,
    input: &Path,
    output: &Path,
    sorter: &ExternalSorter,
) -> Result<SortStats> {
    let in_file = File::open(input).map_err(|source| GafSortError::InputIo { source })?;
    let reader = GafReader::new(BufReader::with_capacity(IO_BUFFER_SIZE, in_file));

    let out_file = File::create(output).map_err(|source| GafSortError::OutputIo { source })?;
    let mut writer = GafWriter::new(BufWriter::with_capacity(IO_BUFFER_SIZE, out_file));

    let result = sorter
        .sort(keyed_stream(reader, graph, ranks), &mut writer)
        .and_then(|stats| writer.finish().map(|_| stats));
    match result {
        Ok(stats) => Ok(stats),
        Err(e) => {
            // Never leave a partial output behind.
            let _ = std::fs::remove_file(output);
            Err(e)
        }
    }
}

/// Outcome of a sort-order verification pass.
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Records checked.
    pub total_records: u64,
    /// Number of records whose key was below their predecessor's.
    pub violations: u64,
    /// 1-based record number of the first violation, if any.
    pub first_violation: Option<u64>,
}

/// Check that a keyed record stream is in ascending key order.
///
/// The sequence number is monotone over the input, so a key below its
/// predecessor means `(rank, offset)` went backwards.
///
/// # Errors
///
/// Propagates stream errors; an out-of-order file is reported in the
/// [`VerifyReport`], not as an error.
pub fn count_order_violations<I>(records: I) -> Result<VerifyReport>
where
    I: IntoIterator<Item = Result<(SortKey, Vec<u8>)>>,
{
    let mut report = VerifyReport::default();
    let mut prev_key: Option<SortKey> = None;
    for result in records {
        let (key, _) = result?;
        report.total_records += 1;
        if let Some(prev) = prev_key {
            if key < prev {
                report.violations += 1;
                if report.first_violation.is_none() {
                    report.first_violation = Some(report.total_records);
                }
            }
        }
        prev_key = Some(key);
    }
    Ok(report)
}
