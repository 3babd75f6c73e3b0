//! External merge-sort engine for graph-anchored records.
//!
//! Handles record streams larger than available RAM by spilling sorted
//! chunks to temporary files and k-way merging them into one ordered output
//! stream.
//!
//! # Algorithm
//!
//! 1. **Accumulate phase**: buffer keyed records until the chunk capacity
//!    is reached
//! 2. **Sort phase**: sort the batch (rayon when threads > 1)
//! 3. **Spill phase**: write the sorted batch to a chunk file
//! 4. **Merge phase**: k-way merge over chunk cursors using a binary heap
//!
//! Records are opaque payloads paired with a pre-extracted [`SortKey`]; the
//! engine never parses or mutates payload bytes. An input that fits within
//! one chunk capacity is spilled as a single chunk and read back through the
//! same merge loop, so every input size takes one code path and the chunk
//! count is always `ceil(N / capacity)`. Every failure (including
//! cancellation) unwinds through the [`SortSession`], which deletes all
//! outstanding chunk files before the error reaches the caller.

use crate::errors::{GafSortError, Result};
use crate::progress::ProgressTracker;
use crate::sort::chunk::{ChunkReader, ChunkWriter};
use crate::sort::keys::SortKey;
use crate::sort::session::SortSession;
use log::info;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default chunk capacity in records (~10^6 records per spill).
pub const DEFAULT_CHUNK_CAPACITY: usize = 1_000_000;

/// Buffer size for reading chunk files during merge.
const MERGE_BUFFER_SIZE: usize = 64 * 1024;

/// Destination for the merged record stream.
///
/// The final output writer is a collaborator: the engine emits payloads in
/// comparator order and never sees the destination format.
pub trait RecordSink {
    /// Write one record payload.
    fn write_record(&mut self, payload: &[u8]) -> Result<()>;
}

/// Cooperative cancellation handle.
///
/// Checked at stage boundaries and at every record processed during spill
/// and merge, bounding the latency to abort. Cancellation runs the same
/// temp-file cleanup as an error.
#[derive(Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a flag in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() { Err(GafSortError::Cancelled) } else { Ok(()) }
    }
}

/// Statistics from a sort invocation.
#[derive(Default, Debug)]
pub struct SortStats {
    /// Total records read from input.
    pub total_records: u64,
    /// Records written to output.
    pub output_records: u64,
    /// Number of temporary chunk files written.
    pub chunks_written: usize,
}

/// External sorter for keyed record streams.
pub struct ExternalSorter {
    /// Maximum number of records held in memory at once.
    chunk_capacity: usize,
    /// Base directory for spill files (platform temp dir when `None`).
    temp_dir: Option<PathBuf>,
    /// Number of threads for in-memory batch sorting.
    threads: usize,
    /// Keep chunk files after the invocation, for diagnosis.
    retain_temp: bool,
    /// Cooperative cancellation handle.
    cancel: CancelFlag,
}

impl Default for ExternalSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalSorter {
    /// Create a sorter with the default chunk capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            temp_dir: None,
            threads: 1,
            retain_temp: false,
            cancel: CancelFlag::new(),
        }
    }

    /// Set the chunk capacity in records (minimum 1).
    #[must_use]
    pub fn chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = capacity.max(1);
        self
    }

    /// Set the base directory for spill files.
    #[must_use]
    pub fn temp_dir(mut self, path: PathBuf) -> Self {
        self.temp_dir = Some(path);
        self
    }

    /// Set the number of threads for in-memory batch sorting.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Keep intermediate chunk files instead of deleting them.
    #[must_use]
    pub fn retain_temp(mut self, retain: bool) -> Self {
        self.retain_temp = retain;
        self
    }

    /// Attach a cancellation flag.
    #[must_use]
    pub fn cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sort a keyed record stream into `sink`.
    ///
    /// `records` yields `(key, payload)` pairs in original input order; keys
    /// must already carry the stability sequence number. Output order is the
    /// total [`SortKey`] order over the full input, each record exactly once.
    ///
    /// # Errors
    ///
    /// Propagates input errors and returns [`GafSortError::ChunkIo`],
    /// [`GafSortError::OutputIo`] or [`GafSortError::Cancelled`] from the
    /// engine itself. Every chunk file created during the invocation is
    /// deleted before any error returns.
    pub fn sort<I, S>(&self, records: I, sink: &mut S) -> Result<SortStats>
    where
        I: IntoIterator<Item = Result<(SortKey, Vec<u8>)>>,
        S: RecordSink,
    {
        let mut session = SortSession::new(self.temp_dir.as_deref(), self.retain_temp)?;
        let mut stats = SortStats::default();

        // Phase 1: accumulate and spill sorted chunks.
        let mut batch: Vec<(SortKey, Vec<u8>)> =
            Vec::with_capacity(self.chunk_capacity.min(64 * 1024));
        let progress = ProgressTracker::new("Read records:");

        for result in records {
            self.cancel.check()?;
            let (key, payload) = result?;
            stats.total_records += 1;
            progress.log_if_needed(1);
            batch.push((key, payload));

            if batch.len() >= self.chunk_capacity {
                self.spill_chunk(&mut batch, &mut session)?;
                stats.chunks_written += 1;
            }
        }
        self.cancel.check()?;
        progress.log_final();

        info!("Read {} records total", stats.total_records);

        // Phase 2: spill the final (possibly only) chunk, then k-way merge.
        // An input that fits in memory still goes through the same spill and
        // merge path as one chunk.
        if !batch.is_empty() {
            self.spill_chunk(&mut batch, &mut session)?;
            stats.chunks_written += 1;
        }
        drop(batch);

        if session.chunk_count() == 0 {
            // Empty input: valid success, nothing to merge.
            return Ok(stats);
        }

        info!("Merging {} chunks...", session.chunk_count());
        stats.output_records = self.merge_chunks(&mut session, sink)?;
        Ok(stats)
    }

    /// Sort a batch in place by key (parallel when configured).
    ///
    /// Unstable sort is safe: the sequence number makes every key unique.
    fn sort_batch(&self, batch: &mut [(SortKey, Vec<u8>)]) {
        if self.threads > 1 {
            batch.par_sort_unstable_by_key(|(key, _)| *key);
        } else {
            batch.sort_unstable_by_key(|(key, _)| *key);
        }
    }

    /// Sort the accumulated batch and write it to a new chunk file.
    fn spill_chunk(
        &self,
        batch: &mut Vec<(SortKey, Vec<u8>)>,
        session: &mut SortSession,
    ) -> Result<()> {
        self.sort_batch(batch);

        let (idx, file) = session.create_chunk()?;
        let mut writer = ChunkWriter::new(file);
        for (key, payload) in batch.iter() {
            writer
                .write_record(key, payload)
                .map_err(|source| GafSortError::ChunkIo { source })?;
        }
        let records = writer.finish().map_err(|source| GafSortError::ChunkIo { source })?;
        session.set_records(idx, records);
        info!("Spilled chunk {idx} ({records} records)");

        batch.clear();
        Ok(())
    }

    /// K-way merge of sorted chunk files into the sink.
    fn merge_chunks<S: RecordSink>(
        &self,
        session: &mut SortSession,
        sink: &mut S,
    ) -> Result<u64> {
        let mut cursors: Vec<ChunkCursor> = (0..session.chunk_count())
            .map(|idx| ChunkCursor::open(session, idx))
            .collect::<Result<Vec<_>>>()?;

        // Explicit binary heap over (key, chunk index); min-entry on top.
        let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::with_capacity(cursors.len());
        for cursor in &mut cursors {
            if let Some((key, payload)) = cursor.next()? {
                heap.push(Reverse(HeapEntry { key, payload, chunk_idx: cursor.idx }));
            } else {
                session.remove_chunk(cursor.idx)?;
            }
        }

        let mut merged = 0u64;
        while let Some(Reverse(entry)) = heap.pop() {
            self.cancel.check()?;
            sink.write_record(&entry.payload)?;
            merged += 1;

            let cursor = &mut cursors[entry.chunk_idx];
            if let Some((key, payload)) = cursor.next()? {
                heap.push(Reverse(HeapEntry { key, payload, chunk_idx: cursor.idx }));
            } else {
                // Exhausted: delete immediately to bound peak disk usage.
                session.remove_chunk(cursor.idx)?;
            }
        }

        info!("Merge complete: {merged} records merged");
        Ok(merged)
    }
}

/// Read cursor over one sorted chunk file.
struct ChunkCursor {
    reader: ChunkReader<BufReader<File>>,
    idx: usize,
}

impl ChunkCursor {
    fn open(session: &SortSession, idx: usize) -> Result<Self> {
        let file = File::open(session.chunk_path(idx))
            .map_err(|source| GafSortError::ChunkIo { source })?;
        let reader = ChunkReader::new(BufReader::with_capacity(MERGE_BUFFER_SIZE, file));
        Ok(Self { reader, idx })
    }

    fn next(&mut self) -> Result<Option<(SortKey, Vec<u8>)>> {
        let mut payload = Vec::new();
        match self.reader.read_record(&mut payload) {
            Ok(Some(key)) => Ok(Some((key, payload))),
            Ok(None) => Ok(None),
            Err(source) => Err(GafSortError::ChunkIo { source }),
        }
    }
}

/// Entry in the merge heap.
struct HeapEntry {
    key: SortKey,
    payload: Vec<u8>,
    chunk_idx: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.chunk_idx == other.chunk_idx
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key).then_with(|| self.chunk_idx.cmp(&other.chunk_idx))
    }
}
