//! Scoped ownership of on-disk chunk files.
//!
//! A [`SortSession`] owns every temp file created during one sort
//! invocation. Chunk files are deleted the moment their merge cursor is
//! exhausted; whatever is still on disk when the session drops (error,
//! panic, cancellation, or plain scope exit) is removed then, so no chunk
//! file outlives its invocation on any exit path. The `retain` flag keeps
//! everything for diagnosis.

use crate::errors::{GafSortError, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Buffer size for chunk file writes.
const CHUNK_WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Metadata for one spilled chunk.
#[derive(Debug)]
struct ChunkFile {
    path: PathBuf,
    records: u64,
    removed: bool,
}

/// Scoped manager for the temp files of a single sort invocation.
pub struct SortSession {
    /// Owns the directory; `None` when `retain` detached it.
    dir: Option<TempDir>,
    dir_path: PathBuf,
    chunks: Vec<ChunkFile>,
    retain: bool,
}

impl SortSession {
    /// Create a session with a fresh unique directory under `base`
    /// (or the platform temp location when `base` is `None`).
    pub fn new(base: Option<&Path>, retain: bool) -> Result<Self> {
        let dir = match base {
            Some(base) => {
                std::fs::create_dir_all(base)
                    .map_err(|source| GafSortError::ChunkIo { source })?;
                TempDir::new_in(base).map_err(|source| GafSortError::ChunkIo { source })?
            }
            None => TempDir::new().map_err(|source| GafSortError::ChunkIo { source })?,
        };
        let dir_path = dir.path().to_path_buf();
        debug!("Chunk directory: {}", dir_path.display());

        if retain {
            // Detach so neither files nor the directory are removed on drop.
            let dir_path = dir.keep();
            info!("Retaining intermediate files in {}", dir_path.display());
            return Ok(Self { dir: None, dir_path, chunks: Vec::new(), retain });
        }
        Ok(Self { dir: Some(dir), dir_path, chunks: Vec::new(), retain })
    }

    /// Create the next chunk file, returning its index and a buffered writer.
    pub fn create_chunk(&mut self) -> Result<(usize, BufWriter<File>)> {
        let idx = self.chunks.len();
        let path = self.dir_path.join(format!("chunk_{idx:04}.gsc"));
        let file = File::create(&path).map_err(|source| GafSortError::ChunkIo { source })?;
        self.chunks.push(ChunkFile { path, records: 0, removed: false });
        Ok((idx, BufWriter::with_capacity(CHUNK_WRITE_BUFFER_SIZE, file)))
    }

    /// Record how many records a finished chunk holds.
    pub fn set_records(&mut self, idx: usize, records: u64) {
        self.chunks[idx].records = records;
    }

    /// Number of chunks created so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Path of a chunk file.
    #[must_use]
    pub fn chunk_path(&self, idx: usize) -> &Path {
        &self.chunks[idx].path
    }

    /// Record count of a chunk file.
    #[must_use]
    pub fn chunk_records(&self, idx: usize) -> u64 {
        self.chunks[idx].records
    }

    /// Delete a fully consumed chunk file to bound peak disk usage.
    ///
    /// A no-op when the session retains intermediate files.
    pub fn remove_chunk(&mut self, idx: usize) -> Result<()> {
        let chunk = &mut self.chunks[idx];
        if self.retain || chunk.removed {
            return Ok(());
        }
        std::fs::remove_file(&chunk.path).map_err(|source| GafSortError::ChunkIo { source })?;
        chunk.removed = true;
        debug!("Removed exhausted chunk {}", chunk.path.display());
        Ok(())
    }
}

impl Drop for SortSession {
    fn drop(&mut self) {
        if self.retain {
            return;
        }
        for chunk in &mut self.chunks {
            if !chunk.removed {
                if let Err(e) = std::fs::remove_file(&chunk.path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove chunk {}: {e}", chunk.path.display());
                    }
                }
                chunk.removed = true;
            }
        }
        // Dropping the TempDir removes the directory itself.
        drop(self.dir.take());
    }
}
