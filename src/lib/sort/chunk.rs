//! Temp-chunk record codec.
//!
//! Chunk files use a deliberately simpler encoding than the output format:
//! each record is its 24-byte [`SortKey`] followed by a `u32` little-endian
//! payload length and the raw payload bytes. Keys are stored rather than
//! re-derived at merge time so the stability sequence number survives the
//! spill.

use crate::sort::keys::SortKey;
use std::io::{Read, Write};

/// Writes `(key, payload)` records to a chunk file.
pub struct ChunkWriter<W: Write> {
    inner: W,
    records: u64,
}

impl<W: Write> ChunkWriter<W> {
    /// Wrap a writer (callers supply buffering).
    pub fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Append one record.
    pub fn write_record(&mut self, key: &SortKey, payload: &[u8]) -> std::io::Result<()> {
        key.write_to(&mut self.inner)?;
        let len = u32::try_from(payload.len())
            .map_err(|_| std::io::Error::other("record payload exceeds u32 length"))?;
        self.inner.write_all(&len.to_le_bytes())?;
        self.inner.write_all(payload)?;
        self.records += 1;
        Ok(())
    }

    /// Flush and return the record count.
    pub fn finish(mut self) -> std::io::Result<u64> {
        self.inner.flush()?;
        Ok(self.records)
    }
}

/// Reads `(key, payload)` records back from a chunk file.
pub struct ChunkReader<R: Read> {
    inner: R,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap a reader (callers supply buffering).
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Decode the next record, reusing `payload` as the destination buffer.
    ///
    /// Returns `Ok(None)` at a clean end of file. A file that ends mid-record
    /// is an error, not EOF.
    pub fn read_record(&mut self, payload: &mut Vec<u8>) -> std::io::Result<Option<SortKey>> {
        let mut key_buf = [0u8; SortKey::SERIALIZED_SIZE];
        // Distinguish clean EOF (zero bytes) from a truncated key.
        let first = self.inner.read(&mut key_buf)?;
        if first == 0 {
            return Ok(None);
        }
        self.inner.read_exact(&mut key_buf[first..])?;
        let key = SortKey::read_from(&mut key_buf.as_slice())?;

        let mut len_buf = [0u8; 4];
        self.inner.read_exact(&mut len_buf)?;
        let len = u32::from_le_bytes(len_buf) as usize;

        payload.clear();
        payload.resize(len, 0);
        self.inner.read_exact(payload)?;
        Ok(Some(key))
    }
}
