//! Sort keys for graph-anchored records.
//!
//! A [`SortKey`] is extracted once per record and carried through spill and
//! merge, so the record payload itself is never parsed again after ingest.
//! Keys are fixed-size (24 bytes) when serialized, which keeps temp-file
//! reads O(1) per record during the merge phase.

use crate::errors::{GafSortError, Result};
use crate::graph::Graph;
use crate::sort::order::RankTable;
use std::io::{Read, Write};

/// Total order over graph-anchored records.
///
/// Comparison is by topological rank of the anchor node, then by offset
/// within the node, then by original sequence number. The sequence number is
/// assigned at ingest (0, 1, 2, ...) and exists solely to make the order
/// stable for records with fully equal coordinates; it also makes every key
/// unique, so unstable in-memory sorts are safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    /// Topological rank of the anchor node.
    pub rank: u64,
    /// Offset of the record within its anchor node.
    pub offset: u64,
    /// Original input sequence number (stability tie-break).
    pub seq: u64,
}

impl SortKey {
    /// Size in bytes when serialized.
    pub const SERIALIZED_SIZE: usize = 24;

    /// Serialize the key to a writer (little-endian, fixed size).
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.rank.to_le_bytes())?;
        writer.write_all(&self.offset.to_le_bytes())?;
        writer.write_all(&self.seq.to_le_bytes())
    }

    /// Deserialize a key from a reader. Inverse of [`SortKey::write_to`].
    pub fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut buf = [0u8; Self::SERIALIZED_SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self {
            rank: u64::from_le_bytes(buf[0..8].try_into().expect("8-byte slice")),
            offset: u64::from_le_bytes(buf[8..16].try_into().expect("8-byte slice")),
            seq: u64::from_le_bytes(buf[16..24].try_into().expect("8-byte slice")),
        })
    }
}

/// Build the sort key for a record anchored at `anchor` with the given
/// within-node offset and input sequence number.
///
/// # Errors
///
/// Returns [`GafSortError::UnknownNode`] if the anchor name is absent from
/// the graph. This is fatal for the whole invocation: silently dropping the
/// record would corrupt any coordinate system built on the output.
pub fn extract_key(
    graph: &Graph,
    ranks: &RankTable,
    anchor: &str,
    offset: u64,
    seq: u64,
) -> Result<SortKey> {
    let id = graph
        .node_id(anchor)
        .ok_or_else(|| GafSortError::UnknownNode { node: anchor.to_string() })?;
    Ok(SortKey { rank: ranks.rank(id), offset, seq })
}
