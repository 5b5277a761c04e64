//! Splitting payloads into transfer chunks.
//!
//! Both the server (download) and the client (upload) cut a payload into
//! [`CHUNK_SIZE`](crate::constants::CHUNK_SIZE) slices in original-offset order. The last
//! chunk may be shorter; an empty payload yields no chunks at all.

use bytes::Bytes;

/// Cursor yielding consecutive, zero-copy chunks of a payload.
#[derive(Debug, Clone)]
pub struct ChunkCursor {
    data: Bytes,
    offset: usize,
    chunk_size: usize,
}

impl ChunkCursor {
    /// Create a cursor over `data`.
    ///
    /// A `chunk_size` of zero is treated as one byte so the cursor always makes progress.
    pub fn new(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            offset: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Total payload length in bytes.
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Number of chunks the full payload splits into.
    pub fn chunk_count(&self) -> usize {
        self.data.len().div_ceil(self.chunk_size)
    }
}

impl Iterator for ChunkCursor {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.offset >= self.data.len() {
            return None;
        }
        let end = (self.offset + self.chunk_size).min(self.data.len());
        let chunk = self.data.slice(self.offset..end);
        self.offset = end;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.remaining().div_ceil(self.chunk_size);
        (left, Some(left))
    }
}

impl ExactSizeIterator for ChunkCursor {}
