use bytes::{Bytes, BytesMut};
use std::time::{Duration, Instant};

pub const VIDEO_MIME_TYPE: &str = "video/webm";

/// Ordered, append-only buffer of recorded chunks.
#[derive(Debug)]
pub struct RecordingBuffer {
    chunks: Vec<Bytes>,
    total_bytes: usize,
    discarded_empty: u64,
    started_at: Instant,
}

/// Summary of a finished recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingStats {
    /// Number of non-empty chunks assembled
    pub chunks: usize,
    /// Zero-length chunks that were dropped on arrival
    pub discarded_empty: u64,
    /// Total assembled size
    pub bytes: usize,
    /// Wall time between buffer creation and finish
    pub duration: Duration,
}

impl Default for RecordingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBuffer {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            total_bytes: 0,
            discarded_empty: 0,
            started_at: Instant::now(),
        }
    }

    /// Append a chunk. Returns false when the chunk was empty and dropped.
    pub fn push(&mut self, chunk: Bytes) -> bool {
        if chunk.is_empty() {
            self.discarded_empty += 1;
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Concatenate all chunks in arrival order, consuming the buffer.
    pub fn finish(self) -> (Bytes, RecordingStats) {
        let mut out = BytesMut::with_capacity(self.total_bytes);
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        let stats = RecordingStats {
            chunks: self.chunks.len(),
            discarded_empty: self.discarded_empty,
            bytes: self.total_bytes,
            duration: self.started_at.elapsed(),
        };
        (out.freeze(), stats)
    }
}
