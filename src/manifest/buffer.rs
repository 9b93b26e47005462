//! Capped receive buffer for HTTP response bodies
//!
//! Accumulates body chunks up to a fixed capacity. A body that fills or
//! overruns the capacity marks the buffer saturated; saturated content must be
//! treated as truncated and rejected.

use heapless::Vec;

/// Receiver of HTTP body bytes as they arrive
pub trait BodySink {
    /// Called once per received chunk, in order
    fn on_data(&mut self, chunk: &[u8]);
}

/// Fixed-capacity body buffer with overflow tracking
pub struct ResponseBuffer<const N: usize> {
    buffer: Vec<u8, N>,
    saturated: bool,
    received: usize,
}

impl<const N: usize> ResponseBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            saturated: false,
            received: 0,
        }
    }

    /// Append a chunk, copying at most the remaining capacity
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.received = self.received.saturating_add(chunk.len());

        let room = N - self.buffer.len();
        if chunk.len() >= room {
            // Full or overrun, keep what fits and flag it
            self.saturated = true;
        }

        let take = core::cmp::min(room, chunk.len());
        // Cannot fail, `take` never exceeds the remaining capacity
        let _ = self.buffer.extend_from_slice(&chunk[..take]);
    }

    /// Bytes held in the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns true if the body filled or overran the capacity
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// Total bytes offered, including any that did not fit
    pub fn received(&self) -> usize {
        self.received
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum number of bytes held
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Discard contents and saturation state
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.saturated = false;
        self.received = 0;
    }
}

impl<const N: usize> BodySink for ResponseBuffer<N> {
    fn on_data(&mut self, chunk: &[u8]) {
        self.push_chunk(chunk);
    }
}

impl<const N: usize> Default for ResponseBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
