//! Sync triple and filler detection.

use capdemux_stream::{sync_field, WordStream, FILLER};

/// Marker fields of a sync triple, in stream order.
pub const SYNC_PATTERN: [u8; 3] = [0, 1, 0];

/// Number of words in a sync triple.
pub const SYNC_LEN: usize = SYNC_PATTERN.len();

/// Locates frame boundaries in a [`WordStream`].
///
/// The device emits no fixed alignment at power-on, so the scan is linear
/// from wherever the caller starts.
#[derive(Debug, Clone, Copy)]
pub struct FrameSynchronizer {
    pattern: [u8; SYNC_LEN],
}

impl FrameSynchronizer {
    /// Synchronizer for the `0, 1, 0` triple.
    pub fn new() -> Self {
        Self::with_pattern(SYNC_PATTERN)
    }

    /// Synchronizer for an arbitrary marker-field triple.
    pub fn with_pattern(pattern: [u8; SYNC_LEN]) -> Self {
        Self { pattern }
    }

    /// First index the scan does not test: `len - 2`, leaving room for the
    /// three-word lookahead.
    pub fn scan_limit(&self, stream: &WordStream) -> usize {
        stream.len().saturating_sub(2)
    }

    /// Returns true if words `index..index + 3` form a sync triple.
    pub fn is_sync_triple(&self, stream: &WordStream, index: usize) -> bool {
        index + SYNC_LEN <= stream.len()
            && self
                .pattern
                .iter()
                .enumerate()
                .all(|(offset, &field)| sync_field(stream[index + offset]) == field)
    }

    /// Returns true if words `index` and `index + 1` are both filler.
    pub fn is_filler_pair(&self, stream: &WordStream, index: usize) -> bool {
        stream.get(index) == Some(FILLER) && stream.get(index + 1) == Some(FILLER)
    }

    /// Index of the first sync triple at or after `start`.
    pub fn locate(&self, stream: &WordStream, start: usize) -> Option<usize> {
        (start..self.scan_limit(stream)).find(|&i| self.is_sync_triple(stream, i))
    }

    /// Index of the first sync triple at or after `start`, or the scan limit
    /// when there is none.
    ///
    /// A missing triple is not a failure; callers proceed from the returned
    /// position. `start` is returned unchanged if it is already past the limit.
    pub fn find_sync(&self, stream: &WordStream, start: usize) -> usize {
        self.locate(stream, start)
            .unwrap_or_else(|| self.scan_limit(stream).max(start))
    }
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
