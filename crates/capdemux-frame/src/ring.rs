use std::ops::Index;

use capdemux_stream::Word;

use crate::channel::CHANNEL_COUNT;

/// Number of frames retained by a [`FrameRingBuffer`].
pub const RING_DEPTH: usize = 33;

/// One sample per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    /// Samples indexed by channel.
    pub samples: [Word; CHANNEL_COUNT],
}

impl Frame {
    /// Create a frame from 16 samples.
    pub fn new(samples: [Word; CHANNEL_COUNT]) -> Self {
        Self { samples }
    }
}

impl Index<usize> for Frame {
    type Output = Word;

    fn index(&self, channel: usize) -> &Word {
        &self.samples[channel]
    }
}

/// Circular store of the 33 most recent frames.
///
/// Two cursors drive it: the frame cursor (`0..33`) selects the slot being
/// filled and the channel cursor (`0..16`) selects the next sample within it.
/// Writing the sixteenth sample completes the frame, resets the channel cursor
/// and moves the frame cursor on, silently overwriting the oldest frame once
/// the ring is full.
#[derive(Debug, Clone)]
pub struct FrameRingBuffer {
    frames: [Frame; RING_DEPTH],
    frame_cursor: usize,
    channel_cursor: usize,
    completed: u64,
}

impl FrameRingBuffer {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self {
            frames: [Frame::default(); RING_DEPTH],
            frame_cursor: 0,
            channel_cursor: 0,
            completed: 0,
        }
    }

    /// Store one sample at the cursors.
    ///
    /// Returns the sequence number of the frame this sample completed, if any.
    pub fn push(&mut self, word: Word) -> Option<u64> {
        self.frames[self.frame_cursor].samples[self.channel_cursor] = word;
        if self.channel_cursor == CHANNEL_COUNT - 1 {
            self.channel_cursor = 0;
            self.frame_cursor = (self.frame_cursor + 1) % RING_DEPTH;
            let seq = self.completed;
            self.completed += 1;
            Some(seq)
        } else {
            self.channel_cursor += 1;
            None
        }
    }

    /// Slot currently being filled.
    pub fn frame_cursor(&self) -> usize {
        self.frame_cursor
    }

    /// Channel that receives the next sample.
    pub fn channel_cursor(&self) -> usize {
        self.channel_cursor
    }

    /// Number of retained frames, saturating at [`RING_DEPTH`].
    pub fn frames_written(&self) -> usize {
        self.completed.min(RING_DEPTH as u64) as usize
    }

    /// Number of frames completed since creation.
    pub fn total_frames(&self) -> u64 {
        self.completed
    }

    /// Returns true once every slot holds a completed frame.
    pub fn is_primed(&self) -> bool {
        self.completed >= RING_DEPTH as u64
    }

    /// Frame stored in physical slot `slot % RING_DEPTH`.
    pub fn slot(&self, slot: usize) -> &Frame {
        &self.frames[slot % RING_DEPTH]
    }

    /// Frame with sequence number `seq`, modulo the ring depth.
    ///
    /// Sequence numbers older than the ring depth resolve to whichever newer
    /// frame has since overwritten their slot.
    pub fn frame(&self, seq: u64) -> &Frame {
        &self.frames[(seq % RING_DEPTH as u64) as usize]
    }

    /// Most recently completed frame.
    pub fn latest(&self) -> Option<&Frame> {
        self.completed.checked_sub(1).map(|seq| self.frame(seq))
    }

    /// Retained frames, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> + '_ {
        let first = self.completed - self.frames_written() as u64;
        (first..self.completed).map(move |seq| self.frame(seq))
    }

    /// Samples written to the frame in progress.
    pub fn partial(&self) -> &[Word] {
        &self.frames[self.frame_cursor].samples[..self.channel_cursor]
    }
}

impl Default for FrameRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
