//! Per-channel sample storage.

use capdemux_stream::{DEFAULT_MAX_FILE_SIZE, WORD_SIZE};

use crate::error::{DemuxError, Result};

/// Number of logical channels in a capture.
pub const CHANNEL_COUNT: usize = 16;

/// Default per-channel capacity: one slot per word of a maximum-size capture,
/// plus one.
pub const DEFAULT_CHANNEL_CAPACITY: usize = word_channel_capacity(DEFAULT_MAX_FILE_SIZE);

/// Per-channel capacity that holds every word of a capture of up to
/// `max_file_size` bytes.
pub const fn word_channel_capacity(max_file_size: usize) -> usize {
    max_file_size / WORD_SIZE + 1
}

/// Sample sequences for all 16 channels, in arrival order.
///
/// Every channel owns its own vector. Pushing past `capacity` fails with
/// [`DemuxError::ChannelOverflow`] rather than growing without bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSamples<S> {
    lanes: Vec<Vec<S>>,
    capacity: usize,
}

impl<S: Copy> ChannelSamples<S> {
    /// Create empty storage with the given per-channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            lanes: (0..CHANNEL_COUNT).map(|_| Vec::new()).collect(),
            capacity,
        }
    }

    /// Append a sample to `channel`.
    pub fn push(&mut self, channel: usize, sample: S) -> Result<()> {
        let capacity = self.capacity;
        let lane = self
            .lanes
            .get_mut(channel)
            .ok_or(DemuxError::InvalidChannel(channel))?;
        if lane.len() >= capacity {
            return Err(DemuxError::ChannelOverflow { channel, capacity });
        }
        lane.push(sample);
        Ok(())
    }

    /// Samples received on `channel`. Empty for out-of-range indices.
    pub fn channel(&self, channel: usize) -> &[S] {
        self.lanes.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sample count for every channel.
    pub fn counts(&self) -> [usize; CHANNEL_COUNT] {
        let mut counts = [0; CHANNEL_COUNT];
        for (count, lane) in counts.iter_mut().zip(&self.lanes) {
            *count = lane.len();
        }
        counts
    }

    /// Total samples across all channels.
    pub fn total(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    /// Per-channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate `(channel, samples)` pairs in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[S])> {
        self.lanes.iter().map(Vec::as_slice).enumerate()
    }
}

impl<S: Copy> Default for ChannelSamples<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_channels_independent() {
        let mut samples = ChannelSamples::<u32>::new(4);
        samples.push(0, 10).unwrap();
        samples.push(15, 20).unwrap();
        samples.push(0, 11).unwrap();

        assert_eq!(samples.channel(0), &[10, 11]);
        assert_eq!(samples.channel(15), &[20]);
        assert!(samples.channel(7).is_empty());
        assert_eq!(samples.total(), 3);
        assert_eq!(samples.counts()[0], 2);
    }

    #[test]
    fn push_past_capacity_overflows() {
        let mut samples = ChannelSamples::<u16>::new(2);
        samples.push(3, 1).unwrap();
        samples.push(3, 2).unwrap();

        let err = samples.push(3, 3).unwrap_err();
        assert!(matches!(
            err,
            DemuxError::ChannelOverflow {
                channel: 3,
                capacity: 2
            }
        ));
        // other channels are unaffected
        samples.push(4, 1).unwrap();
        assert_eq!(samples.channel(3), &[1, 2]);
    }

    #[test]
    fn push_rejects_unknown_channel() {
        let mut samples = ChannelSamples::<u16>::default();
        let err = samples.push(CHANNEL_COUNT, 0).unwrap_err();
        assert!(matches!(err, DemuxError::InvalidChannel(16)));
        assert!(samples.channel(CHANNEL_COUNT).is_empty());
    }

    #[test]
    fn word_capacity_scales_with_file_size() {
        assert_eq!(word_channel_capacity(0), 1);
        assert_eq!(word_channel_capacity(64), 17);
        assert_eq!(
            word_channel_capacity(2 * DEFAULT_MAX_FILE_SIZE),
            2 * (DEFAULT_CHANNEL_CAPACITY - 1) + 1
        );
    }

    #[test]
    fn iter_visits_all_channels_in_order() {
        let samples = ChannelSamples::<u32>::new(1);
        let channels: Vec<usize> = samples.iter().map(|(ch, _)| ch).collect();
        assert_eq!(channels, (0..CHANNEL_COUNT).collect::<Vec<_>>());
    }
}
