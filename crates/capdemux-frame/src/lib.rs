//! Frame synchronization and channel demultiplexing for acquisition captures.
//!
//! This is the core of capdemux. A capture interleaves samples from 16
//! channels with two kinds of markers:
//! - a sync triple (three words whose bits 24..=26 read `0, 1, 0`) that
//!   anchors the start of a frame
//! - filler pairs (`0xEEEEEEEE` twice) emitted while the device idles
//!
//! [`ChannelDemultiplexer`] locates the first sync triple, skips filler, and
//! deals the remaining words round-robin into a [`FrameRingBuffer`] of the
//! 33 most recent frames. [`LegacyDecoder`] implements the older tag-routed
//! format, where each record names its own channel. Either way the result
//! ends up in [`ChannelSamples`] and is written out through a [`ChannelSink`].

pub mod channel;
pub mod demux;
pub mod error;
pub mod legacy;
pub mod ring;
pub mod sink;
pub mod sync;

pub use channel::{
    word_channel_capacity, ChannelSamples, CHANNEL_COUNT, DEFAULT_CHANNEL_CAPACITY,
};
pub use demux::{
    demultiplex, ChannelCollector, ChannelDemultiplexer, DemuxConfig, DemuxReport, DemuxWarning,
    FrameHandler, DEFAULT_FILLER_SKIP,
};
pub use error::{DemuxError, Result};
pub use legacy::{
    legacy_channel_capacity, route_record, LegacyConfig, LegacyDecoder, LegacyReport,
    DEFAULT_HEADER_BYTES, DEFAULT_LEGACY_CHANNEL_CAPACITY, RECORD_SIZE,
};
pub use ring::{Frame, FrameRingBuffer, RING_DEPTH};
pub use sink::{flush_channels, ChannelSink, FileSink, MemorySink, Sample, SinkConfig};
pub use sync::{FrameSynchronizer, SYNC_LEN, SYNC_PATTERN};
