//! Tag-routed decoding of the older capture format.
//!
//! Here every 4-byte record names its own destination: the low nibble of the
//! trailing byte is the channel. Each record yields two 16-bit samples.
//!
//! The reference tool reads the file header into a 64-byte scratch buffer and
//! then reads each record over the first four bytes of that same buffer. The
//! low byte of the second sample comes from scratch byte 13, which records
//! never reach, so it is always header byte 13. That behavior is kept as-is
//! so outputs stay bit-compatible with existing captures.

use capdemux_stream::DEFAULT_MAX_FILE_SIZE;
use tracing::debug;

use crate::channel::ChannelSamples;
use crate::error::Result;

/// Bytes per tagged record.
pub const RECORD_SIZE: usize = 4;

/// Length of the header preceding the first record.
pub const DEFAULT_HEADER_BYTES: usize = 45;

/// Default per-channel capacity: a maximum-size capture whose records all
/// carry the same tag.
pub const DEFAULT_LEGACY_CHANNEL_CAPACITY: usize = legacy_channel_capacity(DEFAULT_MAX_FILE_SIZE);

/// Per-channel capacity that holds every sample of a capture of up to
/// `max_file_size` bytes, two per record.
pub const fn legacy_channel_capacity(max_file_size: usize) -> usize {
    2 * (max_file_size / RECORD_SIZE)
}

const SCRATCH_SIZE: usize = 64;
const STALE_BYTE: usize = 13;

/// Configuration for the tag-routed decoder.
#[derive(Debug, Clone)]
pub struct LegacyConfig {
    /// Bytes skipped before the first record. Default: 45.
    pub header_bytes: usize,
    /// Maximum samples per channel.
    pub channel_capacity: usize,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            header_bytes: DEFAULT_HEADER_BYTES,
            channel_capacity: DEFAULT_LEGACY_CHANNEL_CAPACITY,
        }
    }
}

/// Summary of a legacy decoding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyReport {
    /// Header bytes actually present.
    pub header_bytes: usize,
    /// Complete records decoded.
    pub records: usize,
    /// Samples routed (two per record).
    pub samples: usize,
    /// Trailing bytes too short to form a record.
    pub trailing_bytes: usize,
}

/// Decodes tag-routed captures into 16-bit channel samples.
#[derive(Debug, Clone, Default)]
pub struct LegacyDecoder {
    config: LegacyConfig,
}

impl LegacyDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(LegacyConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: LegacyConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> &LegacyConfig {
        &self.config
    }

    /// Decode a whole capture.
    ///
    /// Fails with [`DemuxError::ChannelOverflow`](crate::DemuxError::ChannelOverflow)
    /// if a channel receives more samples than its capacity.
    pub fn decode(&self, bytes: &[u8]) -> Result<(ChannelSamples<u16>, LegacyReport)> {
        let header_len = self.config.header_bytes.min(bytes.len());
        let (header, body) = bytes.split_at(header_len);

        let mut scratch = [0u8; SCRATCH_SIZE];
        let copied = header.len().min(SCRATCH_SIZE);
        scratch[..copied].copy_from_slice(&header[..copied]);
        let stale = scratch[STALE_BYTE];

        let mut samples = ChannelSamples::new(self.config.channel_capacity);
        let mut report = LegacyReport {
            header_bytes: header_len,
            ..LegacyReport::default()
        };

        let mut records = body.chunks_exact(RECORD_SIZE);
        for record in &mut records {
            let (channel, first, second) =
                route_record([record[0], record[1], record[2], record[3]], stale);
            samples.push(channel, first)?;
            samples.push(channel, second)?;
            report.records += 1;
        }
        report.samples = report.records * 2;
        report.trailing_bytes = records.remainder().len();

        debug!(
            records = report.records,
            trailing = report.trailing_bytes,
            "legacy capture decoded"
        );
        Ok((samples, report))
    }
}

/// Split one record into `(channel, first, second)`.
///
/// `stale` is the scratch byte the reference tool used as the low byte of the
/// second sample.
pub fn route_record(record: [u8; RECORD_SIZE], stale: u8) -> (usize, u16, u16) {
    let channel = (record[3] & 0x0F) as usize;
    let first = u16::from_le_bytes([record[0], record[1]]);
    let second = u16::from_le_bytes([stale, record[2]]);
    (channel, first, second)
}
