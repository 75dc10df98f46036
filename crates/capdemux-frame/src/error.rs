use std::path::PathBuf;

use capdemux_stream::StreamError;

/// Errors that can occur while demultiplexing or writing channels.
///
/// A missing sync triple and a truncated final frame are not errors; they are
/// reported as [`DemuxWarning`](crate::DemuxWarning)s and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    /// A channel received more samples than its capacity allows.
    #[error("channel {channel} overflow ({capacity} samples max)")]
    ChannelOverflow { channel: usize, capacity: usize },

    /// A channel index outside 0..16 was used.
    #[error("channel index {0} out of range (0-15)")]
    InvalidChannel(usize),

    /// Loading the capture failed.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// An output file could not be created.
    #[error("failed to create {path}: {source}")]
    SinkCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred while writing channel output.
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DemuxError>;
