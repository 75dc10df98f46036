use std::path::PathBuf;

/// Errors that can occur while loading a capture.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The input file could not be opened.
    #[error("failed to open {path}: {source}")]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The byte count is not a multiple of the word size.
    #[error("number of bytes ({len}) is not a multiple of 4")]
    InvalidLength { len: usize },

    /// The capture exceeds the configured size ceiling.
    #[error("file size too big: {size} bytes, {max} bytes allowed")]
    FileTooLarge { size: u64, max: usize },

    /// An I/O error occurred while reading the capture.
    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
