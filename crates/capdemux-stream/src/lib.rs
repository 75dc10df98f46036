//! Word-aligned loading of raw acquisition captures.
//!
//! A capture is a flat run of 32-bit words produced by a 16-channel
//! acquisition device. This is the lowest layer of capdemux: it owns the
//! load-time preconditions (size ceiling, word alignment), the byte-to-word
//! conversion, and the zero sentinel that keeps lookahead in bounds.
//! Everything else builds on the [`WordStream`] type provided here.

pub mod error;
pub mod stream;
pub mod word;

pub use error::{Result, StreamError};
pub use stream::{read_capture, StreamConfig, WordStream, DEFAULT_MAX_FILE_SIZE};
pub use word::{sync_field, Word, WordOrder, FILLER, WORD_SIZE};
