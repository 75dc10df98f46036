//! Frame synchronization and channel demultiplexing for 16-channel
//! acquisition captures.
//!
//! capdemux takes a raw capture (a flat run of 32-bit words interleaving
//! samples from 16 channels with sync and filler markers) and rebuilds the
//! per-channel sample sequences.
//!
//! # Crate Structure
//!
//! - [`stream`]: Loading captures as bounds-checked word streams
//! - [`frame`]: Sync detection, the frame ring, round-robin and tag-routed
//!   demultiplexing, and per-channel sinks

/// Re-export stream types.
pub mod stream {
    pub use capdemux_stream::*;
}

/// Re-export frame types.
pub mod frame {
    pub use capdemux_frame::*;
}
