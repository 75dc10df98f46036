use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use capdemux_stream::WordOrder;
use tracing::debug;

use crate::channel::{ChannelSamples, CHANNEL_COUNT};
use crate::error::{DemuxError, Result};

/// A sample type that can be written to a channel artifact.
pub trait Sample: Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append this sample to `dst` in `order`.
    fn put(self, order: WordOrder, dst: &mut BytesMut);
}

impl Sample for u32 {
    const SIZE: usize = 4;

    fn put(self, order: WordOrder, dst: &mut BytesMut) {
        order.put_u32(dst, self);
    }
}

impl Sample for u16 {
    const SIZE: usize = 2;

    fn put(self, order: WordOrder, dst: &mut BytesMut) {
        order.put_u16(dst, self);
    }
}

/// Destination for finished per-channel sequences.
pub trait ChannelSink {
    /// Append encoded samples to `channel`.
    fn write_channel(&mut self, channel: usize, payload: &[u8]) -> std::io::Result<()>;

    /// Flush and release every channel.
    fn finish(self) -> std::io::Result<()>
    where
        Self: Sized;
}

/// Naming of per-channel output files.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// File name prefix. Default: `ch_`.
    pub prefix: String,
    /// File extension without the dot. Default: `raw`.
    pub extension: String,
}

impl SinkConfig {
    /// File name for a 0-based channel index; channels are numbered from 1.
    pub fn file_name(&self, channel: usize) -> String {
        if self.extension.is_empty() {
            format!("{}{}", self.prefix, channel + 1)
        } else {
            format!("{}{}.{}", self.prefix, channel + 1, self.extension)
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            prefix: "ch_".to_string(),
            extension: "raw".to_string(),
        }
    }
}

/// Writes each channel to its own file.
///
/// All 16 files are opened up front. If opening one fails, the ones already
/// opened are closed when the partial set is dropped.
pub struct FileSink {
    paths: Vec<PathBuf>,
    files: Vec<BufWriter<File>>,
}

impl FileSink {
    /// Create (truncating) one file per channel in `dir`.
    pub fn create(dir: impl AsRef<Path>, config: &SinkConfig) -> Result<Self> {
        let dir = dir.as_ref();
        let paths: Vec<PathBuf> = (0..CHANNEL_COUNT)
            .map(|channel| dir.join(config.file_name(channel)))
            .collect();

        let files = paths
            .iter()
            .map(|path| {
                File::create(path)
                    .map(BufWriter::new)
                    .map_err(|source| DemuxError::SinkCreate {
                        path: path.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(dir = %dir.display(), "channel files created");
        Ok(Self { paths, files })
    }

    /// Output path of every channel, in channel order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl ChannelSink for FileSink {
    fn write_channel(&mut self, channel: usize, payload: &[u8]) -> std::io::Result<()> {
        let file = self.files.get_mut(channel).ok_or_else(|| {
            std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("channel index {channel} out of range"),
            )
        })?;
        file.write_all(payload)
    }

    fn finish(self) -> std::io::Result<()> {
        for mut file in self.files {
            file.flush()?;
        }
        Ok(())
    }
}

/// Keeps channel payloads in memory.
#[derive(Debug, Clone)]
pub struct MemorySink {
    channels: Vec<Vec<u8>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self {
            channels: vec![Vec::new(); CHANNEL_COUNT],
        }
    }

    /// Bytes written to `channel`.
    pub fn channel(&self, channel: usize) -> &[u8] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSink for MemorySink {
    fn write_channel(&mut self, channel: usize, payload: &[u8]) -> std::io::Result<()> {
        match self.channels.get_mut(channel) {
            Some(buf) => {
                buf.extend_from_slice(payload);
                Ok(())
            }
            None => Err(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("channel index {channel} out of range"),
            )),
        }
    }

    fn finish(self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Encode every channel in `order` and hand it to `sink`.
///
/// Returns the number of bytes written across all channels.
pub fn flush_channels<S: Sample, K: ChannelSink>(
    sink: &mut K,
    samples: &ChannelSamples<S>,
    order: WordOrder,
) -> Result<usize> {
    let mut buf = BytesMut::new();
    let mut written = 0usize;

    for (channel, lane) in samples.iter() {
        buf.clear();
        buf.reserve(lane.len() * S::SIZE);
        for &sample in lane {
            sample.put(order, &mut buf);
        }
        sink.write_channel(channel, &buf)?;
        written += buf.len();
    }

    Ok(written)
}
