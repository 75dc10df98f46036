//! Loading and decoding shared by `split` and `inspect`.

use capdemux_frame::{
    demultiplex, legacy_channel_capacity, word_channel_capacity, ChannelSamples, DemuxConfig,
    DemuxReport, DemuxWarning, FrameRingBuffer, LegacyConfig, LegacyDecoder, LegacyReport, Sample,
};
use capdemux_stream::{read_capture, StreamConfig, WordOrder, WordStream};
use tracing::info;

use crate::cmd::{CaptureArgs, Mode};
use crate::exit::{demux_error, stream_error, CliResult};
use crate::output::{hex_word, ChannelSummary, RunSummary};

pub enum Decoded {
    Ring {
        input_bytes: usize,
        samples: ChannelSamples<u32>,
        ring: FrameRingBuffer,
        report: DemuxReport,
    },
    Legacy {
        input_bytes: usize,
        samples: ChannelSamples<u16>,
        report: LegacyReport,
    },
}

pub fn decode(args: &CaptureArgs) -> CliResult<Decoded> {
    match args.mode {
        Mode::Ring => {
            let config = StreamConfig {
                max_file_size: args.max_file_size,
                word_order: args.word_order.into(),
            };
            let stream = WordStream::open(&args.input, &config)
                .map_err(|err| stream_error("load failed", err))?;

            let demux = DemuxConfig {
                initial_sync: !args.no_sync,
                filler_skip: args.filler_skip,
                ..DemuxConfig::default()
            };
            let (samples, ring, report) = demultiplex(&stream, demux, channel_capacity(args))
                .map_err(|err| demux_error("demultiplex failed", err))?;

            info!(
                words = stream.len(),
                frames = report.frames_completed,
                "ring capture demultiplexed"
            );
            Ok(Decoded::Ring {
                input_bytes: stream.byte_len(),
                samples,
                ring,
                report,
            })
        }
        Mode::Legacy => {
            let bytes = read_capture(&args.input, args.max_file_size)
                .map_err(|err| stream_error("load failed", err))?;

            let decoder = LegacyDecoder::with_config(LegacyConfig {
                header_bytes: args.header_bytes,
                channel_capacity: channel_capacity(args),
            });
            let (samples, report) = decoder
                .decode(&bytes)
                .map_err(|err| demux_error("legacy decode failed", err))?;

            info!(records = report.records, "legacy capture decoded");
            Ok(Decoded::Legacy {
                input_bytes: bytes.len(),
                samples,
                report,
            })
        }
    }
}

impl Decoded {
    /// Build a summary; `paths` lists output files when they were written.
    pub fn summary(&self, args: &CaptureArgs, paths: Option<&[String]>) -> RunSummary {
        let input = args.input.display().to_string();
        match self {
            Decoded::Ring {
                input_bytes,
                samples,
                ring,
                report,
            } => RunSummary {
                input,
                mode: Mode::Ring.as_str(),
                input_bytes: *input_bytes,
                sync_index: report.sync_index,
                frames: Some(report.frames_completed),
                records: None,
                filler_pairs: report.filler_pairs,
                dropped_samples: report.dropped_partial,
                warnings: report.warnings.iter().map(describe_warning).collect(),
                channels: channel_summaries(samples, paths),
                latest_frame: ring
                    .latest()
                    .map(|frame| frame.samples.iter().copied().map(hex_word).collect()),
            },
            Decoded::Legacy {
                input_bytes,
                samples,
                report,
            } => RunSummary {
                input,
                mode: Mode::Legacy.as_str(),
                input_bytes: *input_bytes,
                sync_index: None,
                frames: None,
                records: Some(report.records),
                filler_pairs: 0,
                dropped_samples: 0,
                warnings: if report.trailing_bytes > 0 {
                    vec![format!(
                        "{} trailing bytes ignored (incomplete record)",
                        report.trailing_bytes
                    )]
                } else {
                    Vec::new()
                },
                channels: channel_summaries(samples, paths),
                latest_frame: None,
            },
        }
    }
}

/// Per-channel capacity: the explicit flag, or whatever a capture of
/// `max_file_size` bytes could route to a single channel.
pub fn channel_capacity(args: &CaptureArgs) -> usize {
    args.channel_capacity.unwrap_or(match args.mode {
        Mode::Ring => word_channel_capacity(args.max_file_size),
        Mode::Legacy => legacy_channel_capacity(args.max_file_size),
    })
}

pub fn word_order(args: &CaptureArgs) -> WordOrder {
    args.word_order.into()
}

fn channel_summaries<S: Sample>(
    samples: &ChannelSamples<S>,
    paths: Option<&[String]>,
) -> Vec<ChannelSummary> {
    samples
        .iter()
        .map(|(channel, lane)| ChannelSummary {
            channel: channel + 1,
            samples: lane.len(),
            bytes: lane.len() * S::SIZE,
            path: paths.and_then(|p| p.get(channel).cloned()),
        })
        .collect()
}

fn describe_warning(warning: &DemuxWarning) -> String {
    match warning {
        DemuxWarning::SyncNotFound { scan_limit } => {
            format!("no sync triple found, started at word {scan_limit}")
        }
        DemuxWarning::TruncatedFrame { samples } => {
            format!("capture ended mid-frame, {samples} samples dropped")
        }
    }
}
