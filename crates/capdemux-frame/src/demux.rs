use capdemux_stream::{Word, WordStream};
use tracing::{debug, trace, warn};

use crate::channel::{ChannelSamples, CHANNEL_COUNT};
use crate::error::Result;
use crate::ring::{Frame, FrameRingBuffer, RING_DEPTH};
use crate::sync::{FrameSynchronizer, SYNC_LEN};

/// Words skipped when a filler pair is detected.
///
/// The pair itself is two words; the device tool has always advanced by
/// four, dropping the two words that follow.
pub const DEFAULT_FILLER_SKIP: usize = 4;

/// Configuration for a demultiplexing run.
#[derive(Debug, Clone)]
pub struct DemuxConfig {
    /// Locate a sync triple and prime the ring before the main pass.
    pub initial_sync: bool,
    /// Frames to collect during priming. Default: [`RING_DEPTH`].
    pub warmup_frames: usize,
    /// Words to advance per filler pair. Values below 2 are treated as 2.
    pub filler_skip: usize,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            initial_sync: true,
            warmup_frames: RING_DEPTH,
            filler_skip: DEFAULT_FILLER_SKIP,
        }
    }
}

/// Receives every completed frame.
///
/// This is where per-frame cross-channel processing hooks in. `seq` counts
/// frames completed in the ring, starting at 0.
pub trait FrameHandler {
    fn on_frame(&mut self, seq: u64, frame: &Frame) -> Result<()>;
}

impl FrameHandler for () {
    fn on_frame(&mut self, _seq: u64, _frame: &Frame) -> Result<()> {
        Ok(())
    }
}

/// Appends each completed frame to per-channel sequences.
#[derive(Debug, Default)]
pub struct ChannelCollector {
    samples: ChannelSamples<Word>,
}

impl ChannelCollector {
    /// Collector with the given per-channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: ChannelSamples::new(capacity),
        }
    }

    /// Samples collected so far.
    pub fn samples(&self) -> &ChannelSamples<Word> {
        &self.samples
    }

    /// Consume the collector and return the per-channel sequences.
    pub fn into_samples(self) -> ChannelSamples<Word> {
        self.samples
    }
}

impl FrameHandler for ChannelCollector {
    fn on_frame(&mut self, _seq: u64, frame: &Frame) -> Result<()> {
        for (channel, &sample) in frame.samples.iter().enumerate() {
            self.samples.push(channel, sample)?;
        }
        Ok(())
    }
}

/// Non-fatal conditions met during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxWarning {
    /// No sync triple before the scan limit; the pass started there instead.
    SyncNotFound { scan_limit: usize },
    /// The stream ended mid-frame; these samples were dropped.
    TruncatedFrame { samples: usize },
}

/// Summary of a demultiplexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemuxReport {
    /// Index of the sync triple, if one was searched for and found.
    pub sync_index: Option<usize>,
    /// Index the run was asked to start from.
    pub start_index: usize,
    /// Cursor position when the pass ended.
    pub end_index: usize,
    /// Frames completed during this run.
    pub frames_completed: u64,
    /// Whether priming reached its frame target. Always false without initial sync.
    pub warmup_complete: bool,
    /// Filler pairs skipped.
    pub filler_pairs: usize,
    /// Data words stored in the ring.
    pub samples_stored: usize,
    /// Samples of the unfinished final frame.
    pub dropped_partial: usize,
    /// Non-fatal conditions, in the order they occurred.
    pub warnings: Vec<DemuxWarning>,
}

/// Routes capture words round-robin into 16 channel slots.
#[derive(Debug, Clone, Default)]
pub struct ChannelDemultiplexer {
    config: DemuxConfig,
    synchronizer: FrameSynchronizer,
}

impl ChannelDemultiplexer {
    /// Create a demultiplexer with default configuration.
    pub fn new() -> Self {
        Self::with_config(DemuxConfig::default())
    }

    /// Create a demultiplexer with explicit configuration.
    pub fn with_config(config: DemuxConfig) -> Self {
        Self {
            config,
            synchronizer: FrameSynchronizer::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// Demultiplex `stream` from `start` into `ring`.
    ///
    /// With initial sync enabled the cursor first moves past the first sync
    /// triple, then priming fills `warmup_frames` frames before the main pass
    /// continues to the end of the stream. Every completed frame is handed to
    /// `handler`; a trailing partial frame is dropped. Only handler errors
    /// abort the run.
    pub fn run<H: FrameHandler>(
        &self,
        stream: &WordStream,
        start: usize,
        ring: &mut FrameRingBuffer,
        handler: &mut H,
    ) -> Result<DemuxReport> {
        let mut report = DemuxReport {
            start_index: start,
            ..DemuxReport::default()
        };
        let mut index = start;

        if self.config.initial_sync {
            index = match self.synchronizer.locate(stream, start) {
                Some(found) => {
                    debug!(index = found, "sync triple located");
                    report.sync_index = Some(found);
                    found + SYNC_LEN
                }
                None => {
                    let scan_limit = self.synchronizer.scan_limit(stream);
                    warn!(start, scan_limit, "no sync triple found, continuing from scan limit");
                    report
                        .warnings
                        .push(DemuxWarning::SyncNotFound { scan_limit });
                    scan_limit.max(start)
                }
            };

            let before = report.frames_completed;
            index = self.pass(
                stream,
                index,
                ring,
                handler,
                &mut report,
                Some(self.config.warmup_frames),
            )?;
            report.warmup_complete =
                report.frames_completed - before >= self.config.warmup_frames as u64;
            debug!(
                frames = report.frames_completed - before,
                complete = report.warmup_complete,
                "warm-up pass finished"
            );
        }

        report.end_index = self.pass(stream, index, ring, handler, &mut report, None)?;

        report.dropped_partial = ring.channel_cursor();
        if report.dropped_partial > 0 {
            debug!(
                samples = report.dropped_partial,
                "stream ended mid-frame, partial frame dropped"
            );
            report.warnings.push(DemuxWarning::TruncatedFrame {
                samples: report.dropped_partial,
            });
        }

        debug!(
            frames = report.frames_completed,
            fillers = report.filler_pairs,
            samples = report.samples_stored,
            "demultiplexing finished"
        );
        Ok(report)
    }

    fn pass<H: FrameHandler>(
        &self,
        stream: &WordStream,
        mut index: usize,
        ring: &mut FrameRingBuffer,
        handler: &mut H,
        report: &mut DemuxReport,
        frame_limit: Option<usize>,
    ) -> Result<usize> {
        let skip = self.config.filler_skip.max(2);
        let mut frames = 0usize;

        while index < stream.len() {
            if frame_limit.is_some_and(|limit| frames >= limit) {
                break;
            }

            if self.synchronizer.is_filler_pair(stream, index) {
                trace!(index, "filler pair skipped");
                report.filler_pairs += 1;
                index += skip;
                continue;
            }

            report.samples_stored += 1;
            if let Some(seq) = ring.push(stream[index]) {
                frames += 1;
                report.frames_completed += 1;
                handler.on_frame(seq, ring.frame(seq))?;
            }
            index += 1;
        }

        Ok(index)
    }
}

/// Demultiplex a whole capture into per-channel sequences.
///
/// Convenience wrapper that runs from index 0 into a fresh ring and collects
/// every completed frame.
pub fn demultiplex(
    stream: &WordStream,
    config: DemuxConfig,
    channel_capacity: usize,
) -> Result<(ChannelSamples<Word>, FrameRingBuffer, DemuxReport)> {
    let mut ring = FrameRingBuffer::new();
    let mut collector = ChannelCollector::new(channel_capacity);
    let report =
        ChannelDemultiplexer::with_config(config).run(stream, 0, &mut ring, &mut collector)?;
    debug_assert_eq!(
        collector.samples().total() as u64,
        report.frames_completed * CHANNEL_COUNT as u64
    );
    Ok((collector.into_samples(), ring, report))
}

#[cfg(test)]
mod tests {
    use capdemux_stream::{StreamConfig, WordOrder, FILLER};

    use super::*;
    use crate::error::DemuxError;

    const NOISE: Word = 0x0700_0000;
    const SYNC: [Word; 3] = [0x0000_0001, 0x0100_0002, 0x0000_0003];

    fn stream_of(words: &[Word]) -> WordStream {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let config = StreamConfig {
            word_order: WordOrder::Little,
            ..StreamConfig::default()
        };
        WordStream::from_bytes(&bytes, &config).unwrap()
    }

    fn data_words(count: usize, base: Word) -> Vec<Word> {
        (0..count as Word).map(|n| 0x0600_0000 | (base + n)).collect()
    }

    #[test]
    fn sync_then_sixteen_words_yields_one_frame() {
        let data = data_words(16, 0x100);
        let mut words = SYNC.to_vec();
        words.extend(&data);
        let stream = stream_of(&words);

        let mut ring = FrameRingBuffer::new();
        let report = ChannelDemultiplexer::new()
            .run(&stream, 0, &mut ring, &mut ())
            .unwrap();

        assert_eq!(ring.frame(0).samples.as_slice(), data.as_slice());
        assert_eq!(ring.channel_cursor(), 0);
        assert_eq!(ring.frame_cursor(), 1);
        assert_eq!(report.sync_index, Some(0));
        assert_eq!(report.frames_completed, 1);
        assert_eq!(report.end_index, words.len());
        assert!(!report.warmup_complete);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn sync_after_leading_noise() {
        let data = data_words(16, 0);
        let mut words = vec![NOISE; 5];
        words.extend(SYNC);
        words.extend(&data);
        let stream = stream_of(&words);

        let (samples, _ring, report) =
            demultiplex(&stream, DemuxConfig::default(), 16).unwrap();

        assert_eq!(report.sync_index, Some(5));
        for (channel, &word) in data.iter().enumerate() {
            assert_eq!(samples.channel(channel), &[word]);
        }
    }

    #[test]
    fn marker_words_are_not_stored() {
        let mut words = SYNC.to_vec();
        words.extend(data_words(16, 0));
        let stream = stream_of(&words);

        let (samples, _, _) = demultiplex(&stream, DemuxConfig::default(), 16).unwrap();
        for (_, lane) in samples.iter() {
            assert!(!lane.iter().any(|w| SYNC.contains(w)));
        }
    }

    #[test]
    fn filler_runs_advance_four_words_each() {
        for pairs in 1..5 {
            let words = vec![FILLER; pairs * 4];
            let stream = stream_of(&words);
            let config = DemuxConfig {
                initial_sync: false,
                ..DemuxConfig::default()
            };

            let mut ring = FrameRingBuffer::new();
            let report = ChannelDemultiplexer::with_config(config)
                .run(&stream, 0, &mut ring, &mut ())
                .unwrap();

            assert_eq!(report.end_index, pairs * 4);
            assert_eq!(report.filler_pairs, pairs);
            assert_eq!(report.samples_stored, 0);
            assert_eq!(ring.channel_cursor(), 0);
        }
    }

    #[test]
    fn filler_skip_drops_following_two_words() {
        let mut words = vec![FILLER, FILLER, 0xAAAA, 0xBBBB];
        words.extend(data_words(16, 0));
        let stream = stream_of(&words);
        let config = DemuxConfig {
            initial_sync: false,
            ..DemuxConfig::default()
        };

        let (samples, _, report) = demultiplex(&stream, config, 16).unwrap();
        assert_eq!(report.frames_completed, 1);
        assert_eq!(samples.channel(0), &[0x0600_0000]);
        assert!(samples.iter().all(|(_, lane)| !lane.contains(&0xAAAA)));
    }

    #[test]
    fn filler_skip_of_two_keeps_following_words() {
        let mut words = vec![FILLER, FILLER, 0xAAAA, 0xBBBB];
        words.extend(data_words(14, 0));
        let stream = stream_of(&words);
        let config = DemuxConfig {
            initial_sync: false,
            filler_skip: 2,
            ..DemuxConfig::default()
        };

        let (samples, _, report) = demultiplex(&stream, config, 16).unwrap();
        assert_eq!(report.frames_completed, 1);
        assert_eq!(samples.channel(0), &[0xAAAA]);
        assert_eq!(samples.channel(1), &[0xBBBB]);
    }

    #[test]
    fn filler_skip_below_two_still_clears_the_pair() {
        for filler_skip in [0, 1] {
            let mut words = vec![FILLER, FILLER, FILLER, FILLER];
            words.extend(data_words(16, 0));
            let stream = stream_of(&words);
            let config = DemuxConfig {
                initial_sync: false,
                filler_skip,
                ..DemuxConfig::default()
            };

            let (samples, _, report) = demultiplex(&stream, config, 16).unwrap();
            assert_eq!(report.filler_pairs, 2, "skip {filler_skip}");
            assert_eq!(report.frames_completed, 1);
            assert_eq!(samples.channel(0), &[0x0600_0000]);
            assert!(samples.iter().all(|(_, lane)| !lane.contains(&FILLER)));
        }
    }

    #[test]
    fn filler_between_frames_does_not_shift_channels() {
        let mut words = SYNC.to_vec();
        words.extend(data_words(8, 0));
        words.extend([FILLER, FILLER, 0, 0]);
        words.extend(data_words(8, 8));
        let stream = stream_of(&words);

        let (samples, _, report) = demultiplex(&stream, DemuxConfig::default(), 16).unwrap();
        assert_eq!(report.filler_pairs, 1);
        assert_eq!(report.frames_completed, 1);
        assert_eq!(samples.channel(8), &[0x0600_0008]);
    }

    #[test]
    fn missing_sync_continues_from_scan_limit() {
        let words = vec![NOISE; 20];
        let stream = stream_of(&words);

        let mut ring = FrameRingBuffer::new();
        let report = ChannelDemultiplexer::new()
            .run(&stream, 0, &mut ring, &mut ())
            .unwrap();

        assert_eq!(report.sync_index, None);
        assert_eq!(report.samples_stored, 2);
        assert_eq!(
            report.warnings,
            vec![
                DemuxWarning::SyncNotFound { scan_limit: 18 },
                DemuxWarning::TruncatedFrame { samples: 2 },
            ]
        );
    }

    #[test]
    fn truncated_frame_is_dropped() {
        let mut words = SYNC.to_vec();
        words.extend(data_words(20, 0));
        let stream = stream_of(&words);

        let (samples, ring, report) =
            demultiplex(&stream, DemuxConfig::default(), 16).unwrap();

        assert_eq!(report.frames_completed, 1);
        assert_eq!(report.dropped_partial, 4);
        assert_eq!(ring.partial().len(), 4);
        assert_eq!(samples.total(), 16);
    }

    #[test]
    fn warmup_primes_the_ring_then_main_pass_continues() {
        let mut words = SYNC.to_vec();
        words.extend(data_words(16 * 40, 0));
        let stream = stream_of(&words);

        let mut ring = FrameRingBuffer::new();
        let mut collector = ChannelCollector::new(64);
        let report = ChannelDemultiplexer::new()
            .run(&stream, 0, &mut ring, &mut collector)
            .unwrap();

        assert!(report.warmup_complete);
        assert!(ring.is_primed());
        assert_eq!(report.frames_completed, 40);
        assert_eq!(collector.samples().channel(0).len(), 40);
        assert_eq!(ring.latest().unwrap()[15], 0x0600_0000 | (16 * 40 - 1));
    }

    #[test]
    fn no_initial_sync_stores_from_start() {
        let words = data_words(16, 0);
        let stream = stream_of(&words);
        let config = DemuxConfig {
            initial_sync: false,
            ..DemuxConfig::default()
        };

        let mut ring = FrameRingBuffer::new();
        let report = ChannelDemultiplexer::with_config(config)
            .run(&stream, 0, &mut ring, &mut ())
            .unwrap();

        assert_eq!(report.sync_index, None);
        assert!(report.warnings.is_empty());
        assert_eq!(ring.frame(0).samples.as_slice(), words.as_slice());
    }

    #[test]
    fn handler_errors_abort_the_run() {
        let mut words = SYNC.to_vec();
        words.extend(data_words(32, 0));
        let stream = stream_of(&words);

        let err = demultiplex(&stream, DemuxConfig::default(), 1).unwrap_err();
        assert!(matches!(err, DemuxError::ChannelOverflow { capacity: 1, .. }));
    }

    #[test]
    fn handler_sees_sequence_numbers() {
        struct Seqs(Vec<u64>);
        impl FrameHandler for Seqs {
            fn on_frame(&mut self, seq: u64, _frame: &Frame) -> Result<()> {
                self.0.push(seq);
                Ok(())
            }
        }

        let mut words = SYNC.to_vec();
        words.extend(data_words(48, 0));
        let stream = stream_of(&words);

        let mut seqs = Seqs(Vec::new());
        ChannelDemultiplexer::new()
            .run(&stream, 0, &mut FrameRingBuffer::new(), &mut seqs)
            .unwrap();
        assert_eq!(seqs.0, vec![0, 1, 2]);
    }

    #[test]
    fn empty_stream_is_a_no_op() {
        let stream = stream_of(&[]);
        let mut ring = FrameRingBuffer::new();
        let report = ChannelDemultiplexer::new()
            .run(&stream, 0, &mut ring, &mut ())
            .unwrap();
        assert_eq!(report.samples_stored, 0);
        assert_eq!(report.end_index, 0);
    }
}
