use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use capdemux_frame::{DEFAULT_FILLER_SKIP, DEFAULT_HEADER_BYTES};
use capdemux_stream::{WordOrder, DEFAULT_MAX_FILE_SIZE};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod capture;
pub mod inspect;
pub mod split;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Demultiplex a capture and write one file per channel.
    Split(SplitArgs),
    /// Demultiplex a capture and report on it without writing files.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Split(args) => split::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Channel assignment strategy.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Mode {
    /// Sync triple, filler skipping and round-robin frames of 32-bit words.
    Ring,
    /// Records tagged with their channel, two 16-bit samples each.
    Legacy,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Ring => "ring",
            Mode::Legacy => "legacy",
        }
    }
}

/// Byte order of capture words and output samples.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ByteOrder {
    Native,
    Little,
    Big,
}

impl From<ByteOrder> for WordOrder {
    fn from(order: ByteOrder) -> Self {
        match order {
            ByteOrder::Native => WordOrder::Native,
            ByteOrder::Little => WordOrder::Little,
            ByteOrder::Big => WordOrder::Big,
        }
    }
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Capture file to read.
    pub input: PathBuf,
    /// Channel assignment strategy.
    #[arg(long, value_enum, default_value = "ring")]
    pub mode: Mode,
    /// Byte order of capture words (and of written samples).
    #[arg(long, value_enum, default_value = "native")]
    pub word_order: ByteOrder,
    /// Reject captures larger than this many bytes.
    #[arg(long, env = "CAPDEMUX_MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: usize,
    /// Start demultiplexing at the first word instead of the first sync triple (ring mode).
    #[arg(long)]
    pub no_sync: bool,
    /// Words to advance past each filler pair (ring mode).
    #[arg(long, default_value_t = DEFAULT_FILLER_SKIP)]
    pub filler_skip: usize,
    /// Header bytes preceding the first record (legacy mode).
    #[arg(long, default_value_t = DEFAULT_HEADER_BYTES)]
    pub header_bytes: usize,
    /// Maximum samples kept per channel. Defaults to what a capture of
    /// `--max-file-size` bytes can put on one channel in the selected mode.
    #[arg(long)]
    pub channel_capacity: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,
    /// Directory receiving the channel files (created if missing).
    #[arg(long, short = 'o', env = "CAPDEMUX_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,
    /// Channel file name prefix.
    #[arg(long, default_value = "ch_")]
    pub prefix: String,
    /// Channel file extension.
    #[arg(long, default_value = "raw")]
    pub extension: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub capture: CaptureArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details and format constants.
    #[arg(long)]
    pub extended: bool,
}
