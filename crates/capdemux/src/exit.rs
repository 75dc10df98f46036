use std::fmt;
use std::io;

use capdemux_frame::DemuxError;
use capdemux_stream::StreamError;

// Exit codes follow sysexits(3) where one fits.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const NO_INPUT: i32 = 66;
pub const CANT_CREATE: i32 = 73;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => NO_INPUT,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn stream_error(context: &str, err: StreamError) -> CliError {
    match err {
        StreamError::FileNotFound { .. } => CliError::new(NO_INPUT, format!("{context}: {err}")),
        StreamError::InvalidLength { .. } | StreamError::FileTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        StreamError::Io(source) => io_error(context, source),
    }
}

pub fn demux_error(context: &str, err: DemuxError) -> CliError {
    match err {
        DemuxError::Stream(err) => stream_error(context, err),
        DemuxError::ChannelOverflow { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        DemuxError::SinkCreate { .. } => CliError::new(CANT_CREATE, format!("{context}: {err}")),
        DemuxError::Io(source) => io_error(context, source),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
