use capdemux_frame::{flush_channels, ChannelSink, FileSink, SinkConfig};
use tracing::info;

use crate::cmd::capture::{decode, word_order, Decoded};
use crate::cmd::SplitArgs;
use crate::exit::{demux_error, io_error, CliError, CliResult, CANT_CREATE, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: SplitArgs, format: OutputFormat) -> CliResult<i32> {
    // load and decode before touching the output directory, so a rejected
    // capture leaves no artifacts behind
    let decoded = decode(&args.capture)?;

    std::fs::create_dir_all(&args.output_dir).map_err(|err| {
        CliError::new(
            CANT_CREATE,
            format!("cannot create {}: {err}", args.output_dir.display()),
        )
    })?;

    let sink_config = SinkConfig {
        prefix: args.prefix.clone(),
        extension: args.extension.clone(),
    };
    let mut sink = FileSink::create(&args.output_dir, &sink_config)
        .map_err(|err| demux_error("open outputs failed", err))?;
    let paths: Vec<String> = sink
        .paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let order = word_order(&args.capture);
    let written = match &decoded {
        Decoded::Ring { samples, .. } => flush_channels(&mut sink, samples, order),
        Decoded::Legacy { samples, .. } => flush_channels(&mut sink, samples, order),
    }
    .map_err(|err| demux_error("write failed", err))?;
    sink.finish()
        .map_err(|err| io_error("flush outputs failed", err))?;

    info!(
        bytes = written,
        dir = %args.output_dir.display(),
        "channel files written"
    );
    print_summary(&decoded.summary(&args.capture, Some(&paths)), format);
    Ok(SUCCESS)
}
