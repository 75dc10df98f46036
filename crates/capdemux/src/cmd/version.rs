use capdemux_frame::{CHANNEL_COUNT, RING_DEPTH};
use capdemux_stream::DEFAULT_MAX_FILE_SIZE;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("capdemux {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: capdemux");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("CAPDEMUX_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("CAPDEMUX_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("channels: {CHANNEL_COUNT}");
    println!("ring_depth: {RING_DEPTH}");
    println!("max_file_size: {DEFAULT_MAX_FILE_SIZE}");

    Ok(SUCCESS)
}
