use crate::cmd::capture::decode;
use crate::cmd::InspectArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let decoded = decode(&args.capture)?;
    print_summary(&decoded.summary(&args.capture, None), format);
    Ok(SUCCESS)
}
