use std::process::ExitCode;

use clap::Parser;

use digitalglue::cli::{self, CliArgs};
use digitalglue::logger;

fn main() -> ExitCode {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = CliArgs::parse();
    cli::run(args)
}
