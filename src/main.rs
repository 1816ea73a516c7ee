use clap::Parser;
use std::process::ExitCode;
use vypack::cli::{Args, run_cli};
use vypack::logging::setup_logging;
use vypack::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run_cli(&args) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            OutputFormatter::error(&format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
