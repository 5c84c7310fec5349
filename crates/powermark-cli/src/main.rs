//! The `powermark` binary.

use std::process::ExitCode;

use clap::Parser;
use powermark_cli::{CliArgs, PowermarkCli};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    PowermarkCli::init_logging(args.verbose, args.quiet);

    match PowermarkCli::from_args(&args).and_then(|cli| cli.run(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
