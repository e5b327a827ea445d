use std::process::ExitCode;

use clap::Parser;
use pedicare_lib::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    pedicare_lib::init_tracing();

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
