// Entry point: parse flags, set up logging, run one report.
use clap::Parser;
use renewal_report::{cli, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();
    let args = cli::Cli::parse();
    match cli::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
