use clap::Parser;
use colored::*;
use extsort::cli::{Args, run};
use extsort::logging::LogContext;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = Args::parse();

    let _log = match LogContext::init(&args.log_file) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(summary) => {
            info!(
                "Run finished: {} files moved, {} failed",
                summary.moved(),
                summary.failed()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("An unexpected error occurred: {:?}", e);
            eprintln!("{} Error: {}", "✗".red(), e);
            ExitCode::FAILURE
        }
    }
}
