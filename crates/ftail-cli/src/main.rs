use ftail_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    let verbose = std::env::args().any(|a| a == "-v" || a == "--verbose");
    // Log to the state dir; fall back to stderr so the CLI still runs.
    if let Err(err) = logging::init_logging(verbose) {
        logging::init_logging_stderr(verbose);
        tracing::warn!("log file unavailable, logging to stderr: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("ftail error: {:#}", err);
        std::process::exit(1);
    }
}
