use kourdump_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    let log_target = logging::init();

    if let Err(err) = CliCommand::run_from_args(&log_target).await {
        eprintln!("kourdump error: {:#}", err);
        std::process::exit(1);
    }
}
