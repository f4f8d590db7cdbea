use ffdl_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log to the state dir; a read-only home still gets logs on stderr.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable ({:#}); logging to stderr", e);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("ffdl error: {:#}", err);
        std::process::exit(1);
    }
}
