//! parfind - find-style search over a directory tree.
//!
//! Entry point for the CLI application.

use std::process::ExitCode;

use parfind::FindError;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::CliArgs;

fn main() -> ExitCode {
    let args = match CliArgs::parse_find_style(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => match cli::to_find_error(&e) {
            Some(err) => return report(err),
            None => e.exit(),
        },
    };

    setup_logging(args.verbose);

    match args.into_builder().and_then(|b| b.run()) {
        Ok(results) => {
            if !results.stats.is_complete() {
                warn!(
                    dropped = results.stats.dropped,
                    panicked = results.stats.panicked,
                    "some branches could not be searched"
                );
            }
            debug!(matches = results.matches, "done");
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

fn report(e: FindError) -> ExitCode {
    debug!(code = e.exit_code(), error = ?e, "run failed");
    eprintln!("{}", cli::render(&e));
    ExitCode::from(e.exit_code())
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("parfind=debug,warn")
        } else {
            EnvFilter::new("parfind=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
