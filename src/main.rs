//! reeldb CLI entry point
//!
//! Parses arguments and dispatches to the CLI module, which prints exactly
//! one JSON response on stdout. Exits non-zero on failure.

use reeldb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
