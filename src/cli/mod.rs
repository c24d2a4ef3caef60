//! CLI module for reeldb
//!
//! Provides command-line interface for:
//! - find: one page of rows matching filter parameters
//! - count: number of matching rows
//! - get: one row by id with eager relations

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{count, find, get, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response};
