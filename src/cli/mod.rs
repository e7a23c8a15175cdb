//! Command-line interface for gallerycrawl.

mod commands;
mod progress;

pub use commands::{is_verbose, run};
