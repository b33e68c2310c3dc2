//! CLI layer for gw-search.
//!
//! Provides the command-line interface using clap, with one subcommand per
//! tool: `search`, `chart` and `backup`.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands, Job};
