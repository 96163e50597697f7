//! CLI library modules for the clinspan binary.
//!
//! Kept in the library so argument parsing and commands can be tested
//! without spawning the binary.

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

pub use parser::{Cli, Commands, OutputFormat};

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Extract(args) => commands::extract::cmd_extract(args),
        Commands::Eval(args) => commands::eval::cmd_eval(args),
        Commands::Lexicon(args) => commands::lexicon::cmd_lexicon(args),
    }
}
