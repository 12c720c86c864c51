//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Canonical set trees: parse brace-nested set notation into sorted, duplicate-free trees
#[derive(Parser, Debug)]
#[command(name = "settree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short = 'c', long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Element delimiter (overrides settings)
    #[arg(long, global = true)]
    pub delimiter: Option<String>,

    /// Row delimiter for multi-row input (overrides settings)
    #[arg(long, global = true)]
    pub row_delimiter: Option<String>,

    /// Drop empty elements instead of keeping them as {}
    #[arg(long, global = true)]
    pub ignore_empty: bool,

    /// Accept "1,2,3" as shorthand for "{1,2,3}"
    #[arg(long, global = true)]
    pub auto_wrap: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the canonical form of each expression ("-" reads rows from stdin)
    Render {
        #[arg(required = true)]
        expressions: Vec<String>,
    },

    /// Show the nesting of an expression as a tree
    Tree { expression: String },

    /// Show counts and empty-element diagnostics
    Info { expression: String },

    /// Compare two expressions in canonical set order
    Compare { left: String, right: String },

    /// Show the member at a position (elements first, then subsets)
    At { expression: String, index: usize },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings as TOML
    Show,
    /// Print a commented settings template
    Template,
    /// Print the global settings file location
    Path,
}
