//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Trusted List toolkit: outline, sort and normalize ETSI TS 119 612 documents
#[derive(Parser, Debug)]
#[command(name = "tslkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config directory overriding the global one
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the document outline as a tree
    Outline {
        /// Trusted List document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Sort the outline before printing
        #[arg(short, long)]
        sorted: bool,
    },

    /// Run the save pipeline: sort, prune empty nodes, split extensions
    Normalize {
        /// Trusted List document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Do not sort collection elements
        #[arg(long)]
        no_sort: bool,
        /// Sort in descending order
        #[arg(long)]
        descending: bool,
        /// Keep empty elements and placeholder values
        #[arg(long)]
        keep_empty: bool,
        /// Do not split multi-content extensions
        #[arg(long)]
        no_split: bool,
    },

    /// Sort collection elements only
    Sort {
        /// Trusted List document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Sort in descending order
        #[arg(long)]
        descending: bool,
    },

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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Include the local config next to this document
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Show config paths
    Path,

    /// Print a commented config template
    Template,
}

impl Commands {
    /// Document the command operates on, if any.
    pub fn document(&self) -> Option<&PathBuf> {
        match self {
            Commands::Outline { file, .. } | Commands::Normalize { file, .. } | Commands::Sort { file, .. } => {
                Some(file)
            }
            Commands::Config {
                command: ConfigCommands::Show { file },
            } => file.as_ref(),
            _ => None,
        }
    }
}
