//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// draftlint - Incremental linter for LaTeX-style documents
#[derive(Parser)]
#[command(name = "dlint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable caching
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a parsed element sequence
    Check {
        /// JSON file holding the parser's element array
        elements: PathBuf,

        /// Treat the input as the new contents of this one file
        #[arg(long)]
        file: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Workspace root holding the config file and cache directory
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },

    /// Inspect or remove stored snapshots
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show what the cache directory holds
    Status {
        /// Workspace root
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },

    /// Delete the cache directory
    Clean {
        /// Workspace root
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}
