use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metacache", about = "Parquet metadata cache tools", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a TOML config file with a [codec] table
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum bytes to read from one cache file (overrides the config file)
    #[arg(long, global = true)]
    pub size_limit: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a JSON metadata cache into the binary format
    Convert {
        /// JSON cache to read
        input: PathBuf,

        /// Binary cache to write
        output: PathBuf,
    },

    /// Decode a binary cache and report timing and counts
    Parse {
        /// Binary cache to read
        input: PathBuf,

        /// Print the decoded cache as JSON
        #[arg(long)]
        dump: bool,
    },

    /// Compare two binary caches; exits 1 when they differ
    Compare {
        /// First binary cache
        left: PathBuf,

        /// Second binary cache
        right: PathBuf,
    },

    /// Convert a binary cache back into JSON
    Export {
        /// Binary cache to read
        input: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}
