//! Command-line interface definitions for mapdoc

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the mapdoc application
#[derive(Parser)]
#[command(name = "mapdoc")]
#[command(version)]
#[command(about = "Layer composition and map export engine", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for mapdoc
#[derive(Subcommand)]
pub enum Commands {
    /// Build every showcase document plus the navigation page
    Build {
        /// Output directory for the generated artifacts
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Engine configuration file
        #[arg(short, long, default_value = "mapdoc.toml")]
        config: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Regenerate the navigation page for an existing output directory
    Index {
        /// Directory containing previously published artifacts
        #[arg(value_name = "PATH", default_value = "output")]
        dir: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}
