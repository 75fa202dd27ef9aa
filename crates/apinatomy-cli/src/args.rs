//! Command-line argument definitions for the ApiNATOMY CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`].

use clap::Parser;

/// Command-line arguments for the ApiNATOMY model tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input model (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the resolved output model
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Multiply every coordinate and size of the built model
    #[arg(long)]
    pub scale: Option<f64>,

    /// Fail when the build records an error diagnostic
    #[arg(long)]
    pub strict: bool,
}
