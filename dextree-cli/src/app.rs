use std::path::PathBuf;

use clap::Parser;

/// dextree - list the classes, methods, fields and string constants of DEX containers
#[derive(Debug, Parser)]
#[command(name = "dextree", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Abort on the first method whose code cannot be decoded instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Check the checksum and signature of every container before reading it.
    #[arg(long)]
    pub verify: bool,

    /// DEX containers to disassemble, listed in the given order.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}

/// Options controlling how results are printed.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of the colored listing.
    #[arg(long)]
    pub json: bool,

    /// Disable ANSI colors in the listing.
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl GlobalOptions {
    /// Level for dextree's own log records. JSON output still reports warnings on stderr.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.json {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        }
    }
}
