//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

/// Coordinate a Peril game: declare exchanges, pause and resume play,
/// aggregate game logs.
#[derive(Debug, Parser)]
#[command(name = "peril-server", version, about)]
pub struct Cli {
    /// YAML configuration file. Missing file means defaults.
    #[arg(long, default_value = "peril-config.yaml")]
    pub config: PathBuf,
}
