//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

/// Play Peril against other clients over a shared message broker.
#[derive(Debug, Parser)]
#[command(name = "peril-client", version, about)]
pub struct Cli {
    /// YAML configuration file. Missing file means defaults.
    #[arg(long, default_value = "peril-config.yaml")]
    pub config: PathBuf,

    /// Player name. Prompted for when omitted.
    #[arg(long)]
    pub username: Option<String>,
}
