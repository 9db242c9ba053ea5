use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "droplet")]
#[command(about = "Browse and submit crowdsourced water-quality readings")]
pub(crate) struct Args {
    /// TOML configuration file
    #[arg(long, short, default_value = "droplet.toml")]
    pub config: PathBuf,

    /// File receiving log output (the terminal is taken by the UI)
    #[arg(long, default_value = "droplet.log")]
    pub log_file: PathBuf,

    #[arg(long, short, help = "Enable verbose logging")]
    pub verbose: bool,
}
