//! Animagen server binary
//!
//! Usage:
//!   animagen                      Serve with animagen.toml or defaults
//!   animagen --config-dir <dir>   Load configuration from <dir>
//!   animagen --bind <addr>        Override the bind address
//!   animagen --write-config       Write a default animagen.toml and exit

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "animagen")]
#[command(author, version, about = "Prompt-to-animation rendering service")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory containing animagen.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Write a default animagen.toml to the config directory and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if cli.write_config {
        animagen_core::AnimagenConfig::write_default(&cli.config_dir)?;
        info!("Wrote default configuration to {:?}", cli.config_dir);
        return Ok(());
    }

    let config = animagen_core::AnimagenConfig::load_or_default(&cli.config_dir)?;
    let addr = cli.bind.unwrap_or_else(|| config.server.bind_addr.clone());

    let state = animagen_api::AppState::from_config(&config)?;
    animagen_api::serve(state, &addr).await
}
