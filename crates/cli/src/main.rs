//! SousChef CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive chat or single-message mode
//! - `init`: Write a default config file
//! - `tools`: List the registered tools and their schemas

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use souschef_config::AppConfig;

mod commands;
mod logging;

#[derive(Parser)]
#[command(
    name = "souschef",
    about = "SousChef — your conversational cooking assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.souschef/config.toml
    #[arg(short, long, global = true, env = "SOUSCHEF_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with SousChef
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// List the tools SousChef can call
    Tools,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        logging::init(&Default::default(), cli.verbose)?;
        return commands::init::run(cli.config, force);
    }

    let config = match &cli.config {
        Some(path) => AppConfig::load_with_overrides(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;

    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Chat { message } => commands::chat::run(config, message).await?,
        Commands::Tools => commands::tools::run(&config)?,
        Commands::Init { .. } => {}
    }

    Ok(())
}
