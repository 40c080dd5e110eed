//! `jayzone` - heart-rate zone time and goal tracking from the terminal.

mod cli;
mod commands;
mod config;
mod format;
mod style;
mod util;

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{cmd_cache, cmd_config, cmd_goals, cmd_import, cmd_summary, cmd_zones};
use config::{Config, Settings};
use format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "jayzone", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from(&config_path);
    tracing::debug!("Using config {}", config_path.display());

    // Resolved lazily so `config` can repair a file holding bad values.
    let settings = Settings::resolve(&cli, &config);

    match cli.command {
        Commands::Summary(args) => cmd_summary(args, &settings?).await,
        Commands::Import { input } => cmd_import(input, &settings?),
        Commands::Zones { action } => cmd_zones(action, &settings?),
        Commands::Goals { action } => cmd_goals(action, &settings?),
        Commands::Cache { action } => cmd_cache(action, &settings?),
        Commands::Config { action } => {
            let opts = FormatOptions {
                no_color: cli.no_color || config.no_color,
                compact: cli.compact,
            };
            cmd_config(action, &config_path, config, &opts, cli.json, cli.quiet)
        }
        Commands::Completions { .. } => Ok(()),
    }
}
