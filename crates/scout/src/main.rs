mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    scout_runtime::init_logging();

    // Parse CLI args
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => commands::init::run_init(&path),
        Commands::Discover(args) => {
            let config = config::load_config(cli.config.as_deref())?;
            let config = config::apply_args(config, &args)?;
            commands::discover::execute(config, args.sync, args.roots).await
        }
    }
}
