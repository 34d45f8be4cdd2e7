use anyhow::Context;
use clap::Parser;

use lombarter::cli::{Cli, Commands, execute_command, init_logger_from_settings, load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli).context("failed to load configuration")?;

    if cli.selected_command() == Commands::Run {
        init_logger_from_settings(&settings).context("failed to initialize logger")?;
    }

    execute_command(&cli, settings).await?;
    Ok(())
}
