//! Dispatches parsed commands to their handlers.

use super::handlers::{CheckCommandHandler, RunCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Environment;
use crate::config::settings::Settings;
use crate::error::AppResult;

pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.selected_command() {
        Commands::Check => CheckCommandHandler::new(settings).execute(),
        Commands::Run => {
            let environment = cli
                .env
                .map(Into::into)
                .unwrap_or_else(Environment::from_env);
            RunCommandHandler::new(settings, environment)
                .execute()
                .await
        }
    }
}
