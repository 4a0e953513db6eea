use portico_config::PorticoConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: &PorticoConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Run => commands::run::handle(config).await,
        Commands::Once(args) => commands::once::handle(&args, config, flags).await,
        Commands::Config => commands::config::handle(config, flags),
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
