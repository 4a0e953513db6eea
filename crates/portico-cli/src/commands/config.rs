use portico_config::PorticoConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `portico config`.
pub fn handle(config: &PorticoConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&config.redacted(), flags.format)
}
