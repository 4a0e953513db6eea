use std::path::Path;

use anyhow::Context;
use portico_config::PorticoConfig;

use crate::cli::GlobalFlags;

pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<PorticoConfig> {
    load_dotenv(flags.config.as_deref())?;

    if let Some(path) = &flags.config
        && !path.exists()
    {
        anyhow::bail!("config file '{}' does not exist", path.display());
    }

    PorticoConfig::load_from(flags.config.as_deref()).context("failed to load portico configuration")
}

/// Prefer a `.env` next to an explicit config file, then the working directory.
fn load_dotenv(config_path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(dir) = config_path.and_then(Path::parent) {
        let env_path = dir.join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path)
                .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
            return Ok(());
        }
    }

    dotenvy::dotenv().ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn flags(config: Option<std::path::PathBuf>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            config,
        }
    }

    #[test]
    fn explicit_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portico.toml");
        std::fs::write(
            &path,
            "[catalog]\nsystem_name = \"tracks-apis\"\n\n[sync]\nfrequency = { seconds = 90 }\n",
        )
        .unwrap();

        let config = load_config(&flags(Some(path))).unwrap();
        assert_eq!(config.catalog.system_name, "tracks-apis");
        assert_eq!(config.sync.frequency(), std::time::Duration::from_secs(90));
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_config(&flags(Some(dir.path().join("absent.toml")))).unwrap_err();
        assert!(error.to_string().contains("does not exist"));
    }
}
