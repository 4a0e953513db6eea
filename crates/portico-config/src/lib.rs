//! # portico-config
//!
//! Settings for the portal, the sync loop and the catalog sink, merged with
//! figment. Later sources override earlier ones:
//! 1. built-in defaults
//! 2. `~/.config/portico/config.toml`
//! 3. `./portico.toml`, or the file passed with `--config`
//! 4. `PORTICO_*` environment variables
//!
//! Nested keys are joined with a double underscore, so
//! `PORTICO_PORTAL__CLIENT_ID` sets `portal.client_id` and
//! `PORTICO_SYNC__FREQUENCY__MINUTES` sets `sync.frequency.minutes`.
//!
//! # Example
//!
//! ```no_run
//! use portico_config::PorticoConfig;
//!
//! let config = PorticoConfig::load_with_dotenv().expect("config");
//! println!("portal: {}", config.portal.server_url());
//! println!("every {:?}", config.sync.frequency());
//! ```

mod catalog;
mod error;
mod portal;
mod sync;

pub use catalog::CatalogConfig;
pub use error::ConfigError;
pub use portal::{DEFAULT_SERVER_URL, PortalConfig};
pub use sync::{DEFAULT_FREQUENCY, DEFAULT_TIMEOUT, DurationSpec, SyncConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "portico.toml";

fn default_environment() -> String {
    "production".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PorticoConfig {
    /// Deployment environment name, part of the provider identity.
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for PorticoConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            portal: PortalConfig::default(),
            sync: SyncConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl PorticoConfig {
    /// Merge defaults, both TOML files and the environment.
    ///
    /// `.env` files are left alone; see [`Self::load_with_dotenv`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `config_path` instead of `./portico.toml`
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source is malformed.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(config_path).extract().map_err(ConfigError::from)
    }

    /// Same as [`Self::load`], after exporting `./.env` into the process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source is malformed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load()
    }

    /// The merged provider stack, before extraction.
    #[must_use]
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // --config replaces ./portico.toml rather than stacking on it
        let local_path =
            config_path.map_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE), Path::to_path_buf);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("PORTICO_").split("__"))
    }

    /// Provider name, unique per environment.
    #[must_use]
    pub fn provider_name(&self) -> String {
        format!("portico-provider:{}", self.environment)
    }

    /// Copy with secrets masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            portal: self.portal.redacted(),
            ..self.clone()
        }
    }

    /// `~/.config/portico/config.toml`, when a config dir exists.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("portico").join("config.toml"))
    }
}
