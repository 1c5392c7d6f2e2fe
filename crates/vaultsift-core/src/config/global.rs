//! User configuration (stored in ~/.config/vaultsift/config.toml)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::types::{ProviderConfig, ReviewPolicy};
use crate::error::{Result, VaultError};

const CONFIG_DIR: &str = "vaultsift";
const CONFIG_FILE: &str = "config.toml";
pub const CONFIG_DIR_ENV_VAR: &str = "VAULTSIFT_CONFIG_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub policy: ReviewPolicy,
}

impl GlobalConfig {
    /// Resolve the config file path from an explicit directory, the
    /// environment override, or the platform config dir.
    pub fn config_path(dir_override: Option<&Path>) -> Result<PathBuf> {
        let config_dir = if let Some(dir) = dir_override {
            dir.to_path_buf()
        } else if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(env_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    VaultError::Other("unable to determine config directory".to_string())
                })?
                .join(CONFIG_DIR)
        };

        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Load the config, falling back to defaults when the file is missing
    pub fn load(dir_override: Option<&Path>) -> Result<Self> {
        let path = Self::config_path(dir_override)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| VaultError::io_operation("read config", path.display(), e))?;

        let mut config: GlobalConfig = toml::from_str(&content)?;
        config.provider = config.provider.normalized();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| VaultError::io_operation("create config directory", dir.display(), e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| VaultError::Other(format!("failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| VaultError::io_operation("write config", path.display(), e))
    }
}
