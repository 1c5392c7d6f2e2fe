use std::path::PathBuf;

use clap::Args;
use vaultsift_core::bail_invalid;
use vaultsift_core::config::{PolicyOverrides, ProviderConfig};
use vaultsift_core::error::Result;

use super::parse::parse_byte_size;

/// Provider connection flags shared by commands that call the model
#[derive(Args, Debug, Clone, Default)]
pub struct ProviderArgs {
    /// API key (defaults to the environment variable named in config)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the generative language API
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl ProviderArgs {
    /// Apply flags on top of the configured provider
    pub fn apply(&self, mut config: ProviderConfig) -> ProviderConfig {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReviewArgs {
    /// Vault directory (defaults to the current directory)
    pub vault: Option<PathBuf>,

    /// Ignore any saved session and start over
    #[arg(long)]
    pub fresh: bool,

    /// Skip notes larger than this (e.g. 50000, 64k, 1M)
    #[arg(long, value_parser = parse_byte_size)]
    pub max_size: Option<u64>,

    /// Only review notes directly inside the vault root
    #[arg(long)]
    pub shallow: bool,

    /// Delete notes scoring at or below this without asking
    #[arg(long, value_name = "SCORE")]
    pub auto_delete_below: Option<f64>,

    /// Delete on `d` without a y/N confirmation
    #[arg(long)]
    pub no_confirm_delete: bool,

    /// Pause between provider calls, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

impl ReviewArgs {
    /// Policy flags given on this run. Unset flags stay `None` so a resumed
    /// session keeps its saved policy.
    pub fn overrides(&self) -> Result<PolicyOverrides> {
        if let Some(score) = self.auto_delete_below {
            if !(0.0..=10.0).contains(&score) {
                bail_invalid!("auto-delete score (expected 0-10)", score);
            }
        }
        Ok(PolicyOverrides {
            max_note_bytes: self.max_size,
            shallow: self.shallow.then_some(true),
            auto_delete_max_score: self.auto_delete_below,
            confirm_delete: self.no_confirm_delete.then_some(false),
            request_delay_ms: self.delay_ms,
        })
    }
}
