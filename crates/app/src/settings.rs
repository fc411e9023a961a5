//! Settings for the `portal` binary.
//!
//! Sources, lowest priority first: the TOML file (`config/portal.toml` unless
//! `--config` is given), `PORTAL_*` environment variables (`__` separates
//! sections, e.g. `PORTAL_API__CORE_URL`), then command line overrides.

use api_types::Platform;
use client::ApiSettings;
use serde::Deserialize;

use crate::{commands::Args, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/portal.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    pub platform: Platform,
    /// Deployment mode: `development`, `homologation` or `production`.
    pub mode: String,
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            platform: Platform::Gestao,
            mode: "development".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub path: String,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            path: "config/portal_storage.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Reporting {
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub api: ApiSettings,
    pub storage: Storage,
    pub reporting: Reporting,
}

pub fn load(args: &Args) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("PORTAL").separator("__"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(level) = &args.level {
        settings.app.level = level.clone();
    }
    if let Some(platform) = args.platform {
        settings.app.platform = platform;
    }
    if let Some(core_url) = &args.core_url {
        settings.api.core_url = core_url.clone();
    }
    if let Some(auth_url) = &args.auth_url {
        settings.api.auth_url = auth_url.clone();
    }
    if let Some(storage) = &args.storage {
        settings.storage.path = storage.clone();
    }

    Ok(settings)
}
