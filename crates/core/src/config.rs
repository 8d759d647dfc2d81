//! Application configuration.
//!
//! Configuration is layered: built-in defaults, then an optional TOML
//! file under the platform config directory, then `STORETUI_*`
//! environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

const DEFAULT_API_ORIGIN: &str = "http://localhost:3001";
const DEFAULT_GAMES_ENDPOINT: &str = "/api/games";
const DEFAULT_START_PATH: &str = "/";

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# StoreTUI configuration.
#
# api_origin: scheme, host and port of the storefront backend. Relative
# image paths in catalog records are resolved against this value.
# games_endpoint: catalog path appended to api_origin.
# start_path: route the UI opens on startup (/store, /about or /).

api_origin = "http://localhost:3001"
games_endpoint = "/api/games"
start_path = "/"
"#;

/// Runtime configuration for the storefront client.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Scheme, host and port of the backend API.
    pub api_origin: String,
    /// Catalog endpoint path, relative to the origin.
    pub games_endpoint: String,
    /// Route path the UI opens on startup.
    pub start_path: String,
}

impl AppConfig {
    /// Load configuration from defaults, the user config file, and
    /// `STORETUI_*` environment overrides, in that precedence order.
    pub fn load() -> Result<Self> {
        Self::load_from(config_file_path())
    }

    fn load_from(file: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_origin", DEFAULT_API_ORIGIN)?
            .set_default("games_endpoint", DEFAULT_GAMES_ENDPOINT)?
            .set_default("start_path", DEFAULT_START_PATH)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(Environment::with_prefix("STORETUI"))
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")
    }
}

/// Platform path of the user config file, if a config directory exists.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("storetui").join("config.toml"))
}

/// Write a commented default config file on first run, leaving any
/// existing file untouched.
pub fn ensure_default_config() -> Result<()> {
    let Some(path) = config_file_path() else {
        return Ok(());
    };
    ensure_config_at(&path)
}

fn ensure_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}
