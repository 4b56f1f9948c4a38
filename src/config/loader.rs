use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config as ConfigLoader, FileFormat};

use super::schema::ScanConfig;

/// Load configuration from a file
pub fn load_config(config_path: Option<&Path>) -> Result<ScanConfig> {
    let mut config_builder = ConfigLoader::builder();

    // Default configuration
    config_builder = config_builder.add_source(config::File::from_str(
        include_str!("../../config/default.toml"),
        FileFormat::Toml,
    ));

    // User-provided configuration
    if let Some(path) = config_path {
        config_builder = config_builder.add_source(config::File::from(path));
    } else {
        let default_path = get_default_config_path();
        if default_path.exists() {
            config_builder = config_builder.add_source(config::File::from(default_path.as_path()));
        }
    }

    // Environment variables
    config_builder = config_builder.add_source(config::Environment::with_prefix("TORSCOUT"));

    let config: ScanConfig = config_builder
        .build()?
        .try_deserialize()
        .context("Failed to load configuration")?;

    Ok(config)
}

/// Get the default configuration path
pub fn get_default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".torscout/config.toml")
}
