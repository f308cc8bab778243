//! Config file load and validation; device-name table lookup.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::types::{CollectionSettings, DeviceName, ExporterConfig, HostCredentials};

/// Where a loaded config came from, for the caller to log once tracing is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file was absent; built-in defaults are in effect.
    Defaults(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "Loaded configuration from: {:?}", path),
            ConfigSource::Defaults(path) => write!(f, "Config file {:?} not found, using defaults", path),
        }
    }
}

pub async fn load_config(path: Option<&str>) -> Result<(ExporterConfig, ConfigSource)> {
    let config_path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        let exe_dir = std::env::current_exe()?
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine executable directory"))?
            .to_path_buf();
        exe_dir.join("config.json")
    };

    let (config, source) = if config_path.exists() {
        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read {:?}", config_path))?;
        let config: ExporterConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", config_path))?;
        (config, ConfigSource::File(config_path))
    } else {
        (ExporterConfig::default(), ConfigSource::Defaults(config_path))
    };

    validate(&config.collection)?;
    Ok((config, source))
}

/// Reject settings that would stall or disable a fan-out site.
pub fn validate(collection: &CollectionSettings) -> Result<()> {
    let bounds = [
        ("memory_concurrency", collection.memory_concurrency),
        ("inspur_drive_concurrency", collection.inspur_drive_concurrency),
        ("controller_concurrency", collection.controller_concurrency),
        ("drive_concurrency", collection.drive_concurrency),
        ("interface_concurrency", collection.interface_concurrency),
        ("port_concurrency", collection.port_concurrency),
    ];
    for (name, value) in bounds {
        if value == 0 {
            bail!("collection.{name} must be at least 1");
        }
    }
    if collection.event_log_page_size == 0 {
        bail!("collection.event_log_page_size must be at least 1");
    }
    if collection.request_timeout_secs == 0 {
        bail!("collection.request_timeout_secs must be at least 1");
    }
    Ok(())
}

/// Load a standalone `[{"ip": ..., "name": ...}]` lookup file.
pub async fn load_device_names(path: &Path) -> Result<Vec<DeviceName>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read device name table {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse device name table {:?}", path))
}

pub fn device_name_for(table: &[DeviceName], target: &str) -> Option<String> {
    table.iter().find(|d| d.ip == target).map(|d| d.name.clone())
}

pub fn credentials_for<'a>(config: &'a ExporterConfig, target: &str) -> Option<&'a HostCredentials> {
    config.hosts.get(target)
}

/// Copy of the config safe to print.
pub fn redacted(config: &ExporterConfig) -> ExporterConfig {
    let mut copy = config.clone();
    for creds in copy.hosts.values_mut() {
        creds.password = "********".to_string();
    }
    copy
}
