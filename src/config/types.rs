//! Exporter configuration structs and defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collectors::Domain;
use crate::identifiers::IdentifierLocale;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Target ip -> BMC credentials.
    pub hosts: BTreeMap<String, HostCredentials>,
    /// Target ip -> display name lookup table.
    pub device_names: Vec<DeviceName>,
    pub metrics: MetricsSettings,
    pub collection: CollectionSettings,
    pub logging: LoggingSettings,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct HostCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for HostCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceName {
    pub ip: String,
    pub name: String,
}

/// Per-domain enable flags; everything is collected unless switched off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    pub system: bool,
    pub sensors: bool,
    pub power: bool,
    pub storage: bool,
    pub memory: bool,
    pub network: bool,
    #[serde(alias = "sel")]
    pub event_log: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            system: true,
            sensors: true,
            power: true,
            storage: true,
            memory: true,
            network: true,
            event_log: true,
        }
    }
}

impl MetricsSettings {
    pub fn is_enabled(&self, domain: Domain) -> bool {
        match domain {
            Domain::System => self.system,
            Domain::Sensors => self.sensors,
            Domain::Power => self.power,
            Domain::Storage => self.storage,
            Domain::Memory => self.memory,
            Domain::Network => self.network,
            Domain::EventLog => self.event_log,
        }
    }

    pub fn enabled_domains(&self) -> Vec<Domain> {
        Domain::ALL
            .into_iter()
            .filter(|d| self.is_enabled(*d))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub request_timeout_secs: u64,
    /// Whole-cycle deadline; 0 disables it.
    pub cycle_deadline_secs: u64,
    pub memory_concurrency: usize,
    pub inspur_drive_concurrency: usize,
    pub controller_concurrency: usize,
    pub drive_concurrency: usize,
    pub interface_concurrency: usize,
    pub port_concurrency: usize,
    pub event_log_page_size: u32,
    pub event_log_max_entries: u32,
    pub identifier_locale: IdentifierLocale,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            cycle_deadline_secs: 300,
            memory_concurrency: 7,
            inspur_drive_concurrency: 8,
            controller_concurrency: 4,
            drive_concurrency: 8,
            interface_concurrency: 4,
            port_concurrency: 8,
            event_log_page_size: 50,
            event_log_max_entries: 50,
            identifier_locale: IdentifierLocale::Zh,
        }
    }
}

impl CollectionSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cycle_deadline(&self) -> Option<Duration> {
        (self.cycle_deadline_secs > 0).then(|| Duration::from_secs(self.cycle_deadline_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_level: String,
    /// Emit logs as JSON objects instead of the plain line format.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            json: false,
        }
    }
}
