//! Exporter configuration: types and file persistence.

pub mod persistence;
pub mod types;

pub use types::{
    CollectionSettings, DeviceName, ExporterConfig, HostCredentials, LoggingSettings, MetricsSettings,
};
