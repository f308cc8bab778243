//! Typed hardware facts produced by a collection cycle.
//! Records are flat values: they carry every field a serializer needs and
//! hold no reference back to the session that produced them.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Presence state shared by sensors, drives, memory, power supplies and interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    Enabled,
    Absent,
    Other(String),
}

impl ResourceState {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            // Inspur and some H3C firmware report "ENABLE".
            Some("Enabled") | Some("ENABLE") => Self::Enabled,
            Some("Absent") => Self::Absent,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other(String::new()),
        }
    }

    /// Only present resources produce records; everything else is dropped silently.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemFact {
    pub device_name: Option<String>,
    pub power_state: String,
    pub power_on: bool,
    pub health: String,
    pub indicator_led: String,
    pub indicator_led_on: bool,
    pub memory_bytes: Option<f64>,
    pub cpu_count: Option<u32>,
    pub cpu_model: String,
    pub bios_version: String,
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub id: String,
    pub name: String,
    pub celsius: f64,
    pub units: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanReading {
    pub id: String,
    pub name: String,
    pub health: String,
    pub speed: Option<f64>,
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSupplyReading {
    pub id: String,
    pub health: String,
    pub input_watts: Option<f64>,
    pub input_voltage: Option<f64>,
    pub output_watts: Option<f64>,
    pub capacity_watts: Option<f64>,
    pub efficiency_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerControlReading {
    pub id: String,
    pub name: String,
    pub consumed_watts: Option<f64>,
    pub capacity_watts: Option<f64>,
    /// Min/max/average/interval, only when the control exposes `PowerMetrics`.
    pub metrics: Option<PowerControlMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerControlMetrics {
    pub min_consumed_watts: Option<f64>,
    pub max_consumed_watts: Option<f64>,
    pub average_consumed_watts: Option<f64>,
    pub interval_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveRecord {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
    pub media_type: String,
    pub protocol: String,
    pub slot: Option<i64>,
    pub health: String,
    pub capacity_bytes: Option<u64>,
    pub predicted_life_left_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryModuleRecord {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub memory_type: String,
    pub serial: String,
    pub ecc: String,
    pub rank: Option<u32>,
    pub health: String,
    pub capacity_bytes: Option<u64>,
    pub speed_mhz: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInterfaceFact {
    pub id: String,
    pub health: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkPortFact {
    pub interface_id: String,
    pub id: String,
    pub health: String,
    pub speed_mbps: Option<u32>,
    pub link_status: String,
    pub link_up: bool,
}

impl NetworkPortFact {
    pub fn link_up_from(status: &str) -> bool {
        matches!(status, "Up" | "LinkUp")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLogEntry {
    pub id: String,
    pub message: String,
    pub component: String,
    pub severity: String,
    pub created: Option<DateTime<Utc>>,
}

/// One fact emitted onto the cycle's output stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainRecord {
    SystemFact(SystemFact),
    TemperatureReading(TemperatureReading),
    FanReading(FanReading),
    PowerSupplyReading(PowerSupplyReading),
    PowerControlReading(PowerControlReading),
    DriveRecord(DriveRecord),
    MemoryModuleRecord(MemoryModuleRecord),
    NetworkInterfaceFact(NetworkInterfaceFact),
    NetworkPortFact(NetworkPortFact),
    EventLogEntry(EventLogEntry),
}

macro_rules! into_domain_record {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for DomainRecord {
                fn from(record: $variant) -> Self {
                    DomainRecord::$variant(record)
                }
            }
        )*
    };
}

into_domain_record!(
    SystemFact,
    TemperatureReading,
    FanReading,
    PowerSupplyReading,
    PowerControlReading,
    DriveRecord,
    MemoryModuleRecord,
    NetworkInterfaceFact,
    NetworkPortFact,
    EventLogEntry,
);
