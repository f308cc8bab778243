//! Redfish wire types: service root, collections, and the resources each domain reads.
//! Only the fields the collectors consume are modelled; everything else is ignored.
//! Text and numeric fields are optional because vendors routinely send `null` or omit them.

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` the same as a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{"@odata.id": "..."}` reference to another resource.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OdataLink {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: String,
}

/// Any `Members` collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Collection {
    #[serde(default, deserialize_with = "null_default")]
    pub members: Vec<OdataLink>,
}

impl Collection {
    pub fn first_member(&self) -> Option<&str> {
        self.members
            .first()
            .map(|m| m.odata_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub state: Option<String>,
    pub health: Option<String>,
}

// ============================================================================
// DISCOVERY
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    pub name: Option<String>,
    pub systems: Option<OdataLink>,
    pub chassis: Option<OdataLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chassis {
    pub thermal: Option<OdataLink>,
    pub power: Option<OdataLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    #[serde(rename = "SKU")]
    pub sku: Option<String>,
    pub power_state: Option<String>,
    #[serde(rename = "IndicatorLED")]
    pub indicator_led: Option<String>,
    pub bios_version: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
    pub memory_summary: Option<MemorySummary>,
    pub processor_summary: Option<ProcessorSummary>,
    pub storage: Option<OdataLink>,
    pub memory: Option<OdataLink>,
    pub network_interfaces: Option<OdataLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySummary {
    #[serde(rename = "TotalSystemMemoryGiB")]
    pub total_system_memory_gib: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorSummary {
    pub count: Option<u32>,
    pub model: Option<String>,
}

// ============================================================================
// THERMAL / POWER
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thermal {
    #[serde(default, deserialize_with = "null_default")]
    pub temperatures: Vec<Temperature>,
    #[serde(default, deserialize_with = "null_default")]
    pub fans: Vec<Fan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Temperature {
    pub member_id: Option<String>,
    pub name: Option<String>,
    pub reading_celsius: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
}

impl Temperature {
    /// `MemberId` when the firmware sends one, else the position in the array.
    pub fn id(&self, index: usize) -> String {
        member_id_or_index(self.member_id.as_deref(), index)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fan {
    pub member_id: Option<String>,
    pub name: Option<String>,
    /// Pre-1.1 schema name field, still sent by older iDRAC and iLO firmware.
    pub fan_name: Option<String>,
    pub reading: Option<f64>,
    pub reading_units: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
}

impl Fan {
    pub fn id(&self, index: usize) -> String {
        member_id_or_index(self.member_id.as_deref(), index)
    }

    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.name.as_deref()).or_else(|| non_empty(self.fan_name.as_deref()))
    }

    pub fn units(&self) -> Option<&str> {
        non_empty(self.reading_units.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Power {
    #[serde(default, deserialize_with = "null_default")]
    pub power_supplies: Vec<PowerSupply>,
    #[serde(default, deserialize_with = "null_default")]
    pub power_control: Vec<PowerControl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PowerSupply {
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
    pub power_input_watts: Option<f64>,
    pub line_input_voltage: Option<f64>,
    pub last_power_output_watts: Option<f64>,
    pub power_output_watts: Option<f64>,
    pub power_capacity_watts: Option<f64>,
    pub efficiency_percent: Option<f64>,
}

impl PowerSupply {
    pub fn output_watts(&self) -> Option<f64> {
        self.last_power_output_watts.or(self.power_output_watts)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PowerControl {
    pub name: Option<String>,
    pub power_consumed_watts: Option<f64>,
    pub power_capacity_watts: Option<f64>,
    pub power_metrics: Option<PowerMetrics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PowerMetrics {
    pub min_consumed_watts: Option<f64>,
    pub max_consumed_watts: Option<f64>,
    pub average_consumed_watts: Option<f64>,
    #[serde(alias = "IntervalInMinutes")]
    pub interval_in_min: Option<u32>,
}

// ============================================================================
// STORAGE / MEMORY
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageController {
    #[serde(default, deserialize_with = "null_default")]
    pub drives: Vec<OdataLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Drive {
    pub id: Option<String>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub media_type: Option<String>,
    pub protocol: Option<String>,
    pub capacity_bytes: Option<u64>,
    pub predicted_media_life_left_percent: Option<f64>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
    pub physical_location: Option<PhysicalLocation>,
    // Legacy HPE (iLO 4) SmartStorage fields
    #[serde(rename = "CapacityMiB")]
    pub capacity_mib: Option<u64>,
    pub interface_type: Option<String>,
    #[serde(rename = "SSDEnduranceUtilizationPercentage")]
    pub ssd_endurance_utilization_percentage: Option<f64>,
}

impl Drive {
    pub fn slot(&self) -> Option<i64> {
        self.physical_location
            .as_ref()
            .and_then(|l| l.part_location.as_ref())
            .and_then(|p| p.location_ordinal_value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhysicalLocation {
    pub part_location: Option<PartLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartLocation {
    pub location_ordinal_value: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemoryModule {
    pub id: Option<String>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub memory_device_type: Option<String>,
    pub serial_number: Option<String>,
    pub error_correction: Option<String>,
    pub rank_count: Option<u32>,
    #[serde(rename = "CapacityMiB")]
    pub capacity_mib: Option<u64>,
    pub operating_speed_mhz: Option<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
    // Legacy HPE (iLO 4) field names
    pub rank: Option<u32>,
    #[serde(rename = "DIMMType")]
    pub dimm_type: Option<String>,
    #[serde(rename = "DIMMStatus")]
    pub dimm_status: Option<String>,
    #[serde(rename = "SizeMB")]
    pub size_mb: Option<u64>,
}

// ============================================================================
// NETWORK
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
    pub network_ports: Option<OdataLink>,
    pub ports: Option<OdataLink>,
}

impl NetworkInterface {
    pub fn ports_path(&self) -> Option<&str> {
        self.network_ports
            .as_ref()
            .or(self.ports.as_ref())
            .map(|l| l.odata_id.as_str())
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkPort {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub status: Status,
    pub link_status: Option<String>,
    pub current_link_speed_mbps: Option<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub supported_link_capabilities: Vec<LinkCapability>,
}

impl NetworkPort {
    pub fn speed_mbps(&self) -> Option<u32> {
        self.current_link_speed_mbps.or_else(|| {
            self.supported_link_capabilities
                .iter()
                .find_map(|c| c.link_speed_mbps)
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkCapability {
    pub link_speed_mbps: Option<u32>,
}

// ============================================================================
// EVENT LOGS
// ============================================================================

/// iDRAC-style SEL: `Created` is RFC 3339 text, parsed per entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelCollection {
    #[serde(default, deserialize_with = "null_default")]
    pub members: Vec<SelEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelEntry {
    pub id: Option<String>,
    pub message: Option<String>,
    pub sensor_type: Option<String>,
    pub severity: Option<String>,
    pub created: Option<String>,
}

/// Inspur log entries carry `Created` as `YY-MM-DD HH:MM:SS` text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InspurSelCollection {
    #[serde(default, deserialize_with = "null_default")]
    pub members: Vec<InspurSelEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InspurSelEntry {
    pub id: Option<String>,
    pub message: Option<String>,
    pub sensor_type: Option<String>,
    pub severity: Option<String>,
    pub created: Option<String>,
}

/// Huawei iBMC answers the SEL query action with an error envelope whose
/// extended info carries the entries under its OEM block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HuaweiSelResponse {
    pub error: Option<HuaweiEnvelope>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HuaweiEnvelope {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "@Message.ExtendedInfo", default, deserialize_with = "null_default")]
    pub extended_info: Vec<HuaweiExtendedInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HuaweiExtendedInfo {
    pub oem: Option<HuaweiOemBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HuaweiOemBlock {
    pub huawei: Option<HuaweiSelEntries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HuaweiSelEntries {
    #[serde(default, deserialize_with = "null_default")]
    pub sel_log_entries: Vec<HuaweiSelEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HuaweiSelEntry {
    pub level: Option<String>,
    pub eventid: Option<String>,
    pub eventdesc: Option<String>,
    pub alerttime: Option<String>,
}

impl HuaweiSelResponse {
    pub fn entries(self) -> Vec<HuaweiSelEntry> {
        self.error
            .into_iter()
            .flat_map(|e| e.extended_info)
            .filter_map(|info| info.oem)
            .filter_map(|oem| oem.huawei)
            .flat_map(|h| h.sel_log_entries)
            .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn member_id_or_index(member_id: Option<&str>, index: usize) -> String {
    match non_empty(member_id) {
        Some(id) => id.to_string(),
        None => index.to_string(),
    }
}
