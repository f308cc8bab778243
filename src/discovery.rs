//! One-time endpoint walk: root -> systems -> chassis -> system, then vendor
//! detection and path corrections. Produces the frozen `Session` every
//! collector reads.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{RedfishError, Result};
use crate::quirks::{quirks_for, VendorQuirks, LEGACY_FIRMWARE};
use crate::redfish::types::{Chassis, Collection, ComputerSystem, OdataLink, ServiceRoot};
use crate::redfish::{ensure_redfish_path, get_as, RedfishTransport, REDFISH_ROOT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Vendor {
    #[default]
    Unknown,
    Dell,
    Hpe,
    Lenovo,
    Inspur,
    H3c,
    Huawei,
}

/// Manufacturer keywords, checked in order; first substring hit wins.
const VENDOR_KEYWORDS: &[(&str, Vendor)] = &[
    ("dell", Vendor::Dell),
    ("hpe", Vendor::Hpe),
    ("lenovo", Vendor::Lenovo),
    ("inspur", Vendor::Inspur),
    ("h3c", Vendor::H3c),
    ("huawei", Vendor::Huawei),
];

impl Vendor {
    pub fn from_manufacturer(manufacturer: &str) -> Self {
        let lower = manufacturer.to_lowercase();
        VENDOR_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, vendor)| *vendor)
            .unwrap_or_default()
    }
}

/// Firmware generation within a vendor. Zero is the current schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ProtocolVersion(pub u32);

impl ProtocolVersion {
    pub const CURRENT: Self = Self(0);
    pub const HPE_ILO4: Self = Self(4);
}

/// Absolute resource paths resolved by discovery. `system` is mandatory;
/// the rest are whatever the target advertised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndpointMap {
    pub system: String,
    pub thermal: Option<String>,
    pub power: Option<String>,
    pub storage: Option<String>,
    pub memory: Option<String>,
    pub network: Option<String>,
}

impl EndpointMap {
    fn validate(&self) -> Result<()> {
        ensure_redfish_path(&self.system)?;
        for path in [&self.thermal, &self.power, &self.storage, &self.memory, &self.network]
            .into_iter()
            .flatten()
        {
            ensure_redfish_path(path)?;
        }
        Ok(())
    }
}

/// Everything a collection cycle knows about its target. Immutable once built.
#[derive(Debug, Clone)]
pub struct Session {
    pub host: String,
    pub device_name: Option<String>,
    pub endpoints: EndpointMap,
    pub vendor: Vendor,
    pub version: ProtocolVersion,
}

impl Session {
    pub fn quirks(&self) -> VendorQuirks {
        quirks_for(self.vendor, self.version)
    }
}

fn link(link: Option<OdataLink>) -> Option<String> {
    link.map(|l| l.odata_id).filter(|id| !id.is_empty())
}

fn first_member(step: &'static str, collection: &Collection) -> Result<String> {
    collection.first_member().map(str::to_string).ok_or_else(|| {
        RedfishError::discovery(
            step,
            RedfishError::ProtocolViolation("collection has no members".to_string()),
        )
    })
}

fn required(step: &'static str, link_value: Option<OdataLink>, what: &'static str) -> Result<String> {
    link(link_value).ok_or_else(|| RedfishError::discovery(step, RedfishError::MissingEndpoint(what)))
}

async fn fetch<T: serde::de::DeserializeOwned>(
    transport: &dyn RedfishTransport,
    step: &'static str,
    path: &str,
) -> Result<T> {
    debug!(host = transport.host(), step, path, "Discovery step");
    get_as(transport, path)
        .await
        .map_err(|e| RedfishError::discovery(step, e))
}

/// Walk the resource tree once and freeze the result. Any failure aborts
/// the whole session; there is no partial map.
pub async fn discover(transport: &dyn RedfishTransport, device_name: Option<String>) -> Result<Session> {
    let root: ServiceRoot = fetch(transport, "root", REDFISH_ROOT).await?;
    let systems_path = required("root", root.systems, "Systems")?;
    let chassis_path = required("root", root.chassis, "Chassis")?;

    let systems: Collection = fetch(transport, "systems", &systems_path).await?;
    let system_path = first_member("systems", &systems)?;

    let chassis_list: Collection = fetch(transport, "chassis", &chassis_path).await?;
    let chassis_member = first_member("chassis", &chassis_list)?;
    let chassis: Chassis = fetch(transport, "chassis member", &chassis_member).await?;

    let system: ComputerSystem = fetch(transport, "system", &system_path).await?;

    let manufacturer = system.manufacturer.as_deref().unwrap_or_default();
    let vendor = Vendor::from_manufacturer(manufacturer);
    let mut version = ProtocolVersion::CURRENT;

    let mut endpoints = EndpointMap {
        system: system_path,
        thermal: link(chassis.thermal),
        power: link(chassis.power),
        storage: link(system.storage),
        memory: link(system.memory),
        network: link(system.network_interfaces),
    };

    if let Some((from, to)) = quirks_for(vendor, version).storage_path_rewrite {
        endpoints.storage = endpoints.storage.map(|p| p.replace(from, to));
    }

    let service_name = root.name.as_deref().unwrap_or_default();
    if let Some(legacy) = LEGACY_FIRMWARE
        .iter()
        .find(|l| l.vendor == vendor && service_name.contains(l.service_name_marker))
    {
        endpoints.memory = Some(legacy.memory_path.to_string());
        endpoints.storage = Some(legacy.storage_path.to_string());
        version = legacy.version;
    }

    endpoints
        .validate()
        .map_err(|e| RedfishError::discovery("endpoint map", e))?;

    info!(
        host = transport.host(),
        manufacturer,
        ?vendor,
        version = version.0,
        "Discovery complete"
    );

    Ok(Session {
        host: transport.host().to_string(),
        device_name,
        endpoints,
        vendor,
        version,
    })
}
