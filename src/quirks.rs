//! Per-vendor quirk table.
//! Every vendor- or firmware-specific deviation lives here as data; collectors
//! look up one `VendorQuirks` per session and never branch on the vendor themselves.

use crate::discovery::{ProtocolVersion, Vendor};
use crate::redfish::types::{Drive, MemoryModule};

/// iLO 4 and older answer with "HP RESTful Root Service" and keep memory and
/// storage at fixed pre-standard locations.
pub struct LegacyFirmware {
    pub vendor: Vendor,
    pub service_name_marker: &'static str,
    pub memory_path: &'static str,
    pub storage_path: &'static str,
    pub version: ProtocolVersion,
}

pub const LEGACY_FIRMWARE: &[LegacyFirmware] = &[LegacyFirmware {
    vendor: Vendor::Hpe,
    service_name_marker: "HP RESTful",
    memory_path: "/redfish/v1/Systems/1/Memory/",
    storage_path: "/redfish/v1/Systems/1/SmartStorage/ArrayControllers/",
    version: ProtocolVersion::HPE_ILO4,
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLayout {
    /// Controllers collection at the discovered storage path; each controller
    /// lists its own drives, or, on legacy firmware, a sibling `DiskDrives`
    /// collection does.
    Generic { sibling_disk_drives: bool },
    /// Fixed controller root plus one flat chassis-level drive collection.
    ChassisDrives {
        controllers: &'static str,
        drives: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortHealthPolicy {
    Reported,
    /// Firmware reports bogus health for enabled ports.
    OkWhenEnabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLogSource {
    /// Paged OEM POST action; entries ride inside an error envelope.
    HuaweiAction { path: &'static str },
    /// Plain GET; `Created` uses a two-digit-year text format.
    InspurEntries { path: &'static str },
    /// Plain GET; `Created` is RFC 3339.
    IdracSel { path: &'static str },
}

pub type DriveFixup = fn(&mut Drive);
pub type MemoryFixup = fn(&mut MemoryModule);

#[derive(Clone, Copy)]
pub struct VendorQuirks {
    /// Substring rewrite applied to the discovered storage path.
    pub storage_path_rewrite: Option<(&'static str, &'static str)>,
    pub storage_layout: StorageLayout,
    pub drive_fixup: Option<DriveFixup>,
    pub memory_fixup: Option<MemoryFixup>,
    pub port_health: PortHealthPolicy,
    pub event_log: EventLogSource,
}

impl std::fmt::Debug for VendorQuirks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorQuirks")
            .field("storage_path_rewrite", &self.storage_path_rewrite)
            .field("storage_layout", &self.storage_layout)
            .field("drive_fixup", &self.drive_fixup.is_some())
            .field("memory_fixup", &self.memory_fixup.is_some())
            .field("port_health", &self.port_health)
            .field("event_log", &self.event_log)
            .finish()
    }
}

pub const IDRAC_SEL_PATH: &str = "/redfish/v1/Managers/iDRAC.Embedded.1/Logs/Sel";
pub const INSPUR_SEL_PATH: &str = "/redfish/v1/Managers/1/LogServices/Log/Entries";
pub const HUAWEI_SEL_ACTION_PATH: &str =
    "/redfish/v1/Systems/1/LogServices/Log1/Actions/Oem/Huawei/LogService.QuerySelLogEntries";

/// What every vendor without a specific entry gets, including `Unknown`.
const NOMINAL: VendorQuirks = VendorQuirks {
    storage_path_rewrite: None,
    storage_layout: StorageLayout::Generic {
        sibling_disk_drives: false,
    },
    drive_fixup: None,
    memory_fixup: None,
    port_health: PortHealthPolicy::Reported,
    event_log: EventLogSource::IdracSel {
        path: IDRAC_SEL_PATH,
    },
};

const INSPUR: VendorQuirks = VendorQuirks {
    // Firmware advertises ".../Storages" for a collection served at ".../Storage".
    storage_path_rewrite: Some(("Storages", "Storage")),
    storage_layout: StorageLayout::ChassisDrives {
        controllers: "/redfish/v1/Systems/1/Storages",
        drives: "/redfish/v1/Chassis/1/Drives",
    },
    event_log: EventLogSource::InspurEntries {
        path: INSPUR_SEL_PATH,
    },
    ..NOMINAL
};

const HUAWEI: VendorQuirks = VendorQuirks {
    port_health: PortHealthPolicy::OkWhenEnabled,
    event_log: EventLogSource::HuaweiAction {
        path: HUAWEI_SEL_ACTION_PATH,
    },
    ..NOMINAL
};

const HPE_ILO4: VendorQuirks = VendorQuirks {
    storage_layout: StorageLayout::Generic {
        sibling_disk_drives: true,
    },
    drive_fixup: Some(legacy_hpe_drive),
    memory_fixup: Some(legacy_hpe_memory),
    ..NOMINAL
};

/// Single lookup point for vendor + firmware generation.
pub fn quirks_for(vendor: Vendor, version: ProtocolVersion) -> VendorQuirks {
    match (vendor, version) {
        (Vendor::Hpe, ProtocolVersion::HPE_ILO4) => HPE_ILO4,
        (Vendor::Inspur, _) => INSPUR,
        (Vendor::Huawei, _) => HUAWEI,
        _ => NOMINAL,
    }
}

const MIB: u64 = 1024 * 1024;

/// SmartStorage disk drives: MiB capacity, `InterfaceType` for protocol and
/// endurance used instead of life left.
fn legacy_hpe_drive(drive: &mut Drive) {
    drive.capacity_bytes = drive.capacity_mib.map(|mib| mib.saturating_mul(MIB));
    drive.protocol = drive.interface_type.clone();
    drive.predicted_media_life_left_percent = drive
        .ssd_endurance_utilization_percentage
        .map(|used| 100.0 - used);
}

fn legacy_hpe_memory(module: &mut MemoryModule) {
    module.manufacturer = module.manufacturer.as_deref().map(|m| m.trim().to_string());
    module.rank_count = module.rank;
    module.memory_device_type = module.dimm_type.clone();
    module.capacity_mib = module.size_mb;
    module.status.health = module.dimm_status.clone();
    // No Status.State on these modules; presence comes from DIMMStatus.
    module.status.state = module.dimm_status.as_deref().map(|s| match s {
        "NotPresent" => "Absent".to_string(),
        _ => "Enabled".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_vendor_gets_nominal_quirks() {
        let q = quirks_for(Vendor::Unknown, ProtocolVersion::CURRENT);
        assert_eq!(q.storage_path_rewrite, None);
        assert!(q.drive_fixup.is_none());
        assert!(q.memory_fixup.is_none());
        assert_eq!(q.port_health, PortHealthPolicy::Reported);
        assert_eq!(q.storage_layout, StorageLayout::Generic { sibling_disk_drives: false });
        assert_eq!(q.event_log, EventLogSource::IdracSel { path: IDRAC_SEL_PATH });
    }

    #[test]
    fn test_modern_hpe_is_nominal() {
        let q = quirks_for(Vendor::Hpe, ProtocolVersion::CURRENT);
        assert!(q.drive_fixup.is_none());
        let q = quirks_for(Vendor::Hpe, ProtocolVersion::HPE_ILO4);
        assert!(q.drive_fixup.is_some());
        assert_eq!(q.storage_layout, StorageLayout::Generic { sibling_disk_drives: true });
    }

    #[test]
    fn test_legacy_drive_derived_fields() {
        let mut drive = Drive {
            capacity_mib: Some(1024),
            interface_type: Some("SATA".to_string()),
            ssd_endurance_utilization_percentage: Some(30.0),
            ..Default::default()
        };
        legacy_hpe_drive(&mut drive);
        assert_eq!(drive.capacity_bytes, Some(1024 * 1024 * 1024));
        assert_eq!(drive.protocol.as_deref(), Some("SATA"));
        assert_eq!(drive.predicted_media_life_left_percent, Some(70.0));
    }

    #[test]
    fn test_legacy_memory_remap() {
        let mut module = MemoryModule {
            manufacturer: Some("  HP     ".to_string()),
            rank: Some(2),
            dimm_type: Some("DDR4".to_string()),
            dimm_status: Some("GoodInUse".to_string()),
            size_mb: Some(16384),
            ..Default::default()
        };
        legacy_hpe_memory(&mut module);
        assert_eq!(module.manufacturer.as_deref(), Some("HP"));
        assert_eq!(module.rank_count, Some(2));
        assert_eq!(module.memory_device_type.as_deref(), Some("DDR4"));
        assert_eq!(module.capacity_mib, Some(16384));
        assert_eq!(module.status.health.as_deref(), Some("GoodInUse"));
        assert_eq!(module.status.state.as_deref(), Some("Enabled"));

        let mut empty = MemoryModule {
            dimm_status: Some("NotPresent".to_string()),
            ..Default::default()
        };
        legacy_hpe_memory(&mut empty);
        assert_eq!(empty.status.state.as_deref(), Some("Absent"));
    }
}
