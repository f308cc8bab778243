//! Memory domain: one bounded fetch per module, filtered on that module's own state.

use crate::collectors::{member_paths, CollectorContext};
use crate::error::Result;
use crate::identifiers::normalize_memory_id;
use crate::records::{MemoryModuleRecord, ResourceState};
use crate::redfish::types::{Collection, MemoryModule};

const MIB: u64 = 1_048_576;

pub(crate) async fn collect(ctx: &CollectorContext) -> Result<()> {
    let path = ctx.endpoint(&ctx.session.endpoints.memory, "memory")?;
    let modules: Collection = ctx.get(path).await?;

    ctx.fan_out(
        member_paths(&modules),
        ctx.settings.memory_concurrency,
        |ctx, path| async move {
            let module: MemoryModule = ctx.get(&path).await?;
            match module_record(&ctx, module) {
                Some(record) => ctx.emit(record).await,
                None => Ok(()),
            }
        },
    )
    .await?;
    Ok(())
}

fn module_record(ctx: &CollectorContext, mut module: MemoryModule) -> Option<MemoryModuleRecord> {
    if let Some(fixup) = ctx.quirks.memory_fixup {
        fixup(&mut module);
    }
    if !ResourceState::parse(module.status.state.as_deref()).is_present() {
        return None;
    }

    Some(MemoryModuleRecord {
        id: normalize_memory_id(module.id.as_deref().unwrap_or_default(), &ctx.labels),
        name: module.name.unwrap_or_default(),
        manufacturer: module.manufacturer.unwrap_or_default(),
        memory_type: module.memory_device_type.unwrap_or_default(),
        serial: module.serial_number.unwrap_or_default(),
        ecc: module.error_correction.unwrap_or_default(),
        rank: module.rank_count,
        health: module.status.health.unwrap_or_default(),
        capacity_bytes: module.capacity_mib.map(|mib| mib.saturating_mul(MIB)),
        speed_mhz: module.operating_speed_mhz,
    })
}

#[cfg(test)]
mod tests {
    use crate::collectors::testing::*;
    use crate::collectors::{collect, Domain};
    use crate::discovery::{ProtocolVersion, Vendor};
    use crate::records::{DomainRecord, MemoryModuleRecord};
    use crate::redfish::mock::MockTransport;
    use serde_json::json;

    fn modules(records: Vec<DomainRecord>) -> Vec<MemoryModuleRecord> {
        let mut out: Vec<_> = records
            .into_iter()
            .filter_map(|r| match r {
                DomainRecord::MemoryModuleRecord(m) => Some(m),
                _ => None,
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    #[tokio::test]
    async fn test_each_module_filtered_on_its_own_state() {
        // An absent module ahead of a present one must not suppress it, and
        // vice versa.
        let transport = MockTransport::new()
            .with(
                "/redfish/v1/Systems/1/Memory",
                json!({"Members": [
                    {"@odata.id": "/redfish/v1/Systems/1/Memory/DIMM.Socket.A1"},
                    {"@odata.id": "/redfish/v1/Systems/1/Memory/DIMM.Socket.A2"},
                    {"@odata.id": "/redfish/v1/Systems/1/Memory/DIMM.Socket.A3"}
                ]}),
            )
            .with(
                "/redfish/v1/Systems/1/Memory/DIMM.Socket.A1",
                json!({"Id": "DIMM.Socket.A1", "Status": {"State": "Absent"}}),
            )
            .with(
                "/redfish/v1/Systems/1/Memory/DIMM.Socket.A2",
                json!({
                    "Id": "DIMM.Socket.A2",
                    "Manufacturer": "Samsung",
                    "MemoryDeviceType": "DDR4",
                    "CapacityMiB": 32768,
                    "RankCount": 2,
                    "OperatingSpeedMhz": 2666,
                    "Status": {"State": "Enabled", "Health": "OK"}
                }),
            )
            .with(
                "/redfish/v1/Systems/1/Memory/DIMM.Socket.A3",
                json!({"Id": "DIMM.Socket.A3", "Status": {"State": "Absent"}}),
            );

        let h = harness(Domain::Memory, session(Vendor::Dell, ProtocolVersion::CURRENT), transport);
        collect(h.ctx.clone()).await.unwrap();
        let modules = modules(h.drain());

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id, "内存槽.A2");
        assert_eq!(modules[0].capacity_bytes, Some(32768 * 1_048_576));
        assert_eq!(modules[0].rank, Some(2));
        assert_eq!(modules[0].speed_mhz, Some(2666));
    }

    #[tokio::test]
    async fn test_legacy_hpe_memory_uses_dimm_fields() {
        let transport = MockTransport::new()
            .with(
                "/redfish/v1/Systems/1/Memory/",
                json!({"Members": [
                    {"@odata.id": "/redfish/v1/Systems/1/Memory/proc1dimm1/"},
                    {"@odata.id": "/redfish/v1/Systems/1/Memory/proc1dimm2/"}
                ]}),
            )
            .with(
                "/redfish/v1/Systems/1/Memory/proc1dimm1/",
                json!({
                    "Id": "proc1dimm1",
                    "Manufacturer": "HP      ",
                    "DIMMType": "DDR4",
                    "DIMMStatus": "GoodInUse",
                    "Rank": 2,
                    "SizeMB": 16384
                }),
            )
            .with(
                "/redfish/v1/Systems/1/Memory/proc1dimm2/",
                json!({"Id": "proc1dimm2", "DIMMStatus": "NotPresent"}),
            );

        let mut s = session(Vendor::Hpe, ProtocolVersion::HPE_ILO4);
        s.endpoints.memory = Some("/redfish/v1/Systems/1/Memory/".to_string());
        let h = harness(Domain::Memory, s, transport);
        collect(h.ctx.clone()).await.unwrap();
        let modules = modules(h.drain());

        assert_eq!(modules.len(), 1);
        let m = &modules[0];
        assert_eq!(m.id, "proc1dimm1");
        assert_eq!(m.manufacturer, "HP");
        assert_eq!(m.memory_type, "DDR4");
        assert_eq!(m.health, "GoodInUse");
        assert_eq!(m.rank, Some(2));
        assert_eq!(m.capacity_bytes, Some(16384 * 1_048_576));
    }

    #[tokio::test]
    async fn test_memory_fan_out_bounded() {
        let mut members = Vec::new();
        let mut transport = MockTransport::new().with_delay(std::time::Duration::from_millis(10));
        for i in 0..24 {
            let path = format!("/redfish/v1/Systems/1/Memory/DIMM{i}");
            members.push(json!({"@odata.id": path}));
            transport = transport.with(&path, json!({"Id": format!("DIMM{i}"), "Status": {"State": "Enabled"}}));
        }
        transport = transport.with("/redfish/v1/Systems/1/Memory", json!({"Members": members}));

        let h = harness(Domain::Memory, session(Vendor::Unknown, ProtocolVersion::CURRENT), transport);
        collect(h.ctx.clone()).await.unwrap();
        let max = h.transport.max_in_flight();
        assert_eq!(modules(h.drain()).len(), 24);
        assert!(max <= 7, "in flight peaked at {max}");
    }
}
