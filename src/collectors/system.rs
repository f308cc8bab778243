//! System domain: one GET, one `SystemFact`.

use crate::collectors::CollectorContext;
use crate::error::Result;
use crate::records::SystemFact;
use crate::redfish::types::ComputerSystem;

const GIB: f64 = 1_073_741_824.0;

pub(crate) async fn collect(ctx: &CollectorContext) -> Result<()> {
    let system: ComputerSystem = ctx.get(&ctx.session.endpoints.system).await?;
    ctx.emit(system_fact(system, ctx.session.device_name.clone())).await
}

fn system_fact(system: ComputerSystem, device_name: Option<String>) -> SystemFact {
    let power_state = system.power_state.unwrap_or_default();
    let indicator_led = system.indicator_led.unwrap_or_default();
    let (cpu_count, cpu_model) = match system.processor_summary {
        Some(cpu) => (cpu.count, cpu.model.unwrap_or_default()),
        None => (None, String::new()),
    };

    SystemFact {
        device_name,
        power_on: power_state == "On",
        power_state,
        health: system.status.health.unwrap_or_default(),
        // Anything but "Off" ("Lit", "Blinking") counts as on; unreported counts as off.
        indicator_led_on: !indicator_led.is_empty() && indicator_led != "Off",
        indicator_led,
        memory_bytes: system
            .memory_summary
            .and_then(|m| m.total_system_memory_gib)
            .map(|gib| gib * GIB),
        cpu_count,
        cpu_model,
        bios_version: system.bios_version.unwrap_or_default(),
        manufacturer: system.manufacturer.unwrap_or_default(),
        model: system.model.unwrap_or_default(),
        serial: system.serial_number.unwrap_or_default(),
        sku: system.sku.unwrap_or_default(),
    }
}
