//! Power domain: supplies (state-filtered) and power controls (always emitted).

use crate::collectors::CollectorContext;
use crate::error::Result;
use crate::records::{PowerControlMetrics, PowerControlReading, PowerSupplyReading, ResourceState};
use crate::redfish::types::Power;

pub(crate) async fn collect(ctx: &CollectorContext) -> Result<()> {
    let path = ctx.endpoint(&ctx.session.endpoints.power, "power")?;
    let power: Power = ctx.get(path).await?;

    for (index, psu) in power.power_supplies.iter().enumerate() {
        if !ResourceState::parse(psu.status.state.as_deref()).is_present() {
            continue;
        }
        ctx.emit(PowerSupplyReading {
            id: index.to_string(),
            health: psu.status.health.clone().unwrap_or_default(),
            input_watts: psu.power_input_watts,
            input_voltage: psu.line_input_voltage,
            output_watts: psu.output_watts(),
            capacity_watts: psu.power_capacity_watts,
            efficiency_percent: psu.efficiency_percent,
        })
        .await?;
    }

    for (index, control) in power.power_control.into_iter().enumerate() {
        ctx.emit(PowerControlReading {
            id: index.to_string(),
            name: control.name.unwrap_or_default(),
            consumed_watts: control.power_consumed_watts,
            capacity_watts: control.power_capacity_watts,
            metrics: control.power_metrics.map(|m| PowerControlMetrics {
                min_consumed_watts: m.min_consumed_watts,
                max_consumed_watts: m.max_consumed_watts,
                average_consumed_watts: m.average_consumed_watts,
                interval_minutes: m.interval_in_min,
            }),
        })
        .await?;
    }
    Ok(())
}
