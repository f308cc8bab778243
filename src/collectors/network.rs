//! Network domain: interfaces (state-filtered) and their ports.

use crate::collectors::{member_paths, CollectorContext};
use crate::error::Result;
use crate::quirks::PortHealthPolicy;
use crate::records::{NetworkInterfaceFact, NetworkPortFact, ResourceState};
use crate::redfish::types::{Collection, NetworkInterface, NetworkPort};

pub(crate) async fn collect(ctx: &CollectorContext) -> Result<()> {
    let path = ctx.endpoint(&ctx.session.endpoints.network, "network interfaces")?;
    let interfaces: Collection = ctx.get(path).await?;

    ctx.fan_out(
        member_paths(&interfaces),
        ctx.settings.interface_concurrency,
        |ctx, path| async move {
            let interface: NetworkInterface = ctx.get(&path).await?;
            collect_interface(&ctx, interface).await
        },
    )
    .await?;
    Ok(())
}

async fn collect_interface(ctx: &CollectorContext, interface: NetworkInterface) -> Result<()> {
    if !ResourceState::parse(interface.status.state.as_deref()).is_present() {
        return Ok(());
    }
    let interface_id = interface.id.clone().unwrap_or_default();
    ctx.emit(NetworkInterfaceFact {
        id: interface_id.clone(),
        health: interface.status.health.clone().unwrap_or_default(),
    })
    .await?;

    let Some(ports_path) = interface.ports_path() else {
        return Ok(());
    };
    let ports: Collection = ctx.get(ports_path).await?;

    ctx.fan_out(
        member_paths(&ports),
        ctx.settings.port_concurrency,
        move |ctx, path| {
            let interface_id = interface_id.clone();
            async move {
                let port: NetworkPort = ctx.get(&path).await?;
                let fact = port_fact(ctx.quirks.port_health, interface_id, port);
                ctx.emit(fact).await
            }
        },
    )
    .await?;
    Ok(())
}

fn port_fact(policy: PortHealthPolicy, interface_id: String, port: NetworkPort) -> NetworkPortFact {
    let speed_mbps = port.speed_mbps();
    let enabled = port.status.state.as_deref() == Some("Enabled");
    let health = match policy {
        PortHealthPolicy::OkWhenEnabled if enabled => "OK".to_string(),
        _ => port.status.health.unwrap_or_default(),
    };
    let link_status = port.link_status.unwrap_or_default();

    NetworkPortFact {
        interface_id,
        id: port.id.unwrap_or_default(),
        health,
        speed_mbps,
        link_up: NetworkPortFact::link_up_from(&link_status),
        link_status,
    }
}
