//! Storage domain: controllers -> drives, with the vendor's layout and fixups.

use tracing::debug;

use crate::collectors::{member_paths, CollectorContext};
use crate::error::Result;
use crate::identifiers::normalize_drive_id;
use crate::quirks::StorageLayout;
use crate::records::{DriveRecord, ResourceState};
use crate::redfish::child_path;
use crate::redfish::types::{Collection, Drive, StorageController};

pub(crate) async fn collect(ctx: &CollectorContext) -> Result<()> {
    match ctx.quirks.storage_layout {
        StorageLayout::ChassisDrives { controllers, drives } => {
            // The controller root must answer even though drives come from the chassis.
            let _: Collection = ctx.get(controllers).await?;
            let listing: Collection = ctx.get(drives).await?;
            let paths = member_paths(&listing);
            debug!(host = ctx.host(), drives = paths.len(), "Chassis drive listing");
            collect_drives(ctx, paths, ctx.settings.inspur_drive_concurrency).await
        }
        StorageLayout::Generic { sibling_disk_drives } => {
            let root = ctx.endpoint(&ctx.session.endpoints.storage, "storage")?;
            let controllers: Collection = ctx.get(root).await?;

            ctx.fan_out(
                member_paths(&controllers),
                ctx.settings.controller_concurrency,
                move |ctx, controller_path| async move {
                    let drives = controller_drives(&ctx, &controller_path, sibling_disk_drives).await?;
                    collect_drives(&ctx, drives, ctx.settings.drive_concurrency).await
                },
            )
            .await?;
            Ok(())
        }
    }
}

async fn controller_drives(ctx: &CollectorContext, controller_path: &str, sibling: bool) -> Result<Vec<String>> {
    if sibling {
        // Legacy SmartStorage controllers do not embed drive links.
        let listing: Collection = ctx.get(&child_path(controller_path, "DiskDrives")).await?;
        return Ok(member_paths(&listing));
    }
    let controller: StorageController = ctx.get(controller_path).await?;
    Ok(controller
        .drives
        .into_iter()
        .map(|d| d.odata_id)
        .filter(|p| !p.is_empty())
        .collect())
}

async fn collect_drives(ctx: &CollectorContext, paths: Vec<String>, limit: usize) -> Result<()> {
    ctx.fan_out(paths, limit, |ctx, path| async move {
        let drive: Drive = ctx.get(&path).await?;
        match drive_record(&ctx, drive) {
            Some(record) => ctx.emit(record).await,
            None => Ok(()),
        }
    })
    .await?;
    Ok(())
}

fn drive_record(ctx: &CollectorContext, mut drive: Drive) -> Option<DriveRecord> {
    if let Some(fixup) = ctx.quirks.drive_fixup {
        fixup(&mut drive);
    }
    if !ResourceState::parse(drive.status.state.as_deref()).is_present() {
        return None;
    }

    let slot = drive.slot();
    Some(DriveRecord {
        id: normalize_drive_id(drive.id.as_deref().unwrap_or_default(), &ctx.labels),
        name: drive.name.unwrap_or_default(),
        manufacturer: drive.manufacturer.unwrap_or_default(),
        model: drive.model.unwrap_or_default().trim().to_string(),
        serial: drive.serial_number.unwrap_or_default().trim().to_string(),
        media_type: drive.media_type.unwrap_or_default(),
        protocol: drive.protocol.unwrap_or_default(),
        slot,
        health: drive.status.health.unwrap_or_default(),
        capacity_bytes: drive.capacity_bytes,
        predicted_life_left_percent: drive.predicted_media_life_left_percent,
    })
}
