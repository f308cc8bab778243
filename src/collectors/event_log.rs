//! Event-log domain. Three wire shapes, chosen by the vendor's quirk entry.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::json;
use tracing::debug;

use crate::collectors::CollectorContext;
use crate::error::Result;
use crate::quirks::EventLogSource;
use crate::records::EventLogEntry;
use crate::redfish::types::{HuaweiSelEntry, HuaweiSelResponse, InspurSelCollection, SelCollection};

const HUAWEI_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const INSPUR_TIME_FORMAT: &str = "%y-%m-%d %H:%M:%S";
const UNKNOWN_COMPONENT: &str = "Unknown";

pub(crate) async fn collect(ctx: &CollectorContext) -> Result<()> {
    match ctx.quirks.event_log {
        EventLogSource::HuaweiAction { path } => collect_huawei(ctx, path).await,
        EventLogSource::InspurEntries { path } => {
            let log: InspurSelCollection = ctx.get(path).await?;
            for entry in log.members {
                ctx.emit(EventLogEntry {
                    id: entry.id.unwrap_or_default(),
                    message: entry.message.unwrap_or_default(),
                    component: component(entry.sensor_type),
                    severity: entry.severity.unwrap_or_default(),
                    created: entry.created.as_deref().and_then(|t| parse_naive(t, INSPUR_TIME_FORMAT)),
                })
                .await?;
            }
            Ok(())
        }
        EventLogSource::IdracSel { path } => {
            let log: SelCollection = ctx.get(path).await?;
            for entry in log.members {
                ctx.emit(EventLogEntry {
                    id: entry.id.unwrap_or_default(),
                    message: entry.message.unwrap_or_default(),
                    component: component(entry.sensor_type),
                    severity: entry.severity.unwrap_or_default(),
                    created: entry.created.as_deref().and_then(parse_rfc3339),
                })
                .await?;
            }
            Ok(())
        }
    }
}

/// Query the OEM action page by page until a short page or the entry cap.
async fn collect_huawei(ctx: &CollectorContext, path: &str) -> Result<()> {
    let page_size = ctx.settings.event_log_page_size;
    let max_entries = ctx.settings.event_log_max_entries;
    let mut start: u32 = 1;
    let mut fetched: u32 = 0;

    while fetched < max_entries {
        let count = page_size.min(max_entries - fetched);
        let body = json!({"StartEntryId": start, "EntriesCount": count});
        let response: HuaweiSelResponse = ctx.post(path, &body).await?;
        let entries = response.entries();
        let returned = u32::try_from(entries.len()).unwrap_or(u32::MAX);
        debug!(host = ctx.host(), start, returned, "Huawei SEL page");

        // Some firmwares ignore EntriesCount; never emit past the requested page.
        for entry in entries.into_iter().take(count as usize) {
            if let Some(record) = huawei_entry(entry) {
                ctx.emit(record).await?;
            }
        }

        fetched = fetched.saturating_add(returned.min(count));
        start = start.saturating_add(returned.min(count));
        if returned < count {
            break;
        }
    }
    Ok(())
}

fn huawei_entry(entry: HuaweiSelEntry) -> Option<EventLogEntry> {
    let alert_time = entry.alerttime.filter(|t| !t.is_empty())?;
    Some(EventLogEntry {
        id: entry.eventid.unwrap_or_default(),
        message: entry.eventdesc.unwrap_or_default(),
        component: UNKNOWN_COMPONENT.to_string(),
        severity: huawei_severity(entry.level.as_deref().unwrap_or_default()).to_string(),
        created: parse_naive(&alert_time, HUAWEI_TIME_FORMAT),
    })
}

pub(crate) fn huawei_severity(level: &str) -> &'static str {
    match level {
        "0" => "normal",
        "1" => "warning",
        "2" => "error",
        "3" => "critical",
        _ => "unknown",
    }
}

fn component(sensor_type: Option<String>) -> String {
    sensor_type
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string())
}

/// Zone-less BMC timestamps are taken as UTC. Unparseable text yields no timestamp.
fn parse_naive(text: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), format)
        .ok()
        .map(|t| t.and_utc())
}

fn parse_rfc3339(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
