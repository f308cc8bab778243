//! Sensors domain: temperatures and fans from the chassis Thermal resource.

use crate::collectors::CollectorContext;
use crate::error::Result;
use crate::records::{FanReading, ResourceState, TemperatureReading};
use crate::redfish::types::{Fan, Temperature, Thermal};

pub(crate) async fn collect(ctx: &CollectorContext) -> Result<()> {
    let path = ctx.endpoint(&ctx.session.endpoints.thermal, "thermal")?;
    let thermal: Thermal = ctx.get(path).await?;

    for (index, temperature) in thermal.temperatures.iter().enumerate() {
        if let Some(reading) = temperature_reading(index, temperature) {
            ctx.emit(reading).await?;
        }
    }
    for (index, fan) in thermal.fans.iter().enumerate() {
        if let Some(reading) = fan_reading(index, fan) {
            ctx.emit(reading).await?;
        }
    }
    Ok(())
}

/// Present sensors with a non-negative reading only.
fn temperature_reading(index: usize, t: &Temperature) -> Option<TemperatureReading> {
    if !ResourceState::parse(t.status.state.as_deref()).is_present() {
        return None;
    }
    let celsius = t.reading_celsius.filter(|c| *c >= 0.0)?;
    Some(TemperatureReading {
        id: t.id(index),
        name: t.name.clone().unwrap_or_default(),
        celsius,
        units: "celsius",
    })
}

/// Present fans that resolve both a name and a unit; incomplete ones are dropped.
fn fan_reading(index: usize, fan: &Fan) -> Option<FanReading> {
    if !ResourceState::parse(fan.status.state.as_deref()).is_present() {
        return None;
    }
    let name = fan.display_name()?;
    let units = fan.units()?;
    Some(FanReading {
        id: fan.id(index),
        name: name.to_string(),
        health: fan.status.health.clone().unwrap_or_default(),
        speed: fan.reading,
        units: units.to_lowercase(),
    })
}

#[cfg(test)]
mod tests {
    use crate::collectors::testing::*;
    use crate::collectors::{collect, Domain};
    use crate::discovery::{ProtocolVersion, Vendor};
    use crate::records::DomainRecord;
    use crate::redfish::mock::MockTransport;
    use serde_json::json;

    fn thermal() -> serde_json::Value {
        json!({
            "Temperatures": [
                {"MemberId": "0", "Name": "CPU1 Temp", "ReadingCelsius": 48, "Status": {"State": "Enabled"}},
                {"MemberId": "1", "Name": "CPU2 Temp", "ReadingCelsius": 51, "Status": {"State": "Absent"}},
                {"Name": "Inlet Temp", "ReadingCelsius": 22, "Status": {"State": "ENABLE"}},
                {"MemberId": "3", "Name": "Broken", "ReadingCelsius": -128, "Status": {"State": "Enabled"}},
                {"MemberId": "4", "Name": "No reading", "ReadingCelsius": null, "Status": {"State": "Enabled"}}
            ],
            "Fans": [
                {"MemberId": "0", "Name": "Fan1A", "Reading": 7800, "ReadingUnits": "RPM",
                 "Status": {"State": "Enabled", "Health": "OK"}},
                {"MemberId": "1", "Name": "Fan1B", "Reading": 0, "ReadingUnits": "RPM",
                 "Status": {"State": "Absent"}},
                {"MemberId": "2", "Name": "Fan2A", "Reading": 40,
                 "Status": {"State": "Enabled", "Health": "OK"}},
                {"MemberId": "3", "FanName": "Fan 3", "Reading": 35, "ReadingUnits": "Percent",
                 "Status": {"State": "Enabled", "Health": "Warning"}}
            ]
        })
    }

    #[tokio::test]
    async fn test_sensors_filter_absent_invalid_and_incomplete() {
        let transport = MockTransport::new().with("/redfish/v1/Chassis/1/Thermal", thermal());
        let h = harness(Domain::Sensors, session(Vendor::Dell, ProtocolVersion::CURRENT), transport);
        collect(h.ctx.clone()).await.unwrap();

        let records = h.drain();
        let temps: Vec<_> = records
            .iter()
            .filter_map(|r| match r {
                DomainRecord::TemperatureReading(t) => Some((t.id.as_str(), t.celsius)),
                _ => None,
            })
            .collect();
        assert_eq!(temps, vec![("0", 48.0), ("2", 22.0)]);

        let fans: Vec<_> = records
            .iter()
            .filter_map(|r| match r {
                DomainRecord::FanReading(f) => Some(f.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(fans.len(), 2);
        assert_eq!(fans[0].name, "Fan1A");
        assert_eq!(fans[0].units, "rpm");
        assert_eq!(fans[1].name, "Fan 3");
        assert_eq!(fans[1].units, "percent");
        assert_eq!(fans[1].health, "Warning");
    }

    #[tokio::test]
    async fn test_thermal_failure_fails_domain() {
        let transport = MockTransport::new().with_status("/redfish/v1/Chassis/1/Thermal", 503);
        let h = harness(Domain::Sensors, session(Vendor::Dell, ProtocolVersion::CURRENT), transport);
        assert!(collect(h.ctx.clone()).await.is_err());
        assert!(h.drain().is_empty());
    }
}
