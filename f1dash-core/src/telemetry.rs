//! Fastest-lap telemetry extraction
//!
//! Picks a driver's fastest valid lap and projects its raw channel stream
//! onto the fixed dashboard column set. Samples are kept at whatever rate
//! the provider recorded them; nothing is resampled.

use crate::error::{DashboardError, Result};
use crate::model::{
    channel, Lap, LapRecord, Session, TelemetryChannels, TelemetryPoint, TelemetrySample,
    TimingPoint,
};
use crate::units::LapTime;

/// Select the driver's fastest lap and return it with its telemetry
pub fn get_fastest_lap_telemetry(
    session: &Session,
    driver: &str,
) -> Result<(LapRecord, TelemetrySample)> {
    let lap = pick_fastest(session, driver)?;
    let lap_time = lap.lap_time.ok_or_else(|| DashboardError::NoLapData {
        driver: driver.to_string(),
    })?;

    project(lap, lap_time)
}

/// Fastest timed, non-deleted lap with recorded samples. The first lap
/// wins a tie.
pub fn pick_fastest<'a>(session: &'a Session, driver: &str) -> Result<&'a Lap> {
    let mut fastest: Option<&'a Lap> = None;

    let candidates = session
        .laps_for(driver)
        .filter(|lap| lap.is_valid() && !lap.has_empty_trace());
    for lap in candidates {
        fastest = match fastest {
            Some(best) if best.lap_time <= lap.lap_time => Some(best),
            _ => Some(lap),
        };
    }

    fastest.ok_or_else(|| DashboardError::NoLapData {
        driver: driver.to_string(),
    })
}

fn project(lap: &Lap, lap_time: LapTime) -> Result<(LapRecord, TelemetrySample)> {
    let telemetry = &lap.telemetry;

    let distance = required(telemetry, channel::DISTANCE, None)?;
    if distance.is_empty() {
        return Err(DashboardError::NoLapData {
            driver: lap.driver.clone(),
        });
    }
    let expected = Some(distance.len());

    let speed = required(telemetry, channel::SPEED, expected)?;
    let throttle = required(telemetry, channel::THROTTLE, expected)?;
    let brake = required(telemetry, channel::BRAKE, expected)?;
    let x = required(telemetry, channel::X, expected)?;
    let y = required(telemetry, channel::Y, expected)?;
    let time = required(telemetry, channel::TIME, expected)?;

    let points = (0..distance.len())
        .map(|i| TelemetryPoint {
            distance: distance[i],
            speed: speed[i],
            throttle: throttle[i],
            brake: brake[i],
            x: x[i],
            y: y[i],
        })
        .collect();

    let timing = distance
        .iter()
        .zip(time)
        .map(|(&distance, &time)| TimingPoint { distance, time })
        .collect();

    let record = LapRecord {
        driver: lap.driver.clone(),
        lap_number: lap.lap_number,
        lap_time,
        timing,
    };

    Ok((record, TelemetrySample::new(points)))
}

fn required<'a>(
    telemetry: &'a TelemetryChannels,
    name: &'static str,
    expected: Option<usize>,
) -> Result<&'a [f64]> {
    let values = telemetry
        .get(name)
        .ok_or(DashboardError::MissingTelemetryField(name))?;

    match expected {
        Some(expected) if values.len() != expected => Err(DashboardError::MalformedTelemetry {
            channel: name,
            expected,
            found: values.len(),
        }),
        _ => Ok(values),
    }
}
