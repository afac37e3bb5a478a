//! Dashboard view-model
//!
//! A pure function from a loaded session and a driver pair to every
//! figure and table the page shows. The browser only draws what it is
//! given; nothing here knows about the plotting library.

use crate::error::Result;
use crate::metrics::{
    animation_frames, delta_time, metric_series, speed_overlay, track_centre, AnimationFrame,
    AnimationOptions, Metric, Series,
};
use crate::model::{Session, SessionType, TelemetrySample};
use crate::results::{results_table, ResultsTable};
use crate::telemetry::get_fastest_lap_telemetry;
use serde::{Deserialize, Serialize};

const REPLAY_HEIGHT: u32 = 500;
const COMPARISON_HEIGHT: u32 = 350;
const SINGLE_METRIC_HEIGHT: u32 = 300;

/// A line chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub height: u32,
    pub series: Vec<Series>,
}

/// Animated racing line for one driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReplay {
    pub title: String,
    pub driver: String,
    /// Fastest lap time, shown in the replay HUD
    pub lap_time: String,
    pub height: u32,
    pub frame_duration_ms: u64,
    /// Centred track outline
    pub outline: Series,
    pub frames: Vec<AnimationFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub event: String,
    pub session_type: SessionType,
    pub drivers: [String; 2],
    pub replays: Vec<TrackReplay>,
    pub delta: Figure,
    pub speed: Figure,
    pub throttle: Vec<Figure>,
    pub brake: Vec<Figure>,
    pub results: ResultsTable,
}

/// Build the whole dashboard for `driver1` against `driver2`.
/// `driver1`'s lap is the delta reference.
pub fn build_dashboard(
    session: &Session,
    driver1: &str,
    driver2: &str,
    options: &AnimationOptions,
) -> Result<Dashboard> {
    let (lap1, tel1) = get_fastest_lap_telemetry(session, driver1)?;
    let (lap2, tel2) = get_fastest_lap_telemetry(session, driver2)?;

    let curve = delta_time(&lap1, &lap2)?;
    let delta = Figure {
        title: "Delta Time".to_string(),
        height: COMPARISON_HEIGHT,
        series: vec![Series {
            name: format!("{} vs {}", driver1, driver2),
            x: curve.distance,
            y: curve.delta,
        }],
    };

    let speed = Figure {
        title: "Speed Comparison".to_string(),
        height: COMPARISON_HEIGHT,
        series: speed_overlay((driver1, &tel1), (driver2, &tel2)),
    };

    let single = |driver: &str, tel: &TelemetrySample, metric: Metric| Figure {
        title: format!("{} {}", driver, metric.label()),
        height: SINGLE_METRIC_HEIGHT,
        series: vec![metric_series(driver, tel, metric)],
    };

    Ok(Dashboard {
        event: session.event_name.clone(),
        session_type: session.key.session_type(),
        drivers: [driver1.to_string(), driver2.to_string()],
        replays: vec![
            track_replay(driver1, &lap1.lap_time.format_timing(), &tel1, options),
            track_replay(driver2, &lap2.lap_time.format_timing(), &tel2, options),
        ],
        delta,
        speed,
        throttle: vec![
            single(driver1, &tel1, Metric::Throttle),
            single(driver2, &tel2, Metric::Throttle),
        ],
        brake: vec![
            single(driver1, &tel1, Metric::Brake),
            single(driver2, &tel2, Metric::Brake),
        ],
        results: results_table(&session.results, session.key.session_type()),
    })
}

fn track_replay(
    driver: &str,
    lap_time: &str,
    tel: &TelemetrySample,
    options: &AnimationOptions,
) -> TrackReplay {
    let (cx, cy) = track_centre(tel);

    TrackReplay {
        title: format!("{} Racing Line Replay", driver),
        driver: driver.to_string(),
        lap_time: lap_time.to_string(),
        height: REPLAY_HEIGHT,
        frame_duration_ms: options.frame_duration_ms,
        outline: Series {
            name: "Track".to_string(),
            x: tel.column(|p| p.x - cx),
            y: tel.column(|p| p.y - cy),
        },
        frames: animation_frames(tel, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::model::{channel, Lap, RawResult, SessionKey, TelemetryChannels};
    use crate::results::ResultDetail;
    use crate::units::LapTime;

    fn lap(driver: &str, pace: f64, n: usize) -> Lap {
        let distance: Vec<f64> = (0..n).map(|i| i as f64 * 12.0).collect();
        let time: Vec<f64> = (0..n).map(|i| i as f64 * 0.2 * pace).collect();
        let angle = |i: usize| i as f64 / n as f64 * std::f64::consts::TAU;

        Lap {
            driver: driver.to_string(),
            lap_number: 3,
            lap_time: Some(LapTime(n as f64 * 0.2 * pace)),
            deleted: false,
            telemetry: TelemetryChannels::new()
                .with_channel(channel::DISTANCE, distance)
                .with_channel(channel::TIME, time)
                .with_channel(channel::SPEED, vec![216.0 / pace; n])
                .with_channel(channel::THROTTLE, vec![80.0; n])
                .with_channel(channel::BRAKE, (0..n).map(|i| (i % 4 == 0) as u8 as f64).collect())
                .with_channel(channel::X, (0..n).map(|i| 1000.0 + angle(i).cos() * 500.0).collect())
                .with_channel(channel::Y, (0..n).map(|i| -300.0 + angle(i).sin() * 500.0).collect()),
        }
    }

    fn session(session_type: SessionType) -> Session {
        Session {
            key: SessionKey::new(2024, "British Grand Prix", session_type).unwrap(),
            event_name: "British Grand Prix".to_string(),
            laps: vec![lap("HAM", 1.0, 400), lap("VER", 1.01, 380), lap("NOR", 1.02, 390)],
            results: vec![
                RawResult {
                    position: Some(1),
                    abbreviation: "HAM".to_string(),
                    team_name: "Mercedes".to_string(),
                    q1: None,
                    q2: None,
                    q3: None,
                    time: Some(LapTime(4995.0)),
                    status: "Finished".to_string(),
                    points: Some(25.0),
                },
                RawResult {
                    position: Some(2),
                    abbreviation: "VER".to_string(),
                    team_name: "Red Bull Racing".to_string(),
                    q1: None,
                    q2: None,
                    q3: None,
                    time: Some(LapTime(1.465)),
                    status: "Finished".to_string(),
                    points: Some(18.0),
                },
            ],
        }
    }

    #[test]
    fn test_dashboard_has_every_figure() {
        let s = session(SessionType::Race);
        let dash = build_dashboard(&s, "HAM", "VER", &AnimationOptions::default()).unwrap();

        assert_eq!(dash.replays.len(), 2);
        assert_eq!(dash.throttle.len(), 2);
        assert_eq!(dash.brake.len(), 2);
        assert_eq!(dash.speed.series.len(), 2);
        assert_eq!(dash.speed.series[0].len(), 400);
        assert_eq!(dash.speed.series[1].len(), 380);
        assert_eq!(dash.delta.series[0].name, "HAM vs VER");
        assert_eq!(dash.delta.series[0].len(), 400);
        assert_eq!(dash.throttle[1].title, "VER Throttle");
        assert_eq!(dash.results.rows.len(), 2);
    }

    #[test]
    fn test_replay_frames_and_hud() {
        let s = session(SessionType::Race);
        let dash = build_dashboard(&s, "HAM", "NOR", &AnimationOptions::default()).unwrap();

        let replay = &dash.replays[0];
        assert_eq!(replay.title, "HAM Racing Line Replay");
        assert_eq!(replay.lap_time, "01:20.000000");
        assert_eq!(replay.frame_duration_ms, 240);
        assert_eq!(replay.frames.len(), (400 - 10) / 8);
        assert_eq!(replay.outline.len(), 400);

        let mean_x = replay.outline.x.iter().sum::<f64>() / 400.0;
        assert!(mean_x.abs() < 1e-6);
    }

    #[test]
    fn test_delta_grows_for_slower_comparison() {
        let s = session(SessionType::Qualifying);
        let dash = build_dashboard(&s, "HAM", "VER", &AnimationOptions::default()).unwrap();
        let delta = &dash.delta.series[0].y;
        assert!(delta[0].abs() < 1e-9);
        assert!(delta[200] > 0.0);
        assert!(matches!(
            dash.results.rows[0].detail,
            ResultDetail::Qualifying { .. }
        ));
    }

    #[test]
    fn test_driver_with_empty_trace_fails_in_either_slot() {
        let mut s = session(SessionType::Race);
        let mut empty = lap("ZHO", 1.0, 0);
        empty.lap_time = Some(LapTime(90.0));
        s.laps.push(empty);

        let options = AnimationOptions::default();
        for (d1, d2) in [("ZHO", "HAM"), ("HAM", "ZHO")] {
            let result = build_dashboard(&s, d1, d2, &options);
            assert!(
                matches!(&result, Err(DashboardError::NoLapData { driver }) if driver == "ZHO"),
                "{} vs {} should fail, got {:?}",
                d1,
                d2,
                result.map(|d| d.drivers)
            );
        }
    }

    #[test]
    fn test_unknown_driver_fails_whole_build() {
        let s = session(SessionType::Race);
        let result = build_dashboard(&s, "HAM", "MSC", &AnimationOptions::default());
        assert!(matches!(result, Err(DashboardError::NoLapData { driver }) if driver == "MSC"));
    }
}
