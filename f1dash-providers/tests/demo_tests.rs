//! Integration tests for the DemoProvider

use chrono::NaiveDate;
use f1dash_core::model::{channel, EventFormat, LoadOptions, SessionKey, SessionType};
use f1dash_core::telemetry::get_fastest_lap_telemetry;
use f1dash_core::{DashboardError, SessionProvider};
use f1dash_providers::DemoProvider;

fn provider() -> DemoProvider {
    DemoProvider::with_today(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
}

fn key(year: i32, event: &str, session_type: SessionType) -> SessionKey {
    SessionKey::new(year, event, session_type).unwrap()
}

#[test]
fn test_demo_provider_name() {
    assert_eq!(provider().name(), "Demo");
}

#[test]
fn test_schedule_includes_testing_round() {
    let schedule = provider().event_schedule(2024).unwrap();
    assert_eq!(schedule[0].format, EventFormat::Testing);
    assert!(schedule.len() > 10);
    assert!(schedule.iter().all(|e| e.date.format("%Y").to_string() == "2024"));
    assert!(schedule.windows(2).all(|w| w[0].round < w[1].round));
}

#[test]
fn test_schedule_outside_seasons_is_unavailable() {
    assert!(matches!(
        provider().event_schedule(2019),
        Err(DashboardError::DataUnavailable(_))
    ));
}

#[test]
fn test_qualifying_session_has_laps_and_knockout_times() {
    let session = provider()
        .load_session(
            &key(2024, "Monaco Grand Prix", SessionType::Qualifying),
            LoadOptions::laps_and_telemetry(),
        )
        .expect("load should succeed");

    assert_eq!(session.event_name, "Monaco Grand Prix");
    assert_eq!(session.drivers().len(), 20);
    assert_eq!(session.results.len(), 20);

    let q3_count = session.results.iter().filter(|r| r.q3.is_some()).count();
    let q2_count = session.results.iter().filter(|r| r.q2.is_some()).count();
    assert_eq!(q3_count, 10);
    assert_eq!(q2_count, 15);
    assert!(session.results.iter().all(|r| r.q1.is_some()));
}

#[test]
fn test_every_qualifier_has_a_fastest_lap() {
    let session = provider()
        .load_session(
            &key(2023, "Japanese Grand Prix", SessionType::Qualifying),
            LoadOptions::laps_and_telemetry(),
        )
        .unwrap();

    for driver in session.drivers() {
        let (lap, sample) = get_fastest_lap_telemetry(&session, &driver)
            .unwrap_or_else(|e| panic!("{} has no fastest lap: {}", driver, e));
        assert!(lap.lap_number > 1, "the out-lap is never timed");
        assert!(sample.len() > 100);
        assert!(sample.points.windows(2).all(|w| w[1].distance > w[0].distance));
        assert!(sample.points.iter().all(|p| (0.0..=100.0).contains(&p.throttle)));
        assert!(sample.points.iter().all(|p| p.brake == 0.0 || p.brake == 1.0));
    }
}

#[test]
fn test_race_statuses_and_non_starter() {
    // Round 4 of the demo calendar always has a non-starter
    let session = provider()
        .load_session(
            &key(2024, "Japanese Grand Prix", SessionType::Race),
            LoadOptions::laps_and_telemetry(),
        )
        .unwrap();

    let statuses: Vec<&str> = session.results.iter().map(|r| r.status.as_str()).collect();
    assert_eq!(statuses[0], "Finished");
    assert!(statuses.contains(&"+1 Lap"));
    assert!(statuses.contains(&"Retired"));
    assert_eq!(*statuses.last().unwrap(), "Did not start");

    let dns = &session.results[session.results.len() - 1].abbreviation;
    assert!(!session.drivers().contains(dns));
    assert!(matches!(
        get_fastest_lap_telemetry(&session, dns),
        Err(DashboardError::NoLapData { .. })
    ));

    let positions: Vec<u32> = session.results.iter().filter_map(|r| r.position).collect();
    assert_eq!(positions, (1..=20).collect::<Vec<_>>());
    assert!(session.results[0].time.unwrap().as_secs() > 1800.0);
}

#[test]
fn test_event_lookup_by_country_and_case() {
    let p = provider();
    let by_country = p
        .load_session(&key(2022, "monaco", SessionType::Race), LoadOptions::laps_and_telemetry())
        .unwrap();
    assert_eq!(by_country.event_name, "Monaco Grand Prix");

    let by_name = p
        .load_session(
            &key(2022, "BRITISH GRAND PRIX", SessionType::Race),
            LoadOptions::laps_and_telemetry(),
        )
        .unwrap();
    assert_eq!(by_name.event_name, "British Grand Prix");
}

#[test]
fn test_unknown_testing_and_future_events_are_unavailable() {
    let p = DemoProvider::with_today(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    let options = LoadOptions::laps_and_telemetry();

    for (event, year) in [
        ("Atlantis Grand Prix", 2024),
        ("Pre-Season Testing", 2024),
        ("Abu Dhabi Grand Prix", 2025),
    ] {
        let result = p.load_session(&key(year, event, SessionType::Race), options);
        assert!(
            matches!(result, Err(DashboardError::DataUnavailable(_))),
            "{} {} should be unavailable",
            year,
            event
        );
    }
}

#[test]
fn test_load_without_telemetry_keeps_lap_times() {
    let options = LoadOptions {
        telemetry: false,
        ..LoadOptions::laps_and_telemetry()
    };
    let session = provider()
        .load_session(&key(2021, "Bahrain Grand Prix", SessionType::Qualifying), options)
        .unwrap();

    assert!(!session.laps.is_empty());
    assert!(session.laps.iter().all(|lap| lap.telemetry.is_empty()));
    assert!(matches!(
        get_fastest_lap_telemetry(&session, "VER"),
        Err(DashboardError::MissingTelemetryField(channel::DISTANCE))
    ));
}

#[test]
fn test_sessions_are_deterministic() {
    let p = provider();
    let k = key(2025, "Italian Grand Prix", SessionType::Race);
    let a = p.load_session(&k, LoadOptions::laps_and_telemetry()).unwrap();
    let b = p.load_session(&k, LoadOptions::laps_and_telemetry()).unwrap();

    assert_eq!(a.results[0].abbreviation, b.results[0].abbreviation);
    let (_, ta) = get_fastest_lap_telemetry(&a, "LEC").unwrap();
    let (_, tb) = get_fastest_lap_telemetry(&b, "LEC").unwrap();
    assert_eq!(ta, tb);
}
