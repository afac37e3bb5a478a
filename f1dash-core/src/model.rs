//! Session data model
//!
//! A loaded [`Session`] is what a provider hands back: every lap with its
//! raw, columnar telemetry stream, plus the classification. The extracted
//! [`TelemetrySample`] and [`LapRecord`] are the narrow projections the
//! derived metrics work from.

use crate::error::{DashboardError, Result};
use crate::units::LapTime;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// First season the dashboard offers
pub const FIRST_SEASON: i32 = 2021;
/// Last season the dashboard offers
pub const LAST_SEASON: i32 = 2025;

/// Raw telemetry channel names, as published by the timing feed
pub mod channel {
    pub const DISTANCE: &str = "Distance";
    pub const SPEED: &str = "Speed";
    pub const THROTTLE: &str = "Throttle";
    pub const BRAKE: &str = "Brake";
    pub const X: &str = "X";
    pub const Y: &str = "Y";
    pub const TIME: &str = "Time";
    pub const RPM: &str = "RPM";
    pub const GEAR: &str = "nGear";
    pub const DRS: &str = "DRS";
}

// === Session identity ===

/// Session type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "Q")]
    Qualifying,
    #[serde(rename = "R")]
    Race,
}

impl SessionType {
    /// Short code used in URLs and cache keys
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Qualifying => "Q",
            SessionType::Race => "R",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Qualifying => "Qualifying",
            SessionType::Race => "Race",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Q" | "q" | "Qualifying" => Ok(SessionType::Qualifying),
            "R" | "r" | "Race" => Ok(SessionType::Race),
            other => Err(DashboardError::InvalidSelection(format!(
                "unknown session type '{}', expected Q or R",
                other
            ))),
        }
    }
}

/// Identifies one session of one event. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionKey {
    year: i32,
    event: String,
    session_type: SessionType,
}

impl SessionKey {
    pub fn new(year: i32, event: impl Into<String>, session_type: SessionType) -> Result<Self> {
        if !(FIRST_SEASON..=LAST_SEASON).contains(&year) {
            return Err(DashboardError::InvalidSelection(format!(
                "year {} outside {}..={}",
                year, FIRST_SEASON, LAST_SEASON
            )));
        }

        let event = event.into();
        if event.trim().is_empty() {
            return Err(DashboardError::InvalidSelection(
                "event name is empty".to_string(),
            ));
        }

        Ok(Self {
            year,
            event,
            session_type,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// String form used to key the session cache
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.year, self.event, self.session_type)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// What a provider should fetch when loading a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub laps: bool,
    pub telemetry: bool,
    pub weather: bool,
    pub messages: bool,
}

impl LoadOptions {
    /// Laps and car telemetry only; weather and race control messages are
    /// skipped to keep cached sessions small
    pub fn laps_and_telemetry() -> Self {
        Self {
            laps: true,
            telemetry: true,
            weather: false,
            messages: false,
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            laps: true,
            telemetry: true,
            weather: true,
            messages: true,
        }
    }
}

// === Event schedule ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFormat {
    Conventional,
    Sprint,
    Testing,
}

/// One entry of a season's event schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInfo {
    pub round: u32,
    pub name: String,
    pub country: String,
    pub date: NaiveDate,
    pub format: EventFormat,
}

// === Loaded session ===

/// Raw telemetry for one lap, stored per channel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetryChannels {
    channels: BTreeMap<String, Vec<f64>>,
}

impl TelemetryChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.channels.insert(name.into(), values);
    }

    pub fn with_channel(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.channels.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// A single timed (or untimed) lap by one driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lap {
    pub driver: String,
    pub lap_number: u32,
    pub lap_time: Option<LapTime>,
    /// Lap time deleted by the stewards (track limits)
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub telemetry: TelemetryChannels,
}

impl Lap {
    /// Whether the lap can be considered for fastest-lap selection
    pub fn is_valid(&self) -> bool {
        !self.deleted && self.lap_time.is_some()
    }

    /// A distance channel was recorded but holds no samples
    pub fn has_empty_trace(&self) -> bool {
        self.telemetry
            .get(channel::DISTANCE)
            .is_some_and(|distance| distance.is_empty())
    }
}

/// One entrant of the session classification, as the provider reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    pub position: Option<u32>,
    pub abbreviation: String,
    pub team_name: String,
    #[serde(default)]
    pub q1: Option<LapTime>,
    #[serde(default)]
    pub q2: Option<LapTime>,
    #[serde(default)]
    pub q3: Option<LapTime>,
    /// Race: full elapsed time for the winner, gap to the winner otherwise
    #[serde(default)]
    pub time: Option<LapTime>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub points: Option<f64>,
}

/// A fully loaded session
#[derive(Debug, Clone)]
pub struct Session {
    pub key: SessionKey,
    pub event_name: String,
    pub laps: Vec<Lap>,
    /// Classification, ordered by finishing position
    pub results: Vec<RawResult>,
}

impl Session {
    /// Sorted, de-duplicated codes of every driver with at least one lap
    pub fn drivers(&self) -> Vec<String> {
        self.laps
            .iter()
            .map(|lap| lap.driver.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn laps_for<'s, 'd>(&'s self, driver: &'d str) -> impl Iterator<Item = &'s Lap> + 'd
    where
        's: 'd,
    {
        self.laps.iter().filter(move |lap| lap.driver == driver)
    }
}

// === Extracted projections ===

/// One telemetry record of the fixed dashboard column set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPoint {
    /// Meters from the start of the lap
    pub distance: f64,
    /// km/h
    pub speed: f64,
    /// 0 to 100
    pub throttle: f64,
    /// 0.0 to 1.0 (on/off channels arrive as 0 or 1)
    pub brake: f64,
    pub x: f64,
    pub y: f64,
}

/// A driver's fastest-lap telemetry, ordered by distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetrySample {
    pub points: Vec<TelemetryPoint>,
}

impl TelemetrySample {
    pub fn new(points: Vec<TelemetryPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn column(&self, f: impl Fn(&TelemetryPoint) -> f64) -> Vec<f64> {
        self.points.iter().map(f).collect()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.column(|p| p.distance)
    }
}

/// Elapsed lap time at a given distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    pub distance: f64,
    /// Seconds since the start of the lap
    pub time: f64,
}

/// The lap a telemetry sample was taken from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub driver: String,
    pub lap_number: u32,
    pub lap_time: LapTime,
    pub timing: Vec<TimingPoint>,
}
