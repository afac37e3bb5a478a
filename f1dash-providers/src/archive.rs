//! Archive provider backed by a session cache directory
//!
//! Layout, one directory per season:
//!
//! ```text
//! <root>/<year>/schedule.json
//! <root>/<year>/<event_slug>/Q.json        (or Q.json.zst)
//! <root>/<year>/<event_slug>/R.json.zst    (or R.json)
//! ```
//!
//! Session payloads may be stored plain or zstd-compressed; a compressed
//! file wins when both exist.

use f1dash_core::model::{
    EventInfo, Lap, LoadOptions, RawResult, Session, SessionKey, TelemetryChannels,
};
use f1dash_core::{DashboardError, Result, SessionProvider};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEDULE_FILE: &str = "schedule.json";
const ZSTD_LEVEL: i32 = 3;

/// On-disk form of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    pub event_name: String,
    pub laps: Vec<Lap>,
    pub results: Vec<RawResult>,
}

impl From<&Session> for SessionPayload {
    fn from(session: &Session) -> Self {
        Self {
            event_name: session.event_name.clone(),
            laps: session.laps.clone(),
            results: session.results.clone(),
        }
    }
}

/// Directory name for an event: lowercase ASCII alphanumerics joined by `_`
pub fn event_slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

pub struct ArchiveProvider {
    root: PathBuf,
}

impl ArchiveProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn season_dir(&self, year: i32) -> PathBuf {
        self.root.join(year.to_string())
    }

    fn session_path(&self, key: &SessionKey, event_name: &str, compressed: bool) -> PathBuf {
        let file = if compressed {
            format!("{}.json.zst", key.session_type().code())
        } else {
            format!("{}.json", key.session_type().code())
        };
        self.season_dir(key.year()).join(event_slug(event_name)).join(file)
    }

    /// Store a season schedule, creating the season directory
    pub fn write_schedule(&self, year: i32, events: &[EventInfo]) -> Result<PathBuf> {
        let dir = self.season_dir(year);
        fs::create_dir_all(&dir)?;
        let path = dir.join(SCHEDULE_FILE);
        fs::write(&path, serde_json::to_vec_pretty(events)?)?;
        Ok(path)
    }

    /// Store a session payload under `key`, optionally zstd-compressed
    pub fn write_session(
        &self,
        key: &SessionKey,
        payload: &SessionPayload,
        compress: bool,
    ) -> Result<PathBuf> {
        let path = self.session_path(key, &payload.event_name, compress);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(payload)?;
        let bytes = if compress {
            zstd::stream::encode_all(json.as_slice(), ZSTD_LEVEL)?
        } else {
            json
        };
        fs::write(&path, &bytes)?;

        info!("Archived {} ({} bytes) to {}", key, bytes.len(), path.display());
        Ok(path)
    }

    /// Canonical event name from the schedule; the requested name as-is when
    /// the season has no schedule file
    fn resolve_event(&self, key: &SessionKey) -> Result<String> {
        let schedule = match self.event_schedule(key.year()) {
            Ok(schedule) => schedule,
            Err(DashboardError::DataUnavailable(_)) => return Ok(key.event().to_string()),
            Err(e) => return Err(e),
        };

        schedule
            .into_iter()
            .find(|e| e.name.eq_ignore_ascii_case(key.event().trim()))
            .map(|e| e.name)
            .ok_or_else(|| {
                DashboardError::DataUnavailable(format!(
                    "no event named '{}' in the {} archive",
                    key.event(),
                    key.year()
                ))
            })
    }

    fn read_payload(&self, key: &SessionKey, event_name: &str) -> Result<SessionPayload> {
        let compressed = self.session_path(key, event_name, true);
        let plain = self.session_path(key, event_name, false);

        let bytes = if compressed.exists() {
            debug!("Reading {}", compressed.display());
            zstd::stream::decode_all(fs::File::open(&compressed)?)?
        } else {
            debug!("Reading {}", plain.display());
            read_or_unavailable(&plain, || {
                format!("{} is not in the archive at {}", key, self.root.display())
            })?
        };

        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn read_or_unavailable(path: &Path, describe: impl FnOnce() -> String) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DashboardError::DataUnavailable(describe()),
        _ => DashboardError::Io(e),
    })
}

impl SessionProvider for ArchiveProvider {
    fn name(&self) -> &str {
        "Archive"
    }

    fn event_schedule(&self, year: i32) -> Result<Vec<EventInfo>> {
        let path = self.season_dir(year).join(SCHEDULE_FILE);
        let bytes = read_or_unavailable(&path, || {
            format!("no {} schedule in {}", year, self.root.display())
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn load_session(&self, key: &SessionKey, options: LoadOptions) -> Result<Session> {
        let event_name = self.resolve_event(key)?;
        let payload = self.read_payload(key, &event_name)?;

        let laps = if !options.laps {
            Vec::new()
        } else if !options.telemetry {
            payload
                .laps
                .into_iter()
                .map(|lap| Lap {
                    telemetry: TelemetryChannels::new(),
                    ..lap
                })
                .collect()
        } else {
            payload.laps
        };

        Ok(Session {
            key: key.clone(),
            event_name: payload.event_name,
            laps,
            results: payload.results,
        })
    }
}
