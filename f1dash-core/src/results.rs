//! Results table normalization
//!
//! Turns the provider's classification into display rows. Qualifying rows
//! carry the three knockout times; race rows carry points and a
//! status-dependent "gap to leader" cell.

use crate::model::{RawResult, SessionType};
use crate::units::format_optional;
use serde::{Deserialize, Serialize};

/// Column descriptor for the results table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub id: String,
}

impl Column {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: name.to_string(),
        }
    }
}

/// One display row, serialized keyed by column id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Pos")]
    pub position: Option<u32>,
    #[serde(rename = "Driver")]
    pub driver: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(flatten)]
    pub detail: ResultDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultDetail {
    Qualifying {
        #[serde(rename = "Q1")]
        q1: String,
        #[serde(rename = "Q2")]
        q2: String,
        #[serde(rename = "Q3")]
        q3: String,
    },
    Race {
        #[serde(rename = "Points")]
        points: f64,
        #[serde(rename = "Gap to Leader")]
        gap_to_leader: String,
    },
}

/// Rows plus the columns they fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    pub columns: Vec<Column>,
    pub rows: Vec<ResultRow>,
}

pub fn columns(session_type: SessionType) -> Vec<Column> {
    let names: &[&str] = match session_type {
        SessionType::Qualifying => &["Pos", "Driver", "Team", "Q1", "Q2", "Q3"],
        SessionType::Race => &["Pos", "Driver", "Team", "Points", "Gap to Leader"],
    };
    names.iter().map(|name| Column::new(name)).collect()
}

/// One row per entrant, in the order the provider classified them
pub fn normalize_results(raw_results: &[RawResult], session_type: SessionType) -> Vec<ResultRow> {
    raw_results
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let detail = match session_type {
                SessionType::Qualifying => ResultDetail::Qualifying {
                    q1: format_optional(raw.q1),
                    q2: format_optional(raw.q2),
                    q3: format_optional(raw.q3),
                },
                SessionType::Race => ResultDetail::Race {
                    points: raw.points.unwrap_or(0.0),
                    gap_to_leader: race_gap(idx, raw),
                },
            };

            ResultRow {
                position: raw.position,
                driver: raw.abbreviation.clone(),
                team: raw.team_name.clone(),
                detail,
            }
        })
        .collect()
}

pub fn results_table(raw_results: &[RawResult], session_type: SessionType) -> ResultsTable {
    ResultsTable {
        columns: columns(session_type),
        rows: normalize_results(raw_results, session_type),
    }
}

/// The gap cell of a race row. The first row is treated as the leader by
/// position alone; the classification arrives sorted by finishing order.
fn race_gap(idx: usize, raw: &RawResult) -> String {
    let status = raw.status.as_str();

    if idx == 0 {
        format_optional(raw.time)
    } else if status.contains("Lap") {
        status.to_string()
    } else if status.contains("Retired") {
        "Retired".to_string()
    } else if status.contains("Did not start") {
        "DNS".to_string()
    } else if status.contains("Disqualified") {
        "DSQ".to_string()
    } else {
        format_optional(raw.time)
    }
}
