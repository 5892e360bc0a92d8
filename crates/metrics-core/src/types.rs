//! Domain types shared by every crate in the tracker.
//!
//! Field names mirror the on-disk document layout via `serde(rename)` so the
//! wire contract (`_id`, `static_data`, `avgplayers`, ...) stays stable even
//! though the Rust-side names are idiomatic `snake_case`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, stable identifier for an [`App`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub String);

impl AppId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The closed set of providers an app's player count can be sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Steam,
    Osrs,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Steam => write!(f, "steam"),
            Self::Osrs => write!(f, "osrs"),
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steam" => Ok(Self::Steam),
            "osrs" => Ok(Self::Osrs),
            other => Err(other.to_string()),
        }
    }
}

/// Identity and display metadata for an app, immutable after Refresh inserts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticData {
    pub name: String,
    #[serde(rename = "app_id")]
    pub external_id: i64,
    pub domain: Domain,
}

/// One observation of current player count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySample {
    pub date: DateTime<Utc>,
    #[serde(rename = "player_count")]
    pub count: i64,
}

/// A monthly rollup over daily samples, plus deltas to the previous month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub date: DateTime<Utc>,
    #[serde(rename = "avgplayers")]
    pub avg: i64,
    pub peak: i64,
    pub gain: String,
    #[serde(rename = "gainpercent")]
    pub gain_pct: String,
}

/// A catalog entry for one tracked external item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    #[serde(rename = "_id")]
    pub id: AppId,
    pub static_data: StaticData,
    #[serde(rename = "daily_metrics", default)]
    pub dailies: Vec<DailySample>,
    #[serde(rename = "metrics", default)]
    pub months: Vec<MonthRecord>,
    pub tracked: bool,
    #[serde(rename = "last_metric", skip_serializing_if = "Option::is_none")]
    pub last_sample: Option<DailySample>,
}

impl App {
    /// Construct a fresh, untracked app as Refresh does when it first sees an id.
    #[must_use]
    pub fn new(id: AppId, static_data: StaticData) -> Self {
        Self {
            id,
            static_data,
            dailies: Vec::new(),
            months: Vec::new(),
            tracked: false,
            last_sample: None,
        }
    }
}

/// A reference to an App, persisted when a daily sample fails to be taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionEntry {
    #[serde(rename = "_id")]
    pub id: AppId,
    pub ref_id: AppId,
    pub static_data: StaticData,
    pub attempted_date: DateTime<Utc>,
}

impl ExceptionEntry {
    #[must_use]
    pub fn new(app: &App, attempted_date: DateTime<Utc>) -> Self {
        Self {
            id: app.id.clone(),
            ref_id: app.id.clone(),
            static_data: app.static_data.clone(),
            attempted_date,
        }
    }
}
