use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, BridgeResult};

/// Primary key of every backend record.
pub type RecordId = i64;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
}

// the backend leaves out the accumulated time on freshly created records
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: RecordId,
    pub name: String,
    pub client_id: RecordId,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: RecordId,
    pub name: String,
    pub project_id: RecordId,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: RecordId,
    pub task_id: RecordId,
    pub entries: Vec<Entry>,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

/// One stretch of tracked time inside an event. Dates are passed through as the backend's
/// iso formatted strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: RecordId,
    pub event_id: RecordId,
    pub start_date: String,
    pub end_date: String,
    pub seconds: u64,
}

/// Everything the running timer is attached to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOwner {
    pub client: Client,
    pub project: Project,
    pub task: Task,
    pub event: Event,
    #[serde(rename = "isRunning")]
    pub is_running: bool,
    #[serde(rename = "isPaused")]
    pub is_paused: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    InProgress,
    Complete,
    Cancelled,
}

/// Why an entry stopped accumulating time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopReason {
    Paused,
    Finished,
}

/// A saved client/project/task triple for switching the timer quickly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcut {
    pub id: RecordId,
    pub compound_name: Vec<String>,
    pub client_id: RecordId,
    pub project_id: RecordId,
    pub task_id: RecordId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDate {
    pub event_id: RecordId,
    pub start_date: String,
}

// reports
// -------------------------------------------------------------------------------------------------------

/// Filter for a time report. Dates are `YYYY-MM-DD`; absent fields do not filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<RecordId>,
    /// hourly wage, used by the text rendering only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wage: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_order: Vec<String>,
}

/// Totals shared by every level of a report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportTotals {
    pub name: String,
    pub category: String,
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub total_seconds: f64,
    pub decimal: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeReport {
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default)]
    pub clients: BTreeMap<String, ClientTime>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientTime {
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectTime>,
}

/// Keyed by date in `dates`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTime {
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default)]
    pub dates: BTreeMap<String, DateTimeCard>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DateTimeCard {
    #[serde(flatten)]
    pub totals: ReportTotals,
    #[serde(default)]
    pub tasks: Vec<TaskTimeCard>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskTimeCard {
    #[serde(flatten)]
    pub totals: ReportTotals,
    /// number of entries summed into this card
    #[serde(default)]
    pub entries: u64,
}

// -------------------------------------------------------------------------------------------------------

/// Elapsed time the backend timer reports on every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTick {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimerTick {
    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    /// Reads a tick pushed through `criticalCall`, either as a single `[h, m, s]` argument or as
    /// three positional ones. Fractional parts are dropped.
    pub fn from_args(args: &[Value]) -> BridgeResult<Self> {
        let parts = match args {
            [Value::Array(parts)] => parts.as_slice(),
            parts => parts,
        };

        let [hours, minutes, seconds] = parts else {
            return Err(BridgeError::MalformedNotification {
                reason: format!("expected [hours, minutes, seconds], got {:?}", args),
            });
        };

        Ok(TimerTick {
            hours: whole_number(hours)?,
            minutes: whole_number(minutes)?,
            seconds: whole_number(seconds)?,
        })
    }
}

impl std::fmt::Display for TimerTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

fn whole_number(value: &Value) -> BridgeResult<u64> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(n) if n.is_finite() && n >= 0.0 => Ok(n.floor() as u64),
        _ => Err(BridgeError::MalformedNotification {
            reason: format!("{} is not a non-negative number", value),
        }),
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
