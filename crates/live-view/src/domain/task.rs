//! Task Entity
//!
//! A card on the branch task board. The status field holds the title of the
//! board column the task sits in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::LiveResult;
use super::record::{to_fields, Record};
use super::scope::BranchId;

/// Board status, stored remotely as the column title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
    /// Status text matching no known column. Kept so the task stays visible.
    Unrecognized(String),
}

impl TaskStatus {
    pub const TODO_TITLE: &'static str = "Daftar Tugas (To Do)";
    pub const IN_PROGRESS_TITLE: &'static str = "Sedang Dikerjakan (In Progress)";
    pub const DONE_TITLE: &'static str = "Selesai (Done)";

    pub fn title(&self) -> &str {
        match self {
            TaskStatus::ToDo => Self::TODO_TITLE,
            TaskStatus::InProgress => Self::IN_PROGRESS_TITLE,
            TaskStatus::Done => Self::DONE_TITLE,
            TaskStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn from_title(title: &str) -> Self {
        match title {
            Self::TODO_TITLE => TaskStatus::ToDo,
            Self::IN_PROGRESS_TITLE => TaskStatus::InProgress,
            Self::DONE_TITLE => TaskStatus::Done,
            other => TaskStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, TaskStatus::Unrecognized(_))
    }

}

impl Default for TaskStatus {
    /// Missing or null status; lands in the first column
    fn default() -> Self {
        TaskStatus::Unrecognized(String::new())
    }
}

impl From<String> for TaskStatus {
    fn from(title: String) -> Self {
        TaskStatus::from_title(&title)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.title().to_string()
    }
}

/// A task card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(
        default,
        deserialize_with = "lenient_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    pub upc: BranchId,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: TaskStatus, upc: BranchId) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status,
            due_date: None,
            labels: Vec::new(),
            upc,
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }

    fn branch(&self) -> &BranchId {
        &self.upc
    }
}

/// Treat an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept RFC 3339 strings; anything else means "no due date"
fn lenient_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                log::warn!("[TASK] Ignoring malformed due date {:?}: {}", s, e);
                None
            }
        },
        Some(Value::Null) | None => None,
        Some(other) => {
            log::warn!("[TASK] Ignoring non-string due date {}", other);
            None
        }
    })
}

/// User-supplied fields of a new task. Status and branch come from the board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Document fields for the remote create call
    pub fn to_fields(&self, status: &TaskStatus, upc: &BranchId) -> LiveResult<Map<String, Value>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct NewTask<'a> {
            title: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<&'a str>,
            status: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            due_date: Option<&'a DateTime<Utc>>,
            labels: &'a [String],
            upc: &'a BranchId,
        }

        to_fields(&NewTask {
            title: &self.title,
            description: self.description.as_deref(),
            status: status.title(),
            due_date: self.due_date.as_ref(),
            labels: &self.labels,
            upc,
        })
    }
}

/// Partial update. `None` leaves a field untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn labels(labels: Vec<String>) -> Self {
        Self {
            labels: Some(labels),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }

    pub fn to_fields(&self) -> LiveResult<Map<String, Value>> {
        to_fields(self)
    }
}
