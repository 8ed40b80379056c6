use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use super::timestamp;

/// Literal stored in place of a due date when none is set.
pub const NO_DUE_DATE: &str = "No due date";

/// Priority of a task nobody has prioritised yet.
pub const PRIORITY_UNSET: u8 = 0;

/// Highest explicit priority level.
pub const MAX_PRIORITY: u8 = 5;

/// Workflow state of a task. `Completed` always agrees with `Task::completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }

    /// Parse a stored status label, or one of the short aliases used on the command line.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase().replace(['-', '_', ' '], "");
        match key.as_str() {
            "todo" | "pending" | "open" => Some(Status::ToDo),
            "inprogress" | "progress" | "started" | "doing" => Some(Status::InProgress),
            "completed" | "complete" | "done" => Some(Status::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Due date of a task: either unset or the raw text the user gave.
///
/// The raw text is kept as-is even when it is not a date we can read; such
/// values simply never take part in date arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DueDate {
    #[default]
    Unset,
    On(String),
}

impl DueDate {
    /// Trim `raw`; an empty string or the sentinel itself means no due date.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NO_DUE_DATE {
            DueDate::Unset
        } else {
            DueDate::On(trimmed.to_string())
        }
    }

    /// Re-read the raw text so stray whitespace and empty values collapse as they do on load.
    pub fn normalized(&self) -> Self {
        match self {
            DueDate::Unset => DueDate::Unset,
            DueDate::On(raw) => DueDate::from_raw(raw),
        }
    }

    pub fn on_day(day: NaiveDate) -> Self {
        DueDate::On(day.format("%Y-%m-%d").to_string())
    }

    pub fn is_set(&self) -> bool {
        matches!(self, DueDate::On(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            DueDate::Unset => NO_DUE_DATE,
            DueDate::On(raw) => raw,
        }
    }

    /// Calendar day this due date falls on, if it can be read.
    ///
    /// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps; for the latter the
    /// day is the one written in the timestamp's own offset.
    pub fn day(&self) -> Option<NaiveDate> {
        let raw = match self {
            DueDate::Unset => return None,
            DueDate::On(raw) => raw.as_str(),
        };

        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(day);
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DueDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single to-do item in its canonical shape.
///
/// Built by the normalizer (see [`crate::normalize`]); never deserialized
/// directly, so every record on disk goes back through the same defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    pub title: String,

    pub description: String,

    pub due_date: DueDate,

    pub completed: bool,

    #[serde(serialize_with = "timestamp::serialize_optional")]
    pub completed_at: Option<DateTime<Utc>>,

    pub status: Status,

    pub priority: u8,

    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,

    /// Status to fall back to when a completed task is un-completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_status: Option<Status>,
}

impl Task {
    /// Flip completion and keep `status` and `completed_at` in step.
    ///
    /// A task completed while "In Progress" returns to "In Progress" when
    /// un-completed; every other task returns to "To Do". Returns the new
    /// completion state.
    pub fn toggle_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            self.completed = false;
            self.completed_at = None;
            self.status = self.resume_status.take().unwrap_or(Status::ToDo);
        } else {
            self.resume_status = (self.status == Status::InProgress).then_some(Status::InProgress);
            self.completed = true;
            self.completed_at = Some(now);
            self.status = Status::Completed;
        }
        self.completed
    }

    /// Move the task to `status`, completing or reopening it as needed.
    ///
    /// `completed_at` is only stamped when the task was not already completed.
    pub fn set_status(&mut self, status: Status, now: DateTime<Utc>) {
        self.resume_status = None;
        if status == Status::Completed {
            if !self.completed || self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
            self.completed = true;
        } else {
            self.completed = false;
            self.completed_at = None;
        }
        self.status = status;
    }

    /// Open and not yet done.
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Due strictly before `today` and still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.day().is_some_and(|day| day < today)
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// First eight characters of an id, enough to address a task on the command line.
pub fn short_id(id: &str) -> &str {
    let end = id.char_indices().nth(8).map(|(idx, _)| idx).unwrap_or(id.len());
    &id[..end]
}
