//! Turns loosely-typed input into canonical [`Task`] records.
//!
//! Input arrives from three places: command-line payloads, imported files and
//! the persisted blob. All of them go through [`TaskInput::from_value`], which
//! reads each field on its own and drops anything of the wrong shape, then
//! through [`TaskInput::into_task`], which fills in defaults. Title emptiness
//! is not checked here; that is the caller's decision.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{timestamp, DueDate, Status, Task, MAX_PRIORITY, PRIORITY_UNSET};

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Field-by-field view of an untrusted task payload.
///
/// `None` means "absent or unusable"; defaults are applied later by
/// [`TaskInput::into_task`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DueDate>,
    pub priority: Option<i64>,
    pub completed: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: Option<Status>,
    pub created_at: Option<DateTime<Utc>>,
    pub resume_status: Option<Status>,
}

impl TaskInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Read a JSON payload. Anything that is not an object yields an empty input.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            id: obj.get("id").and_then(coerce_text).filter(|id| !id.is_empty()),
            title: obj.get("title").and_then(coerce_text),
            description: obj.get("description").and_then(coerce_text),
            due_date: obj.get("dueDate").map(coerce_due_date),
            priority: obj.get("priority").and_then(coerce_integer),
            completed: obj.get("completed").and_then(Value::as_bool),
            completed_at: obj.get("completedAt").and_then(coerce_timestamp),
            status: obj.get("status").and_then(Value::as_str).and_then(Status::parse),
            created_at: obj.get("createdAt").and_then(coerce_timestamp),
            resume_status: obj
                .get("resumeStatus")
                .and_then(Value::as_str)
                .and_then(Status::parse),
        }
    }

    /// Build the canonical task, stamping missing timestamps with `now`.
    ///
    /// An explicit `completed` flag decides completion; otherwise it follows
    /// `status`. The resulting pair always agrees, and `completed_at` is set
    /// exactly when the task is completed.
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        let completed = match (self.completed, self.status) {
            (Some(completed), _) => completed,
            (None, Some(status)) => status == Status::Completed,
            (None, None) => false,
        };

        let status = match (completed, self.status) {
            (true, _) => Status::Completed,
            (false, Some(Status::InProgress)) => Status::InProgress,
            (false, _) => Status::ToDo,
        };

        let priority = self
            .priority
            .map(|p| p.clamp(i64::from(PRIORITY_UNSET), i64::from(MAX_PRIORITY)) as u8)
            .unwrap_or(PRIORITY_UNSET);

        Task {
            id: self
                .id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .unwrap_or_else(generate_id),
            title: trimmed(self.title),
            description: trimmed(self.description),
            due_date: self.due_date.map(|d| d.normalized()).unwrap_or_default(),
            completed,
            completed_at: completed.then(|| self.completed_at.unwrap_or(now)),
            status,
            priority,
            created_at: self.created_at.unwrap_or(now),
            resume_status: self
                .resume_status
                .filter(|s| completed && *s == Status::InProgress),
        }
    }
}

impl From<&Task> for TaskInput {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            due_date: Some(task.due_date.clone()),
            priority: Some(i64::from(task.priority)),
            completed: Some(task.completed),
            completed_at: task.completed_at,
            status: Some(task.status),
            created_at: Some(task.created_at),
            resume_status: task.resume_status,
        }
    }
}

/// Normalize an arbitrary JSON payload into a task stamped with the current time.
pub fn create_task(value: &Value) -> Task {
    TaskInput::from_value(value).into_task(timestamp::now())
}

fn trimmed(text: Option<String>) -> String {
    text.map(|t| t.trim().to_string()).unwrap_or_default()
}

/// Strings are trimmed; non-zero numbers and `true` become their text; everything else is unusable.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn coerce_due_date(value: &Value) -> DueDate {
    match value {
        Value::String(s) => DueDate::from_raw(s),
        Value::Number(n) => DueDate::from_raw(&n.to_string()),
        _ => DueDate::Unset,
    }
}

/// Integers, floats (truncated) and numeric strings.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(timestamp::parse)
}
