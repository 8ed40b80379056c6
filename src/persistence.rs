//! Mirrors the task list into a single key of a [`KeyValueStore`].

use serde_json::Value;

use crate::error::Result;
use crate::models::{timestamp, Task};
use crate::normalize::TaskInput;
use crate::storage::KeyValueStore;

/// Key under which the serialized task list is stored.
pub const STORAGE_KEY: &str = "tickbook.tasks.v1";

pub struct Persistence<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: &str) -> Self {
        Self {
            backend,
            key: key.to_string(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Serialize `tasks` and overwrite the stored value.
    pub fn try_save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        self.backend.set_item(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Best-effort save: a failure is logged and reported as `false`, never raised.
    pub fn save(&self, tasks: &[Task]) -> bool {
        match self.try_save(tasks) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to persist tasks");
                false
            }
        }
    }

    /// Read the stored list.
    ///
    /// A missing value, unreadable storage or a value that is not a JSON list
    /// all yield an empty list. Entries that are not objects are skipped;
    /// the rest are backfilled with defaults for any absent field.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read stored tasks");
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(key = %self.key, "stored tasks are not a list, ignoring");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "stored tasks are corrupt, ignoring");
                return Vec::new();
            }
        };

        let now = timestamp::now();
        entries
            .iter()
            .filter(|entry| {
                let keep = entry.is_object();
                if !keep {
                    tracing::warn!(key = %self.key, "skipping stored entry that is not an object");
                }
                keep
            })
            .map(|entry| TaskInput::from_value(entry).into_task(now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DueDate, Status};
    use crate::normalize::create_task;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn persistence_with(raw: &str) -> Persistence<MemoryStore> {
        Persistence::new(MemoryStore::with_item(STORAGE_KEY, raw))
    }

    #[test]
    fn test_load_missing_value_is_empty() {
        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_value_is_empty() {
        assert!(persistence_with("{not json").load().is_empty());
        assert!(persistence_with("{\"not\": \"a list\"}").load().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_tasks_and_order() {
        let mut done = create_task(&json!({ "id": "second", "title": "Done", "status": "Completed" }));
        done.priority = 4;
        let tasks = vec![
            create_task(&json!({ "id": "first", "title": "A", "description": "B", "dueDate": "2025-12-31" })),
            done,
            create_task(&json!({ "id": "third", "title": "C", "status": "In Progress" })),
        ];

        let persistence = Persistence::new(MemoryStore::new());
        assert!(persistence.save(&tasks));

        assert_eq!(persistence.load(), tasks);
    }

    #[test]
    fn test_load_backfills_missing_fields() {
        let persistence = persistence_with(
            r#"[{ "id": "old", "title": "Legacy", "createdAt": "2024-01-01T00:00:00.000Z" }]"#,
        );
        let tasks = persistence.load();

        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(task.status, Status::ToDo);
        assert_eq!(task.priority, 0);
        assert_eq!(task.due_date, DueDate::Unset);
    }

    #[test]
    fn test_load_derives_status_from_completed() {
        let persistence = persistence_with(r#"[{ "id": "a", "title": "Done", "completed": true }]"#);
        let task = &persistence.load()[0];
        assert_eq!(task.status, Status::Completed);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_load_skips_non_object_entries() {
        let persistence = persistence_with(r#"[42, { "id": "a", "title": "Kept" }, "text"]"#);
        let tasks = persistence.load();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "a");
    }

    #[test]
    fn test_save_overwrites_previous_value() {
        let persistence = persistence_with("[]");
        persistence.save(&[create_task(&json!({ "title": "x" }))]);
        persistence.save(&[]);
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_save_swallows_write_failure() {
        let persistence = persistence_with("[]");
        persistence.backend().set_fail_writes(true);

        assert!(!persistence.save(&[create_task(&json!({ "title": "x" }))]));
        assert!(persistence.try_save(&[]).is_err());
        assert!(persistence.load().is_empty());
    }

    #[test]
    fn test_custom_key() {
        let persistence = Persistence::with_key(MemoryStore::new(), "other");
        persistence.save(&[create_task(&json!({ "title": "x" }))]);
        assert!(persistence.backend().get_item(STORAGE_KEY).unwrap().is_none());
        assert_eq!(persistence.load().len(), 1);
    }
}
