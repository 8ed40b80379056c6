//! The in-memory task collection and every operation that changes it.
//!
//! [`TaskStore`] owns the only live copy of the tasks. Each mutation is
//! followed by a write through [`Persistence`]; a failed write is logged,
//! remembered via [`TaskStore::has_unsaved_changes`], and retried implicitly
//! by the next mutation.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{Result, TickbookError};
use crate::models::{timestamp, DueDate, Status, Task, MAX_PRIORITY};
use crate::normalize::{generate_id, TaskInput};
use crate::persistence::Persistence;
use crate::storage::KeyValueStore;

/// Fields an edit may change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DueDate>,
    pub status: Option<Status>,
    pub priority: Option<u8>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Subsets of the collection used by list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Active,
    Completed,
    Status(Status),
    Overdue,
}

impl TaskFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "all" => Some(TaskFilter::All),
            "active" | "open" | "unchecked" | "incomplete" => Some(TaskFilter::Active),
            "done" | "checked" | "complete" | "completed" => Some(TaskFilter::Completed),
            "overdue" | "late" => Some(TaskFilter::Overdue),
            other => Status::parse(other).map(TaskFilter::Status),
        }
    }

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => task.is_active(),
            TaskFilter::Completed => task.completed,
            TaskFilter::Status(status) => task.status == status,
            TaskFilter::Overdue => task.is_overdue(today),
        }
    }
}

pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    persistence: Persistence<S>,
    unsaved: bool,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Build the store from whatever `persistence` currently holds.
    pub fn load(persistence: Persistence<S>) -> Self {
        let mut tasks = persistence.load();
        dedupe_ids(&mut tasks);
        tracing::debug!(count = tasks.len(), "loaded tasks");
        Self {
            tasks,
            persistence,
            unsaved: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// True while the last write to storage failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Tasks matching every filter, in collection order, with their index.
    pub fn filter(&self, filters: &[TaskFilter], today: NaiveDate) -> Vec<(usize, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| filters.iter().all(|f| f.matches(t, today)))
            .collect()
    }

    /// Normalize `input` and insert it, newest first.
    ///
    /// A blank title is rejected before anything changes. A supplied id that
    /// already exists is replaced with a fresh one. Returns the new task's id.
    pub fn create(&mut self, input: TaskInput) -> Result<String> {
        let mut task = input.into_task(timestamp::now());
        if task.title.is_empty() {
            return Err(TickbookError::EmptyTitle);
        }

        if self.get(&task.id).is_some() {
            tracing::debug!(id = %task.id, "supplied id already in use, generating a new one");
            task.id = self.fresh_id();
        }

        let id = task.id.clone();
        self.tasks.insert(0, task);
        self.sort_newest_first();
        self.persist();
        Ok(id)
    }

    /// Merge `patch` onto the task with `id`.
    ///
    /// Returns `Ok(false)` when no task matches, whatever the patch holds. A
    /// blank title in the patch is rejected and leaves the task untouched.
    pub fn edit(&mut self, id: &str, patch: TaskPatch) -> Result<bool> {
        let Some(idx) = self.position(id) else {
            tracing::debug!(%id, "edit of unknown task ignored");
            return Ok(false);
        };

        let title = match patch.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(TickbookError::EmptyTitle);
                }
                Some(title)
            }
            None => None,
        };
        if let Some(priority) = patch.priority {
            check_priority(priority)?;
        }

        let task = &mut self.tasks[idx];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date.normalized();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(status) = patch.status {
            if status != task.status {
                task.set_status(status, timestamp::now());
            }
        }

        self.persist();
        Ok(true)
    }

    /// Remove the task with `id`. Storage is rewritten even when nothing matched.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if !removed {
            tracing::debug!(%id, "delete of unknown task ignored");
        }
        self.persist();
        removed
    }

    /// Flip completion of the task with `id`; returns the new state.
    pub fn toggle_complete(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        let completed = task.toggle_complete(timestamp::now());
        self.persist();
        Some(completed)
    }

    /// Put the task with `id` into `status`; returns false when no task matches.
    pub fn choose_status(&mut self, id: &str, status: Status) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.set_status(status, timestamp::now());
        self.persist();
        true
    }

    pub fn set_priority(&mut self, id: &str, level: u8) -> Result<bool> {
        let Some(idx) = self.position(id) else {
            return Ok(false);
        };
        check_priority(level)?;
        self.tasks[idx].priority = level;
        self.persist();
        Ok(true)
    }

    /// Replace only the due date. A day before `today` is rejected.
    pub fn set_due_date(&mut self, id: &str, due_date: DueDate, today: NaiveDate) -> Result<bool> {
        let Some(idx) = self.position(id) else {
            return Ok(false);
        };
        let due_date = due_date.normalized();
        if let Some(day) = due_date.day() {
            if day < today {
                return Err(TickbookError::PastDueDate(due_date.to_string()));
            }
        }
        self.tasks[idx].due_date = due_date;
        self.persist();
        Ok(true)
    }

    /// Move the task at `from` to `to`, shifting the tasks in between.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tasks.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.persist();
        true
    }

    /// Drop every completed task; returns the removed tasks.
    pub fn clear_completed(&mut self) -> Vec<Task> {
        let (removed, kept): (Vec<Task>, Vec<Task>) =
            self.tasks.drain(..).partition(|t| t.completed);
        self.tasks = kept;
        self.persist();
        removed
    }

    /// Prepend already-normalized tasks, re-sort and persist. Returns how many were added.
    pub fn merge(&mut self, incoming: Vec<Task>) -> usize {
        if incoming.is_empty() {
            return 0;
        }

        let mut taken: HashSet<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
        let mut merged = Vec::with_capacity(incoming.len() + self.tasks.len());
        for mut task in incoming {
            while !taken.insert(task.id.clone()) {
                task.id = generate_id();
            }
            merged.push(task);
        }
        let added = merged.len();

        merged.append(&mut self.tasks);
        self.tasks = merged;
        self.sort_newest_first();
        self.persist();
        added
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn sort_newest_first(&mut self) {
        self.tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    fn persist(&mut self) {
        self.unsaved = !self.persistence.save(&self.tasks);
    }
}

fn check_priority(level: u8) -> Result<()> {
    if level > MAX_PRIORITY {
        return Err(TickbookError::InvalidPriority(level.to_string()));
    }
    Ok(())
}

/// Stored data written by hand may repeat ids; later duplicates get fresh ones.
fn dedupe_ids(tasks: &mut [Task]) {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks.iter_mut() {
        while !seen.insert(task.id.clone()) {
            tracing::warn!(id = %task.id, "duplicate task id in storage, reassigning");
            task.id = generate_id();
        }
    }
}
