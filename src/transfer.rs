//! Import and export of task lists as JSON files.
//!
//! Importing is staged: [`parse_import`] turns file text into normalized tasks
//! without touching the store, [`ImportStage`] holds them until the user
//! confirms, and only [`ImportStage::confirm`] merges them in.

use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{Result, TickbookError};
use crate::models::{timestamp, Task};
use crate::normalize::{generate_id, TaskInput};
use crate::storage::KeyValueStore;
use crate::store::TaskStore;

/// Parse the text of an import file into tasks ready to be staged.
///
/// Entries with an empty title are dropped. Every surviving task gets a
/// freshly generated id, never one that appears in the file.
pub fn parse_import(text: &str) -> Result<Vec<Task>> {
    let value: Value = serde_json::from_str(text).map_err(TickbookError::ImportParse)?;
    let Value::Array(entries) = value else {
        return Err(TickbookError::ImportNotAList);
    };

    let source_ids: Vec<&str> = entries
        .iter()
        .filter_map(|entry| entry.get("id").and_then(Value::as_str))
        .collect();

    let now = timestamp::now();
    let tasks: Vec<Task> = entries
        .iter()
        .map(|entry| TaskInput::from_value(entry).into_task(now))
        .filter(|task| !task.title.is_empty())
        .map(|mut task| {
            task.id = generate_id();
            while source_ids.contains(&task.id.as_str()) {
                task.id = generate_id();
            }
            task
        })
        .collect();

    if tasks.is_empty() {
        return Err(TickbookError::NothingToImport);
    }
    tracing::debug!(count = tasks.len(), skipped = entries.len() - tasks.len(), "parsed import");
    Ok(tasks)
}

/// Read and parse an import file. Only `.json` files are accepted.
pub fn read_import_file(path: &Path) -> Result<Vec<Task>> {
    if !is_json_file(path) {
        return Err(TickbookError::UnsupportedImportFile(
            path.display().to_string(),
        ));
    }
    let text = std::fs::read_to_string(path)?;
    parse_import(&text)
}

pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Tasks parsed from an import file, waiting for confirmation.
#[derive(Debug, Default)]
pub struct ImportStage {
    staged: Vec<Task>,
}

impl ImportStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the tasks in `text`. A new import replaces anything already staged.
    ///
    /// On error the previous staged list is left as it was.
    pub fn begin(&mut self, text: &str) -> Result<usize> {
        let tasks = parse_import(text)?;
        self.staged = tasks;
        Ok(self.staged.len())
    }

    pub fn begin_file(&mut self, path: &Path) -> Result<usize> {
        let tasks = read_import_file(path)?;
        self.staged = tasks;
        Ok(self.staged.len())
    }

    pub fn staged(&self) -> &[Task] {
        &self.staged
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Discard the staged tasks.
    pub fn cancel(&mut self) {
        self.staged.clear();
    }

    /// Merge the staged tasks into `store`; returns how many were added.
    pub fn confirm<S: KeyValueStore>(&mut self, store: &mut TaskStore<S>) -> usize {
        let staged = std::mem::take(&mut self.staged);
        store.merge(staged)
    }
}

/// Serialize the whole collection, each entry re-normalized into canonical shape.
pub fn export_tasks(tasks: &[Task]) -> Result<String> {
    let now = timestamp::now();
    let canonical: Vec<Task> = tasks
        .iter()
        .map(|task| TaskInput::from(task).into_task(now))
        .collect();
    Ok(serde_json::to_string_pretty(&canonical)?)
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("tickbook-export-{}.json", today.format("%Y-%m-%d"))
}

pub fn write_export(tasks: &[Task], path: &Path) -> Result<()> {
    let json = export_tasks(tasks)?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), count = tasks.len(), "exported tasks");
    Ok(())
}
