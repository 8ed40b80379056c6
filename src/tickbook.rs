use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::directory::resolve_tickbook_directory;
use crate::error::{Result, TickbookError};
use crate::input::{
    self, parse_status, parse_task_words, resolve_selector, resolve_selectors, split_target,
};
use crate::models::{Status, Task};
use crate::normalize::TaskInput;
use crate::persistence::Persistence;
use crate::render::Render;
use crate::stats::Stats;
use crate::storage::{KeyValueStore, LocalStorage};
use crate::store::{TaskFilter, TaskPatch, TaskStore};
use crate::transfer::{self, ImportStage};

/// Command-line front end over a [`TaskStore`].
pub struct Tickbook<S: KeyValueStore> {
    store: TaskStore<S>,
    render: Render,
    today: NaiveDate,
}

impl Tickbook<LocalStorage> {
    /// Open the tickbook in the resolved data directory.
    pub fn open(tickbook_dir: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default();
        let resolved_dir = resolve_tickbook_directory(tickbook_dir, &config)?;
        tracing::debug!(dir = %resolved_dir.display(), "using tickbook directory");
        let storage = LocalStorage::new(&resolved_dir)?;
        Ok(Self::new(storage, config))
    }
}

impl<S: KeyValueStore> Tickbook<S> {
    pub fn new(storage: S, config: Config) -> Self {
        Self {
            store: TaskStore::load(Persistence::new(storage)),
            render: Render::new(config),
            today: Local::now().date_naive(),
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    fn warn_if_unsaved(&self) {
        if self.store.has_unsaved_changes() {
            self.render.unsaved_changes();
        }
    }

    fn single_target(&self, input: &[String]) -> Result<(String, Vec<String>)> {
        if !input.iter().any(|w| w.starts_with('@') && w.len() > 1) {
            return Err(TickbookError::MissingTarget);
        }
        let Some((target, rest)) = split_target(input) else {
            return Err(TickbookError::TooManyTargets(input.join(" ")));
        };
        let id = resolve_selector(self.store.tasks(), target)?;
        Ok((id, rest))
    }

    fn selected(&self, selectors: &[String]) -> Result<Vec<String>> {
        if selectors.is_empty() {
            return Err(TickbookError::MissingTarget);
        }
        resolve_selectors(self.store.tasks(), selectors)
    }

    pub fn display_tasks(&self, filter_words: &[String]) -> Result<()> {
        let filters = filter_words
            .iter()
            .map(|word| {
                TaskFilter::parse(word)
                    .ok_or_else(|| TickbookError::General(format!("Unknown filter: {word}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let title = if filter_words.is_empty() {
            "My Tasks".to_string()
        } else {
            filter_words.join(" ")
        };
        let listed: Vec<(usize, &Task)> = self
            .store
            .filter(&filters, self.today)
            .into_iter()
            .map(|(idx, task)| (idx + 1, task))
            .collect();
        self.render.display_tasks(&title, &listed, self.today);
        Ok(())
    }

    pub fn display_stats(&self) {
        self.render
            .display_stats(&Stats::collect(self.store.tasks(), self.today));
    }

    pub fn create_task(&mut self, words: &[String], description: Option<String>) -> Result<String> {
        let parsed = parse_task_words(words, self.today)?;
        if parsed.title.is_empty() {
            return Err(TickbookError::EmptyTitle);
        }

        let id = self.store.create(TaskInput {
            title: Some(parsed.title),
            description: description.map(|d| d.trim().to_string()),
            due_date: parsed.due_date,
            priority: parsed.priority.map(i64::from),
            status: parsed.status,
            ..TaskInput::default()
        })?;
        self.render.success_create(&id);
        self.warn_if_unsaved();
        Ok(id)
    }

    pub fn edit_task(&mut self, input: &[String], description: Option<String>) -> Result<()> {
        let (id, rest) = self.single_target(input)?;
        let parsed = parse_task_words(&rest, self.today)?;

        let patch = TaskPatch {
            title: (!parsed.title.is_empty()).then_some(parsed.title),
            description,
            due_date: parsed.due_date,
            status: parsed.status,
            priority: parsed.priority,
        };
        if patch.is_empty() {
            return Err(TickbookError::NothingToEdit);
        }

        self.store.edit(&id, patch)?;
        self.render.success_edit(&id);
        self.warn_if_unsaved();
        Ok(())
    }

    pub fn check_tasks(&mut self, selectors: &[String]) -> Result<()> {
        let ids = self.selected(selectors)?;
        let mut checked = Vec::new();
        let mut unchecked = Vec::new();

        for id in ids {
            match self.store.toggle_complete(&id) {
                Some(true) => checked.push(id),
                Some(false) => unchecked.push(id),
                None => {}
            }
        }

        self.render.mark_complete(&checked);
        self.render.mark_incomplete(&unchecked);
        self.warn_if_unsaved();
        Ok(())
    }

    /// Toggle between "To Do" and "In Progress". A completed task is reopened as started.
    pub fn begin_tasks(&mut self, selectors: &[String]) -> Result<()> {
        let ids = self.selected(selectors)?;
        let mut started = Vec::new();
        let mut paused = Vec::new();

        for id in ids {
            let next = match self.store.get(&id).map(|t| t.status) {
                Some(Status::InProgress) => Status::ToDo,
                Some(_) => Status::InProgress,
                None => continue,
            };
            self.store.choose_status(&id, next);
            if next == Status::InProgress {
                started.push(id);
            } else {
                paused.push(id);
            }
        }

        self.render.mark_started(&started);
        self.render.mark_paused(&paused);
        self.warn_if_unsaved();
        Ok(())
    }

    pub fn update_status(&mut self, input: &[String]) -> Result<()> {
        let (id, rest) = self.single_target(input)?;
        let status = parse_status(&rest.join(" "))?;

        self.store.choose_status(&id, status);
        self.render.success_status(&id, status);
        self.warn_if_unsaved();
        Ok(())
    }

    pub fn update_priority(&mut self, input: &[String]) -> Result<()> {
        let (id, rest) = self.single_target(input)?;
        let [level] = rest.as_slice() else {
            return Err(TickbookError::InvalidPriority(rest.join(" ")));
        };
        let level = input::parse_priority(level)?;

        self.store.set_priority(&id, level)?;
        self.render.success_priority(&id, level);
        self.warn_if_unsaved();
        Ok(())
    }

    pub fn update_due_date(&mut self, input: &[String]) -> Result<()> {
        let (id, rest) = self.single_target(input)?;
        let due = input::parse_due_value(&rest.join(" "), self.today)?;

        self.store.set_due_date(&id, due.clone(), self.today)?;
        self.render.success_due(&id, due.as_str());
        self.warn_if_unsaved();
        Ok(())
    }

    pub fn move_task(&mut self, input: &[String]) -> Result<()> {
        let (id, rest) = self.single_target(input)?;
        let len = self.store.len();
        let position = rest
            .first()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|p| (1..=len).contains(p))
            .ok_or_else(|| {
                TickbookError::General(format!("Position must be a number from 1 to {len}"))
            })?;

        if let Some(from) = self.store.position(&id) {
            self.store.reorder(from, position - 1);
        }
        self.render.success_move(&id, position);
        self.warn_if_unsaved();
        Ok(())
    }

    pub fn delete_tasks(&mut self, selectors: &[String]) -> Result<()> {
        let ids = self.selected(selectors)?;
        for id in &ids {
            self.store.delete(id);
        }
        self.render.success_delete(&ids);
        self.warn_if_unsaved();
        Ok(())
    }

    /// Delete completed tasks once `confirm` agrees.
    pub fn clear(&mut self, confirm: impl FnOnce(usize) -> Result<bool>) -> Result<()> {
        let pending = self.store.tasks().iter().filter(|t| t.completed).count();
        if pending == 0 {
            self.render.success_clear(&[]);
            return Ok(());
        }
        if !confirm(pending)? {
            return Ok(());
        }

        let removed: Vec<String> = self
            .store
            .clear_completed()
            .into_iter()
            .map(|t| t.id)
            .collect();
        self.render.success_clear(&removed);
        self.warn_if_unsaved();
        Ok(())
    }

    /// Stage the tasks in `path`, preview them and merge once `confirm` agrees.
    pub fn import(&mut self, path: &Path, confirm: impl FnOnce(usize) -> Result<bool>) -> Result<usize> {
        let mut stage = ImportStage::new();
        let staged = stage.begin_file(path)?;
        self.render.import_preview(stage.staged());

        if !confirm(staged)? {
            stage.cancel();
            self.render.import_cancelled();
            return Ok(0);
        }

        let added = stage.confirm(&mut self.store);
        self.render.success_import(added);
        self.warn_if_unsaved();
        Ok(added)
    }

    /// Write every task to `path`, or to a dated file in the working directory.
    pub fn export(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        let path = path.unwrap_or_else(|| PathBuf::from(transfer::export_file_name(self.today)));
        transfer::write_export(self.store.tasks(), &path)?;
        self.render.success_export(&path, self.store.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn words(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(String::from).collect()
    }

    fn tickbook() -> Tickbook<MemoryStore> {
        Tickbook::new(MemoryStore::new(), Config::default())
    }

    fn titles(tb: &Tickbook<MemoryStore>) -> Vec<String> {
        tb.store().tasks().iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_create_with_tokens() {
        let mut tb = tickbook();
        let id = tb
            .create_task(&words("Pay rent due:tomorrow p:4"), Some("by transfer".to_string()))
            .unwrap();

        let task = tb.store().get(&id).unwrap();
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.priority, 4);
        assert_eq!(task.description, "by transfer");
        assert!(task.due_date.is_set());
    }

    #[test]
    fn test_create_requires_title() {
        let mut tb = tickbook();
        assert!(matches!(
            tb.create_task(&words("p:2"), None),
            Err(TickbookError::EmptyTitle)
        ));
        assert!(tb.store().is_empty());
    }

    #[test]
    fn test_edit_by_position() {
        let mut tb = tickbook();
        tb.create_task(&words("Old title"), Some("keep".to_string())).unwrap();

        tb.edit_task(&words("@1 New title"), None).unwrap();
        let task = &tb.store().tasks()[0];
        assert_eq!(task.title, "New title");
        assert_eq!(task.description, "keep");

        tb.edit_task(&words("@1 s:done"), None).unwrap();
        assert!(tb.store().tasks()[0].completed);
    }

    #[test]
    fn test_edit_needs_exactly_one_target() {
        let mut tb = tickbook();
        tb.create_task(&words("A"), None).unwrap();
        tb.create_task(&words("B"), None).unwrap();

        assert!(matches!(
            tb.edit_task(&words("no target"), None),
            Err(TickbookError::MissingTarget)
        ));
        assert!(matches!(
            tb.edit_task(&words("@1 @2 x"), None),
            Err(TickbookError::TooManyTargets(_))
        ));
        assert!(matches!(
            tb.edit_task(&words("@1"), None),
            Err(TickbookError::NothingToEdit)
        ));
        assert!(matches!(
            tb.edit_task(&words("@1"), Some("  ".to_string())),
            Ok(())
        ));
    }

    #[test]
    fn test_check_and_begin() {
        let mut tb = tickbook();
        tb.create_task(&words("A"), None).unwrap();

        tb.begin_tasks(&words("1")).unwrap();
        assert_eq!(tb.store().tasks()[0].status, Status::InProgress);

        tb.check_tasks(&words("1")).unwrap();
        assert_eq!(tb.store().tasks()[0].status, Status::Completed);

        tb.check_tasks(&words("1")).unwrap();
        assert_eq!(tb.store().tasks()[0].status, Status::InProgress);

        tb.begin_tasks(&words("1")).unwrap();
        assert_eq!(tb.store().tasks()[0].status, Status::ToDo);

        assert!(matches!(
            tb.check_tasks(&words("zz")),
            Err(TickbookError::UnknownTask(_))
        ));
    }

    #[test]
    fn test_status_priority_and_due_updates() {
        let mut tb = tickbook();
        tb.create_task(&words("A"), None).unwrap();

        tb.update_status(&words("@1 in progress")).unwrap();
        assert_eq!(tb.store().tasks()[0].status, Status::InProgress);
        assert!(matches!(
            tb.update_status(&words("@1 blocked")),
            Err(TickbookError::InvalidStatus(_))
        ));

        tb.update_priority(&words("@1 5")).unwrap();
        assert_eq!(tb.store().tasks()[0].priority, 5);
        assert!(tb.update_priority(&words("@1 8")).is_err());

        tb.update_due_date(&words("@1 today")).unwrap();
        assert!(tb.store().tasks()[0].due_date.is_set());
        tb.update_due_date(&words("@1 none")).unwrap();
        assert!(!tb.store().tasks()[0].due_date.is_set());
        assert!(matches!(
            tb.update_due_date(&words("@1 2000-01-01")),
            Err(TickbookError::PastDueDate(_))
        ));
    }

    #[test]
    fn test_move_and_delete() {
        let mut tb = tickbook();
        tb.create_task(&words("C"), None).unwrap();
        tb.create_task(&words("B"), None).unwrap();
        tb.create_task(&words("A"), None).unwrap();
        let order = titles(&tb);

        tb.move_task(&words("@1 3")).unwrap();
        let moved = titles(&tb);
        assert_eq!(moved, vec![order[1].clone(), order[2].clone(), order[0].clone()]);

        assert!(tb.move_task(&words("@1 9")).is_err());

        tb.delete_tasks(&words("1 2")).unwrap();
        assert_eq!(titles(&tb), vec![order[0].clone()]);
    }

    #[test]
    fn test_clear_respects_confirmation() {
        let mut tb = tickbook();
        tb.create_task(&words("A"), None).unwrap();
        tb.create_task(&words("B"), None).unwrap();
        tb.check_tasks(&words("1")).unwrap();

        tb.clear(|_| Ok(false)).unwrap();
        assert_eq!(tb.store().len(), 2);

        tb.clear(|count| {
            assert_eq!(count, 1);
            Ok(true)
        })
        .unwrap();
        assert_eq!(tb.store().len(), 1);
    }

    #[test]
    fn test_import_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("in.json");
        std::fs::write(&file, r#"[{ "title": "One" }, { "title": "" }, { "title": "Two" }]"#).unwrap();

        let mut tb = tickbook();
        assert_eq!(tb.import(&file, |_| Ok(false)).unwrap(), 0);
        assert!(tb.store().is_empty());

        assert_eq!(tb.import(&file, |_| Ok(true)).unwrap(), 2);
        assert_eq!(tb.store().len(), 2);

        let out = dir.path().join("out.json");
        let written = tb.export(Some(out.clone())).unwrap();
        assert_eq!(written, out);
        assert_eq!(transfer::read_import_file(&out).unwrap().len(), 2);
    }

    #[test]
    fn test_list_filters() {
        let mut tb = tickbook();
        tb.create_task(&words("A"), None).unwrap();
        assert!(tb.display_tasks(&words("active overdue")).is_ok());
        assert!(matches!(
            tb.display_tasks(&words("bogus")),
            Err(TickbookError::General(_))
        ));
    }
}
