use std::path::Path;

use chrono::NaiveDate;
use colored::{ColoredString, Colorize};

use crate::config::Config;
use crate::models::{short_id, Status, Task};
use crate::stats::{DueBucket, Stats, Urgency};

pub struct Render {
    config: Config,
}

fn join_ids(ids: &[String]) -> String {
    ids.iter()
        .map(|id| short_id(id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

impl Render {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn build_prefix(&self, position: usize) -> String {
        let label = format!("{position}.");
        format!("{:>5}", label).dimmed().to_string()
    }

    fn get_icon(&self, task: &Task) -> ColoredString {
        match task.status {
            Status::Completed => "✔".green(),
            Status::InProgress => "…".yellow(),
            Status::ToDo => "☐".magenta(),
        }
    }

    fn build_message(&self, task: &Task) -> String {
        let title = &task.title;
        if task.completed {
            return title.dimmed().to_string();
        }
        match task.priority {
            0 | 1 => title.to_string(),
            2 | 3 => format!("{} {}", title.yellow().underline(), "(!)".yellow()),
            _ => format!("{} {}", title.red().underline(), "(!!)".red()),
        }
    }

    fn color_due(&self, bucket: DueBucket) -> String {
        let label = bucket.label();
        match bucket.urgency() {
            Urgency::Critical => label.red().bold().to_string(),
            Urgency::High => label.red().to_string(),
            Urgency::Elevated => label.yellow().to_string(),
            Urgency::Moderate => label.cyan().to_string(),
            Urgency::Low => label.green().to_string(),
            Urgency::Neutral => label.dimmed().to_string(),
        }
    }

    fn build_suffix(&self, task: &Task, today: NaiveDate) -> String {
        let mut parts = Vec::new();
        if !task.completed {
            let bucket = DueBucket::classify(&task.due_date, today);
            if bucket != DueBucket::NoDate {
                parts.push(self.color_due(bucket));
            } else if task.due_date.is_set() {
                parts.push(task.due_date.as_str().dimmed().to_string());
            }
        }
        if task.priority > 0 {
            parts.push(format!("p:{}", task.priority).dimmed().to_string());
        }
        parts.push(format!("#{}", task.short_id()).dimmed().to_string());
        parts.join(" ")
    }

    fn display_task(&self, position: usize, task: &Task, today: NaiveDate) {
        println!(
            "{} {} {} {}",
            self.build_prefix(position),
            self.get_icon(task),
            self.build_message(task),
            self.build_suffix(task, today)
        );
        if self.config.display_descriptions && !task.description.is_empty() {
            for line in task.description.lines() {
                println!("{:>8}{}", "", line.dimmed());
            }
        }
    }

    /// Print tasks with their 1-based position in the full list.
    pub fn display_tasks(&self, title: &str, tasks: &[(usize, &Task)], today: NaiveDate) {
        let done = tasks.iter().filter(|(_, t)| t.completed).count();
        println!(
            "\n  {} {}",
            title.underline(),
            format!("[{}/{}]", done, tasks.len()).dimmed()
        );

        for (position, task) in tasks {
            if task.completed && !self.config.display_complete_tasks {
                continue;
            }
            self.display_task(*position, task, today);
        }
    }

    pub fn display_stats(&self, stats: &Stats) {
        if !self.config.display_progress_overview {
            return;
        }

        if stats.total == 0 {
            println!("\n  Type `tk --help` to get started");
        }

        let percent = stats.percent_complete();
        let percent_str = if percent >= 75 {
            format!("{percent}%").green().to_string()
        } else if percent >= 50 {
            format!("{percent}%").yellow().to_string()
        } else {
            format!("{percent}%")
        };

        let status = format!(
            "{} {} {} {} {} {} {} {}",
            stats.completed.to_string().green(),
            "done".dimmed(),
            "·".dimmed(),
            stats.active.to_string().magenta(),
            "active".dimmed(),
            "·".dimmed(),
            stats.overdue.to_string().red(),
            "overdue".dimmed(),
        );

        println!(
            "\n  {}",
            format!("{percent_str} of all tasks complete.").dimmed()
        );
        println!("  {status}\n");
    }

    pub fn import_preview(&self, tasks: &[Task]) {
        println!(
            "\n  {} {}",
            "Import preview".underline(),
            format!("[{} {}]", tasks.len(), plural(tasks.len(), "task", "tasks")).dimmed()
        );
        for task in tasks {
            println!(
                "    {} {} {}",
                self.get_icon(task),
                task.title,
                task.due_date.as_str().dimmed()
            );
        }
    }

    pub fn unsaved_changes(&self) {
        eprintln!(
            "\n {} Changes could not be written to storage; they will be retried on the next change",
            "⚠".yellow()
        );
    }

    pub fn success_create(&self, id: &str) {
        println!("\n {} Created task: {}", "✔".green(), short_id(id).dimmed());
    }

    pub fn success_edit(&self, id: &str) {
        println!("\n {} Updated task: {}", "✔".green(), short_id(id).dimmed());
    }

    pub fn success_delete(&self, ids: &[String]) {
        println!(
            "\n {} Deleted {}: {}",
            "✔".green(),
            plural(ids.len(), "task", "tasks"),
            join_ids(ids).dimmed()
        );
    }

    fn mark(&self, verb: &str, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        println!(
            "\n {} {} {}: {}",
            "✔".green(),
            verb,
            plural(ids.len(), "task", "tasks"),
            join_ids(ids).dimmed()
        );
    }

    pub fn mark_complete(&self, ids: &[String]) {
        self.mark("Checked", ids);
    }

    pub fn mark_incomplete(&self, ids: &[String]) {
        self.mark("Unchecked", ids);
    }

    pub fn mark_started(&self, ids: &[String]) {
        self.mark("Started", ids);
    }

    pub fn mark_paused(&self, ids: &[String]) {
        self.mark("Paused", ids);
    }

    pub fn success_status(&self, id: &str, status: Status) {
        println!(
            "\n {} Updated status of task: {} to {}",
            "✔".green(),
            short_id(id).dimmed(),
            status.as_str().bold()
        );
    }

    pub fn success_priority(&self, id: &str, level: u8) {
        let level_str = match level {
            0 => "none".dimmed(),
            1 => "1".green(),
            2 | 3 => level.to_string().yellow(),
            _ => level.to_string().red(),
        };
        println!(
            "\n {} Updated priority of task: {} to {}",
            "✔".green(),
            short_id(id).dimmed(),
            level_str
        );
    }

    pub fn success_due(&self, id: &str, due: &str) {
        println!(
            "\n {} Updated due date of task: {} to {}",
            "✔".green(),
            short_id(id).dimmed(),
            due.dimmed()
        );
    }

    pub fn success_move(&self, id: &str, position: usize) {
        println!(
            "\n {} Moved task: {} to position {}",
            "✔".green(),
            short_id(id).dimmed(),
            position
        );
    }

    pub fn success_clear(&self, ids: &[String]) {
        if ids.is_empty() {
            println!("\n {} No completed tasks to clear", "✔".green());
            return;
        }
        println!(
            "\n {} Deleted all checked tasks: {}",
            "✔".green(),
            join_ids(ids).dimmed()
        );
    }

    pub fn success_import(&self, count: usize) {
        println!(
            "\n {} Imported {} {}",
            "✔".green(),
            count,
            plural(count, "task", "tasks")
        );
    }

    pub fn import_cancelled(&self) {
        println!("\n {} Import cancelled, nothing was changed", "✔".dimmed());
    }

    pub fn success_export(&self, path: &Path, count: usize) {
        println!(
            "\n {} Exported {} {} to {}",
            "✔".green(),
            count,
            plural(count, "task", "tasks"),
            path.display().to_string().dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_ids() {
        let ids = vec!["aaaaaaaaaa".to_string(), "b".to_string()];
        assert_eq!(join_ids(&ids), "aaaaaaaa, b");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "task", "tasks"), "task");
        assert_eq!(plural(0, "task", "tasks"), "tasks");
    }
}
