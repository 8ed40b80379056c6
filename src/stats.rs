//! Counts and due-date buckets derived from the current task list.

use chrono::NaiveDate;

use crate::models::{DueDate, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl Stats {
    pub fn collect(tasks: &[Task], today: NaiveDate) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
            overdue,
        }
    }

    /// Share of completed tasks, rounded down. An empty list is 0%.
    pub fn percent_complete(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}

/// How soon a due date falls, relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBucket {
    NoDate,
    Overdue { days: i64 },
    Today,
    Tomorrow,
    InDays(i64),
}

/// Visual emphasis tier, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Critical,
    High,
    Elevated,
    Moderate,
    Low,
    Neutral,
}

impl DueBucket {
    /// Unset and unreadable dates both land in `NoDate`.
    pub fn classify(due: &DueDate, today: NaiveDate) -> Self {
        let Some(day) = due.day() else {
            return DueBucket::NoDate;
        };
        match (day - today).num_days() {
            d if d < 0 => DueBucket::Overdue { days: -d },
            0 => DueBucket::Today,
            1 => DueBucket::Tomorrow,
            d => DueBucket::InDays(d),
        }
    }

    pub fn label(&self) -> String {
        match self {
            DueBucket::NoDate => "No due date".to_string(),
            DueBucket::Overdue { days: 1 } => "Overdue by 1 day".to_string(),
            DueBucket::Overdue { days } => format!("Overdue by {days} days"),
            DueBucket::Today => "Due today".to_string(),
            DueBucket::Tomorrow => "Due tomorrow".to_string(),
            DueBucket::InDays(days) => format!("Due in {days} days"),
        }
    }

    pub fn urgency(&self) -> Urgency {
        match self {
            DueBucket::NoDate => Urgency::Neutral,
            DueBucket::Overdue { .. } => Urgency::Critical,
            DueBucket::Today => Urgency::High,
            DueBucket::Tomorrow => Urgency::Elevated,
            DueBucket::InDays(days) if *days <= 3 => Urgency::Moderate,
            DueBucket::InDays(_) => Urgency::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::create_task;
    use chrono::Duration;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn due_in(days: i64) -> DueDate {
        DueDate::on_day(today() + Duration::days(days))
    }

    #[test]
    fn test_collect_counts() {
        let tasks = vec![
            create_task(&json!({ "title": "a", "completed": true })),
            create_task(&json!({ "title": "b", "dueDate": "2026-03-09" })),
            create_task(&json!({ "title": "c", "dueDate": "2026-03-10" })),
            create_task(&json!({ "title": "d", "dueDate": "2026-03-01", "completed": true })),
            create_task(&json!({ "title": "e", "dueDate": "not a date" })),
        ];
        let stats = Stats::collect(&tasks, today());

        assert_eq!(stats.total, 5);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.percent_complete(), 40);
    }

    #[test]
    fn test_empty_collection() {
        let stats = Stats::collect(&[], today());
        assert_eq!(stats, Stats::default());
        assert_eq!(stats.percent_complete(), 0);
    }

    #[test]
    fn test_classify_buckets() {
        assert_eq!(DueBucket::classify(&DueDate::Unset, today()), DueBucket::NoDate);
        assert_eq!(
            DueBucket::classify(&DueDate::from_raw("garbage"), today()),
            DueBucket::NoDate
        );
        assert_eq!(DueBucket::classify(&due_in(-2), today()), DueBucket::Overdue { days: 2 });
        assert_eq!(DueBucket::classify(&due_in(0), today()), DueBucket::Today);
        assert_eq!(DueBucket::classify(&due_in(1), today()), DueBucket::Tomorrow);
        assert_eq!(DueBucket::classify(&due_in(5), today()), DueBucket::InDays(5));
    }

    #[test]
    fn test_urgency_tiers() {
        let urgency = |days| DueBucket::classify(&due_in(days), today()).urgency();

        assert_eq!(urgency(-1), Urgency::Critical);
        assert_eq!(urgency(0), Urgency::High);
        assert_eq!(urgency(1), Urgency::Elevated);
        assert_eq!(urgency(3), Urgency::Moderate);
        assert_eq!(urgency(4), Urgency::Low);
        assert_eq!(DueBucket::NoDate.urgency(), Urgency::Neutral);
        assert!(Urgency::Critical < Urgency::Low);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DueBucket::Overdue { days: 1 }.label(), "Overdue by 1 day");
        assert_eq!(DueBucket::InDays(4).label(), "Due in 4 days");
        assert_eq!(DueBucket::NoDate.label(), "No due date");
    }
}
