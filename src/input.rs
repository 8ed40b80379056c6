//! Command-line word parsing: task payloads, due tokens and task selectors.

use std::io::{self, BufRead, Write};

use chrono::{Duration, NaiveDate};

use crate::error::{Result, TickbookError};
use crate::models::{DueDate, Status, Task, MAX_PRIORITY};

/// Fields gathered from the free-form words after `--task` or `--edit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskWords {
    pub title: String,
    pub due_date: Option<DueDate>,
    pub priority: Option<u8>,
    pub status: Option<Status>,
}

/// Split input words into a title plus optional `due:`, `p:` and `s:` tokens.
///
/// A later token of the same kind overrides an earlier one.
pub fn parse_task_words(words: &[String], today: NaiveDate) -> Result<TaskWords> {
    let mut parsed = TaskWords::default();
    let mut title = Vec::new();

    for word in words {
        if let Some(raw) = word.strip_prefix("due:") {
            parsed.due_date = Some(parse_due_value(raw, today)?);
        } else if let Some(raw) = word.strip_prefix("p:") {
            parsed.priority = Some(parse_priority(raw)?);
        } else if let Some(raw) = word.strip_prefix("s:") {
            parsed.status = Some(parse_status(raw)?);
        } else {
            title.push(word.as_str());
        }
    }

    parsed.title = title.join(" ").trim().to_string();
    Ok(parsed)
}

/// `YYYY-MM-DD`, `today`, `tomorrow`, or `none` / empty for no due date.
pub fn parse_due_value(raw: &str, today: NaiveDate) -> Result<DueDate> {
    let raw = raw.trim();
    match raw.to_lowercase().as_str() {
        "" | "none" | "clear" => Ok(DueDate::Unset),
        "today" => Ok(DueDate::on_day(today)),
        "tomorrow" => Ok(DueDate::on_day(today + Duration::days(1))),
        _ => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(DueDate::on_day)
            .map_err(|_| TickbookError::InvalidDueDate(raw.to_string())),
    }
}

pub fn parse_priority(raw: &str) -> Result<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|level| *level <= MAX_PRIORITY)
        .ok_or_else(|| TickbookError::InvalidPriority(raw.trim().to_string()))
}

pub fn parse_status(raw: &str) -> Result<Status> {
    Status::parse(raw).ok_or_else(|| TickbookError::InvalidStatus(raw.trim().to_string()))
}

/// Resolve a selector to a task id.
///
/// A selector is a 1-based list position or a prefix of a task id, with an
/// optional leading `@`. A bare number is read as a position first.
pub fn resolve_selector(tasks: &[Task], selector: &str) -> Result<String> {
    let key = selector.trim().trim_start_matches('@');
    if key.is_empty() {
        return Err(TickbookError::UnknownTask(selector.to_string()));
    }

    if let Ok(position) = key.parse::<usize>() {
        if let Some(task) = position.checked_sub(1).and_then(|idx| tasks.get(idx)) {
            return Ok(task.id.clone());
        }
    }

    let mut matches = tasks.iter().filter(|t| t.id.starts_with(key));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id.clone()),
        (Some(_), Some(_)) => {
            if let Some(exact) = tasks.iter().find(|t| t.id == key) {
                return Ok(exact.id.clone());
            }
            Err(TickbookError::AmbiguousSelector(key.to_string()))
        }
        (None, _) => Err(TickbookError::UnknownTask(key.to_string())),
    }
}

/// Resolve several selectors, dropping repeats while keeping the given order.
pub fn resolve_selectors(tasks: &[Task], selectors: &[String]) -> Result<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(selectors.len());
    for selector in selectors {
        let id = resolve_selector(tasks, selector)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Split off the single `@` target of commands such as `--edit @2 New title`.
pub fn split_target(input: &[String]) -> Option<(&str, Vec<String>)> {
    let mut targets = input.iter().filter(|w| w.starts_with('@') && w.len() > 1);
    let target = targets.next()?;
    if targets.next().is_some() {
        return None;
    }
    let rest = input
        .iter()
        .filter(|w| *w != target)
        .cloned()
        .collect();
    Some((target.as_str(), rest))
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
pub fn ask_confirmation(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    confirm_with(question, &mut stdin.lock(), &mut stdout)
}

fn confirm_with<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "\n  {question} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::create_task;
    use serde_json::json;

    fn words(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(String::from).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![
            create_task(&json!({ "id": "abc123", "title": "A" })),
            create_task(&json!({ "id": "abd456", "title": "B" })),
            create_task(&json!({ "id": "9f00", "title": "C" })),
        ]
    }

    #[test]
    fn test_parse_task_words() {
        let parsed = parse_task_words(&words("Write report due:2026-04-01 p:3"), today()).unwrap();
        assert_eq!(parsed.title, "Write report");
        assert_eq!(parsed.due_date, Some(DueDate::from_raw("2026-04-01")));
        assert_eq!(parsed.priority, Some(3));
        assert_eq!(parsed.status, None);

        let parsed = parse_task_words(&words("Draft s:progress"), today()).unwrap();
        assert_eq!(parsed.title, "Draft");
        assert_eq!(parsed.status, Some(Status::InProgress));
    }

    #[test]
    fn test_parse_task_words_relative_dates() {
        let parsed = parse_task_words(&words("Call due:tomorrow"), today()).unwrap();
        assert_eq!(parsed.due_date, Some(DueDate::from_raw("2026-03-11")));

        let parsed = parse_task_words(&words("Call due:none"), today()).unwrap();
        assert_eq!(parsed.due_date, Some(DueDate::Unset));

        let parsed = parse_task_words(&words("Just a title"), today()).unwrap();
        assert_eq!(parsed.due_date, None);
        assert_eq!(parsed.priority, None);
    }

    #[test]
    fn test_parse_task_words_rejects_bad_tokens() {
        assert!(matches!(
            parse_task_words(&words("x due:someday"), today()),
            Err(TickbookError::InvalidDueDate(_))
        ));
        assert!(matches!(
            parse_task_words(&words("x p:9"), today()),
            Err(TickbookError::InvalidPriority(_))
        ));
        assert!(matches!(
            parse_task_words(&words("x s:blocked"), today()),
            Err(TickbookError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_resolve_selector_by_position_and_prefix() {
        let tasks = tasks();
        assert_eq!(resolve_selector(&tasks, "1").unwrap(), "abc123");
        assert_eq!(resolve_selector(&tasks, "@3").unwrap(), "9f00");
        assert_eq!(resolve_selector(&tasks, "abd").unwrap(), "abd456");
        assert_eq!(resolve_selector(&tasks, "@9f").unwrap(), "9f00");
    }

    #[test]
    fn test_resolve_selector_errors() {
        let tasks = tasks();
        assert!(matches!(
            resolve_selector(&tasks, "ab"),
            Err(TickbookError::AmbiguousSelector(_))
        ));
        assert!(matches!(
            resolve_selector(&tasks, "zzz"),
            Err(TickbookError::UnknownTask(_))
        ));
        assert!(matches!(
            resolve_selector(&tasks, "0"),
            Err(TickbookError::UnknownTask(_))
        ));
        assert!(matches!(
            resolve_selector(&tasks, "@"),
            Err(TickbookError::UnknownTask(_))
        ));
    }

    #[test]
    fn test_resolve_selectors_dedupes() {
        let tasks = tasks();
        let ids = resolve_selectors(&tasks, &words("2 abd 1")).unwrap();
        assert_eq!(ids, vec!["abd456", "abc123"]);
    }

    #[test]
    fn test_split_target() {
        let input = words("@2 New title p:1");
        let (target, rest) = split_target(&input).unwrap();
        assert_eq!(target, "@2");
        assert_eq!(rest, words("New title p:1"));

        assert!(split_target(&words("no target")).is_none());
        assert!(split_target(&words("@1 @2 both")).is_none());
    }

    #[test]
    fn test_confirm_with() {
        let mut out = Vec::new();
        assert!(confirm_with("Go?", &mut "yes\n".as_bytes(), &mut out).unwrap());
        assert!(!confirm_with("Go?", &mut "\n".as_bytes(), &mut out).unwrap());
        assert!(!confirm_with("Go?", &mut "nope\n".as_bytes(), &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("Go? [y/N]"));
    }
}
