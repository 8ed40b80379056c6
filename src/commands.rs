use std::path::PathBuf;

use crate::error::{Result, TickbookError};
use crate::input::ask_confirmation;
use crate::tickbook::Tickbook;

/// Which action a command-line invocation asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Display,
    List,
    Task,
    Edit,
    Check,
    Begin,
    Status,
    Priority,
    Due,
    Move,
    Delete,
    Clear,
    Import,
    Export,
}

/// Everything a single invocation carries besides the action.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub input: Vec<String>,
    pub description: Option<String>,
    pub tickbook_dir: Option<PathBuf>,
    pub assume_yes: bool,
}

fn confirm(assume_yes: bool, question: String) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    ask_confirmation(&question)
}

/// Execute CLI commands
pub fn run(action: Action, options: Options) -> Result<()> {
    let mut tickbook = Tickbook::open(options.tickbook_dir.as_deref())?;
    let input = &options.input;
    let yes = options.assume_yes;

    match action {
        Action::Display => {
            tickbook.display_tasks(&[])?;
            tickbook.display_stats();
        }
        Action::List => {
            tickbook.display_tasks(input)?;
            tickbook.display_stats();
        }
        Action::Task => {
            tickbook.create_task(input, options.description)?;
        }
        Action::Edit => {
            tickbook.edit_task(input, options.description)?;
        }
        Action::Check => tickbook.check_tasks(input)?,
        Action::Begin => tickbook.begin_tasks(input)?,
        Action::Status => tickbook.update_status(input)?,
        Action::Priority => tickbook.update_priority(input)?,
        Action::Due => tickbook.update_due_date(input)?,
        Action::Move => tickbook.move_task(input)?,
        Action::Delete => tickbook.delete_tasks(input)?,
        Action::Clear => {
            tickbook.clear(|count| confirm(yes, format!("Delete {count} completed task(s)?")))?;
        }
        Action::Import => {
            let Some(path) = input.first() else {
                return Err(TickbookError::General(
                    "No import file was given as input".to_string(),
                ));
            };
            tickbook.import(&PathBuf::from(path), |count| {
                confirm(yes, format!("Import {count} task(s)?"))
            })?;
        }
        Action::Export => {
            tickbook.export(input.first().map(PathBuf::from))?;
        }
    }

    Ok(())
}
