use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use tickbook::commands::{self, Action, Options};
use tickbook::logging;

const HELP_TEXT: &str = r#"
  Usage
    $ tk [<options> ...]

    Options
        none             Display all tasks
      --begin, -b        Start/pause task
      --check, -c        Check/uncheck task
      --clear            Delete all checked tasks
      --delete, -d       Delete task
      --description      Attach a description when creating or editing
      --due              Set or clear the due date of a task
      --edit, -e         Edit task
      --export, -x       Export all tasks to a JSON file
      --help, -h         Display help message
      --import, -i       Import tasks from a JSON file
      --list, -l         List tasks by attributes
      --move, -m         Move task to another position
      --priority, -p     Update priority of task
      --status, -s       Set the status of a task
      --task, -t         Create task
      --tickbook-dir     Define a custom tickbook directory
      --version, -V      Display installed version
      --yes, -y          Answer yes to confirmation prompts

    Task tokens
      due:YYYY-MM-DD | due:today | due:tomorrow | due:none
      p:0-5              Priority, 0 for none
      s:todo | s:progress | s:done

    Examples
      $ tk
      $ tk --task Review PR #42 due:tomorrow p:3
      $ tk --task Buy groceries --description "Milk, eggs, bread"
      $ tk --edit @3 Merge PR #42 s:progress
      $ tk --check 1 2
      $ tk --begin 2
      $ tk --status @1 done
      $ tk --priority @3 2
      $ tk --due @2 2026-12-31
      $ tk --move @4 1
      $ tk --delete 4
      $ tk --list active overdue
      $ tk --clear
      $ tk --import backup.json
      $ tk --export
"#;

#[derive(Parser)]
#[command(
    name = "tk",
    version = env!("CARGO_PKG_VERSION"),
    about = "A local to-do list for the command line",
    after_help = HELP_TEXT
)]
struct Cli {
    /// Input arguments (task title, selectors, filters, file paths, etc.)
    input: Vec<String>,

    /// Start/pause task
    #[arg(short = 'b', long)]
    begin: bool,

    /// Check/uncheck task
    #[arg(short = 'c', long)]
    check: bool,

    /// Delete all checked tasks
    #[arg(long)]
    clear: bool,

    /// Delete task
    #[arg(short = 'd', long)]
    delete: bool,

    /// Description for a created or edited task
    #[arg(long, value_name = "TEXT")]
    description: Option<String>,

    /// Set or clear the due date of a task
    #[arg(long)]
    due: bool,

    /// Edit task
    #[arg(short = 'e', long)]
    edit: bool,

    /// Export all tasks to a JSON file
    #[arg(short = 'x', long)]
    export: bool,

    /// Import tasks from a JSON file
    #[arg(short = 'i', long)]
    import: bool,

    /// List tasks by attributes
    #[arg(short = 'l', long)]
    list: bool,

    /// Move task to another position
    #[arg(short = 'm', long)]
    r#move: bool,

    /// Update priority of task
    #[arg(short = 'p', long)]
    priority: bool,

    /// Set the status of a task
    #[arg(short = 's', long)]
    status: bool,

    /// Create task
    #[arg(short = 't', long)]
    task: bool,

    /// Define a custom tickbook directory
    #[arg(long = "tickbook-dir", value_name = "PATH")]
    tickbook_dir: Option<PathBuf>,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long)]
    yes: bool,
}

impl Cli {
    fn action(&self) -> Action {
        let flags = [
            (self.task, Action::Task),
            (self.edit, Action::Edit),
            (self.check, Action::Check),
            (self.begin, Action::Begin),
            (self.status, Action::Status),
            (self.priority, Action::Priority),
            (self.due, Action::Due),
            (self.r#move, Action::Move),
            (self.delete, Action::Delete),
            (self.clear, Action::Clear),
            (self.list, Action::List),
            (self.import, Action::Import),
            (self.export, Action::Export),
        ];
        flags
            .into_iter()
            .find_map(|(set, action)| set.then_some(action))
            .unwrap_or_default()
    }
}

fn main() {
    logging::init();

    let cli = Cli::parse();
    let action = cli.action();
    let options = Options {
        input: cli.input,
        description: cli.description,
        tickbook_dir: cli.tickbook_dir,
        assume_yes: cli.yes,
    };

    if let Err(e) = commands::run(action, options) {
        eprintln!("\n {} {}", "✖".red(), e);
        process::exit(1);
    }
}
