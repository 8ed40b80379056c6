use thiserror::Error;

#[derive(Error, Debug)]
pub enum TickbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Title is required")]
    EmptyTitle,

    #[error("Priority can only be a level from 0 to 5, got: {0}")]
    InvalidPriority(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    #[error("Due date must not be in the past: {0}")]
    PastDueDate(String),

    #[error("Unknown status: {0}")]
    InvalidStatus(String),

    #[error("Import file is not valid JSON: {0}")]
    ImportParse(serde_json::Error),

    #[error("Import file must contain a list of tasks")]
    ImportNotAList,

    #[error("No valid tasks found to import")]
    NothingToImport,

    #[error("Only JSON files are supported: {0}")]
    UnsupportedImportFile(String),

    #[error("Unable to find task: {0}")]
    UnknownTask(String),

    #[error("More than one task matches: {0}")]
    AmbiguousSelector(String),

    #[error("No task was given as input")]
    MissingTarget,

    #[error("Exactly one @task target is required, got: {0}")]
    TooManyTargets(String),

    #[error("Nothing to change was given as input")]
    NothingToEdit,

    #[error("Invalid custom directory: {0}")]
    InvalidDirectory(String),

    #[error("Missing tickbook-dir flag value")]
    MissingTickbookDirValue,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, TickbookError>;
