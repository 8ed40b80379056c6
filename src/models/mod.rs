mod task;
pub mod timestamp;

pub use task::{short_id, DueDate, Status, Task, MAX_PRIORITY, NO_DUE_DATE, PRIORITY_UNSET};
