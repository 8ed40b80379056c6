pub mod commands;
pub mod config;
pub mod directory;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod persistence;
pub mod render;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tickbook;
pub mod transfer;

pub use error::{Result, TickbookError};
pub use models::{DueDate, Status, Task};
pub use store::TaskStore;
pub use tickbook::Tickbook;
