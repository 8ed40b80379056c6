use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{Result, TickbookError};

const CONFIG_FILE_NAME: &str = ".tickbook.json";

/// Configuration settings for tickbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_tickbook_directory")]
    pub tickbook_directory: String,

    #[serde(default = "default_true")]
    pub display_complete_tasks: bool,

    #[serde(default = "default_true")]
    pub display_progress_overview: bool,

    #[serde(default = "default_true")]
    pub display_descriptions: bool,
}

fn default_tickbook_directory() -> String {
    "~".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tickbook_directory: default_tickbook_directory(),
            display_complete_tasks: true,
            display_progress_overview: true,
            display_descriptions: true,
        }
    }
}

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| TickbookError::General("could not find home directory".to_string()))
}

/// Expand a leading `~` to the home directory.
pub(crate) fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            let rest = rest.trim_start_matches('/');
            return if rest.is_empty() { home } else { home.join(rest) };
        }
    }
    PathBuf::from(path)
}

impl Config {
    /// Get the config file path (~/.tickbook.json)
    fn config_file_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Ensure the config file exists, creating it with defaults if not
    fn ensure_config_file(path: &PathBuf) -> Result<()> {
        if !path.exists() {
            let data = serde_json::to_string_pretty(&Config::default())?;
            fs::write(path, data)?;
        }
        Ok(())
    }

    /// Load configuration from file, merging with defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::ensure_config_file(&path)?;
        Self::from_json(&fs::read_to_string(&path)?)
    }

    /// Like [`Config::load`], but a missing or broken file yields the defaults.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not read config, using defaults");
            Self::default()
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
