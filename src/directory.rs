use std::env;
use std::path::{Path, PathBuf};

use crate::config::{expand_home, home_dir, Config};
use crate::error::{Result, TickbookError};

const TICKBOOK_DIR_NAME: &str = ".tickbook";
const TICKBOOK_DIR_ENV: &str = "TICKBOOK_DIR";

/// Resolve the tickbook directory with priority:
/// 1. --tickbook-dir CLI flag (highest)
/// 2. TICKBOOK_DIR environment variable
/// 3. Config file tickbookDirectory
/// 4. Default ~/.tickbook/ (lowest)
pub fn resolve_tickbook_directory(cli_dir: Option<&Path>, config: &Config) -> Result<PathBuf> {
    let env_dir = env::var(TICKBOOK_DIR_ENV).ok();
    let candidate = select_candidate(cli_dir, env_dir.as_deref(), config)?;

    match candidate {
        Some(candidate) => resolve_custom_directory(&candidate),
        None => Ok(home_dir()?.join(TICKBOOK_DIR_NAME)),
    }
}

fn select_candidate(
    cli_dir: Option<&Path>,
    env_dir: Option<&str>,
    config: &Config,
) -> Result<Option<String>> {
    if let Some(dir) = cli_dir {
        let dir = dir.to_string_lossy().to_string();
        if dir.trim().is_empty() {
            return Err(TickbookError::MissingTickbookDirValue);
        }
        return Ok(Some(dir));
    }

    if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
        return Ok(Some(dir.to_string()));
    }

    // The default "~" means "use ~/.tickbook", not a custom location.
    let config_dir = config.tickbook_directory.trim();
    let is_home = config_dir == "~"
        || dirs::home_dir().is_some_and(|home| Path::new(config_dir) == home);
    if !config_dir.is_empty() && !is_home {
        return Ok(Some(config_dir.to_string()));
    }

    Ok(None)
}

/// A candidate naming a `.tickbook` directory is used as is; any other path
/// gets `.tickbook` appended. Either way the parent must already exist.
fn resolve_custom_directory(candidate: &str) -> Result<PathBuf> {
    let expanded = expand_home(candidate);
    let resolved = expanded.canonicalize().unwrap_or(expanded);

    if resolved.file_name().is_some_and(|name| name == TICKBOOK_DIR_NAME) {
        let parent = resolved.parent().ok_or_else(|| {
            TickbookError::InvalidDirectory(format!("{candidate}: path has no parent"))
        })?;
        assert_directory_exists(parent, candidate)?;
        return Ok(resolved);
    }

    assert_directory_exists(&resolved, candidate)?;
    Ok(resolved.join(TICKBOOK_DIR_NAME))
}

fn assert_directory_exists(directory: &Path, display_path: &str) -> Result<()> {
    if directory.is_dir() {
        return Ok(());
    }
    Err(TickbookError::InvalidDirectory(display_path.to_string()))
}
