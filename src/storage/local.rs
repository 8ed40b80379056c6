use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Result, TickbookError};

use super::KeyValueStore;

/// File-backed key-value storage with atomic writes.
///
/// Each key lives in `<dir>/storage/<key>.json`; writes go to a temp file
/// first and are renamed into place.
pub struct LocalStorage {
    main_app_dir: PathBuf,
    storage_dir: PathBuf,
    temp_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(tickbook_dir: &Path) -> Result<Self> {
        let main_app_dir = tickbook_dir.to_path_buf();
        let storage_dir = main_app_dir.join("storage");
        let temp_dir = main_app_dir.join(".temp");

        let storage = Self {
            main_app_dir,
            storage_dir,
            temp_dir,
        };

        storage.ensure_directories()?;

        Ok(storage)
    }

    pub fn directory(&self) -> &Path {
        &self.main_app_dir
    }

    fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.storage_dir)?;
        fs::create_dir_all(&self.temp_dir)?;

        self.clean_temp_dir()?;

        Ok(())
    }

    fn clean_temp_dir(&self) -> Result<()> {
        for entry in fs::read_dir(&self.temp_dir)? {
            let entry = entry?;
            fs::remove_file(entry.path())?;
        }
        Ok(())
    }

    fn item_file(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(TickbookError::InvalidKey(key.to_string()));
        }
        Ok(self.storage_dir.join(format!("{key}.json")))
    }

    fn get_temp_file(&self, key: &str) -> PathBuf {
        let random_string = Uuid::new_v4().simple().to_string()[..8].to_string();
        self.temp_dir
            .join(format!("{key}.TEMP-{random_string}.json"))
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let file = self.item_file(key)?;
        match fs::read_to_string(&file) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let file = self.item_file(key)?;
        let temp_file = self.get_temp_file(key);

        fs::write(&temp_file, value)?;
        fs::rename(&temp_file, &file)?;

        Ok(())
    }
}
