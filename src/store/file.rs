//! File-backed option store: one JSON file per option

use super::OptionStore;
use crate::error::{Error, Result};
use crate::security::{ensure_private_dir, restrict_file};
use log::{debug, warn};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Option store persisting each option as `<dir>/<name>.json`
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) an option directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            ensure_private_dir(&dir)?;
        }
        Ok(Self { dir })
    }

    /// Directory holding the option files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn option_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(Error::Config(format!("Invalid option name '{name}'")));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }
}

/// Parse an option file; a missing file is `None`
fn read_json(path: &Path) -> Result<Option<Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::FileRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write pretty JSON to `<file>.tmp`, then rename it over `path`
fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;

    let mut temp_path = path.as_os_str().to_os_string();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    std::fs::write(&temp_path, content).map_err(|e| Error::FileWrite {
        path: temp_path.clone(),
        source: e,
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

impl OptionStore for FileStore {
    fn get_option(&self, name: &str) -> Result<Option<Value>> {
        read_json(&self.option_path(name)?)
    }

    fn update_option(&self, name: &str, value: &Value) -> Result<()> {
        let path = self.option_path(name)?;
        write_json_atomic(&path, value)?;
        if let Err(e) = restrict_file(&path) {
            warn!("Could not restrict permissions on {}: {e}", path.display());
        }
        debug!("Wrote option file {}", path.display());
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<()> {
        let path = self.option_path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::FileDelete { path, source: e }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
