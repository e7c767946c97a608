//! Owner-only file permissions for persisted option files
//!
//! Stored settings routinely contain API keys, so the file-backed option store
//! keeps its directory at 0o700 and every option file at 0o600 on Unix.

use crate::error::{Error, Result};
use std::path::Path;

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .permissions();
    perms.set_mode(mode);

    fs::set_permissions(path, perms).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Restrict an option file to its owner (Unix: 0o600, no-op elsewhere)
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read or updated.
pub fn restrict_file(path: &Path) -> Result<()> {
    #[cfg(unix)]
    set_mode(path, 0o600)?;
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Create a directory (and parents) readable only by its owner (Unix: 0o700)
///
/// # Errors
///
/// Returns an error if the directory cannot be created or its permissions set.
pub fn ensure_private_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })?;

    #[cfg(unix)]
    set_mode(path, 0o700)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_restrict_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("options.json");
        fs::write(&file_path, "{}").unwrap();

        restrict_file(&file_path).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&file_path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_ensure_private_dir_creates_parents() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/options");

        ensure_private_dir(&nested).unwrap();
        assert!(nested.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&nested).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}
