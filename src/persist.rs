// Whole-file JSON snapshots: read, atomic replace (temp file + rename), corrupt-file backup.

use crate::error::PersistenceError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Read and decode `path`. `Ok(None)` when the file is missing or blank.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| PersistenceError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Serialize `value` and replace `path` with it. Readers never observe a partial file.
pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), PersistenceError> {
    let encoded = (if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    })
    .map_err(|source| PersistenceError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = tmp_path(path);
    std::fs::write(&tmp, encoded).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}

/// Copy a corrupt file to `<file>.bak`. Best effort: failure is logged only.
pub fn backup_corrupt(path: &Path) -> Option<PathBuf> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    match std::fs::copy(path, &backup) {
        Ok(_) => {
            tracing::info!(backup = %backup.display(), "corrupt file backed up");
            Some(backup)
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "failed to back up corrupt file");
            None
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
