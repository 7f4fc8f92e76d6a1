//! Archive file operations used while applying an update
//!
//! Ordering is enforced by the orchestrator: the old archive is moved into
//! the backup directory before the new one is written (the filenames may
//! collide), and the backup copy is only deleted after a successful download.

use crate::error::ModError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Move an archive into `backup_dir`, returning the new location.
///
/// Calling this again after a successful move is a no-op.
pub fn backup_archive(path: &Path, backup_dir: &Path) -> Result<PathBuf, ModError> {
    let backup_err = |source| ModError::Backup {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path.file_name().ok_or_else(|| {
        backup_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "archive path has no file name",
        ))
    })?;
    let target = backup_dir.join(file_name);

    if !path.exists() && target.exists() {
        debug!(target = %target.display(), "archive already backed up");
        return Ok(target);
    }

    std::fs::create_dir_all(backup_dir).map_err(backup_err)?;
    move_file(path, &target).map_err(backup_err)?;
    debug!(from = %path.display(), to = %target.display(), "archive backed up");
    Ok(target)
}

/// Move a backup back to its original location
pub fn restore_archive(backup: &Path, original: &Path) -> Result<(), ModError> {
    move_file(backup, original).map_err(|source| ModError::Restore {
        path: original.to_path_buf(),
        source,
    })
}

/// Delete an archive
pub fn remove_archive(path: &Path) -> Result<(), ModError> {
    std::fs::remove_file(path).map_err(|source| ModError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

/// Path a downloaded archive is written to.
///
/// Only the final component of the registry-supplied filename is used.
pub fn archive_target(dir: &Path, filename: &str) -> Result<PathBuf, ModError> {
    Path::new(filename)
        .file_name()
        .filter(|name| !name.is_empty())
        .map(|name| dir.join(name))
        .ok_or_else(|| ModError::Write {
            path: dir.join(filename),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid archive filename '{}'", filename),
            ),
        })
}

/// Rename, falling back to copy + delete across filesystems
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if !from.exists() {
                return Err(rename_err);
            }
            std::fs::copy(from, to).map_err(|_| rename_err)?;
            std::fs::remove_file(from)
        }
    }
}
