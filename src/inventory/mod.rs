//! Local mod inventory
//!
//! This module provides:
//! - Mod directory scanning (`*.zip` files directly inside the directory)
//! - `modinfo.json` extraction and lenient decoding
//! - Archive backup / restore / removal used while applying updates

mod files;
pub mod lenient;

pub use files::{backup_archive, remove_archive, restore_archive, archive_target};

use crate::domain::{ModDescriptor, ModInfo};
use crate::error::ModError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the manifest member inside a mod archive
pub const MANIFEST_NAME: &str = "modinfo.json";

/// Scan a mod directory.
///
/// Broken archives are returned as descriptors with `parse_error` set.
/// Only failing to read the directory itself is an error.
pub fn scan_mod_dir(dir: &Path) -> Result<Vec<ModDescriptor>, ModError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ModError::ScanDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut archives: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ModError::ScanDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_zip(&path) {
            archives.push(path);
        }
    }
    archives.sort();

    let descriptors = archives
        .into_iter()
        .map(|path| match read_descriptor(&path) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable mod archive");
                ModDescriptor::broken(path, e.to_string())
            }
        })
        .collect::<Vec<_>>();

    debug!(dir = %dir.display(), count = descriptors.len(), "scanned mod directory");
    Ok(descriptors)
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Read the descriptor of one mod archive
pub fn read_descriptor(path: &Path) -> Result<ModDescriptor, ModError> {
    let raw = read_manifest(path)?;
    let info: ModInfo =
        lenient::decode(&raw).map_err(|e| ModError::manifest_parse(path, e.to_string()))?;
    Ok(ModDescriptor::from_info(path, info))
}

fn read_manifest(path: &Path) -> Result<String, ModError> {
    let file = File::open(path).map_err(|e| ModError::archive_open(path, e.to_string()))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ModError::archive_open(path, e.to_string()))?;

    let mut member = match archive.by_name(MANIFEST_NAME) {
        Ok(member) => member,
        Err(zip::result::ZipError::FileNotFound) => return Err(ModError::manifest_missing(path)),
        Err(e) => return Err(ModError::archive_read(path, e.to_string())),
    };

    let mut bytes = Vec::new();
    member
        .read_to_end(&mut bytes)
        .map_err(|e| ModError::archive_read(path, e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
