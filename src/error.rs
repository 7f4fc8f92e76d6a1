//! Application error types using thiserror
//!
//! Error hierarchy:
//! - SemVerError: Version strings that fail semantic-version validation
//! - RegistryError: Issues with mod registry communication
//! - ModError: Local archive, manifest and file move/delete failures
//! - ResolveError: Registry data that cannot be resolved into a decision
//! - ConfigError: Issues with CLI / settings configuration
//! - SelfUpdateError: Replacing the running executable
//! - Output: stdout / stderr write failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Version parsing errors
    #[error(transparent)]
    SemVer(#[from] SemVerError),

    /// Mod registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Local mod archive errors
    #[error(transparent)]
    Mod(#[from] ModError),

    /// Resolution errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Self-update errors
    #[error(transparent)]
    SelfUpdate(#[from] SelfUpdateError),

    /// Writing status output failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// A version string that is not a valid semantic version
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid semantic version '{raw}'")]
pub struct SemVerError {
    pub raw: String,
}

impl SemVerError {
    /// Creates a new SemVerError
    pub fn new(raw: impl Into<String>) -> Self {
        SemVerError { raw: raw.into() }
    }
}

/// Errors related to mod registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Mod not found in registry
    #[error("mod '{mod_id}' not found in registry")]
    ModNotFound { mod_id: String },

    /// Network request failed
    #[error("failed to fetch '{mod_id}': {message}")]
    NetworkError { mod_id: String, message: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded while fetching '{mod_id}'")]
    RateLimitExceeded { mod_id: String },

    /// Invalid response from registry
    #[error("invalid response for '{mod_id}': {message}")]
    InvalidResponse { mod_id: String, message: String },

    /// Timeout
    #[error("timeout while fetching '{mod_id}'")]
    Timeout { mod_id: String },

    /// Release download failed
    #[error("failed to download {url}: {message}")]
    DownloadFailed { url: String, message: String },
}

/// Errors related to local mod archives and files
#[derive(Error, Debug)]
pub enum ModError {
    /// Mod directory could not be read
    #[error("failed to read mod directory {path}: {source}")]
    ScanDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be opened
    #[error("failed to open archive {path}: {message}")]
    ArchiveOpen { path: PathBuf, message: String },

    /// Archive member could not be read
    #[error("failed to read archive {path}: {message}")]
    ArchiveRead { path: PathBuf, message: String },

    /// Archive has no modinfo.json
    #[error("no modinfo.json found in {path}")]
    ManifestMissing { path: PathBuf },

    /// modinfo.json could not be decoded
    #[error("failed to parse modinfo.json in {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Moving the archive into the backup directory failed
    #[error("failed to back up {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving a backup back into place failed
    #[error("failed to restore {path}: {source}")]
    Restore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deleting an archive failed
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a downloaded archive failed
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced while resolving fetched releases
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Registry returned no usable release for an existing mod
    #[error("no release found for {mod_id}")]
    NoReleases { mod_id: String },

    /// Requested version does not exist in the registry
    #[error("no release {version} found for {mod_id}")]
    VersionNotFound { mod_id: String, version: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },

    /// Settings file could not be read
    #[error("failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML
    #[error("failed to parse settings file {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    /// Import file could not be read
    #[error("failed to read import file {path}: {source}")]
    ImportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Import line is not `modID@version`
    #[error("invalid import line '{line}': expected modID@version")]
    InvalidImportLine { line: String },

    /// User configuration directory is unknown
    #[error("could not determine the user configuration directory")]
    NoConfigDir,
}

/// Errors while replacing the running executable
#[derive(Error, Debug)]
pub enum SelfUpdateError {
    /// Path of the running executable is unknown
    #[error("failed to locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    /// Release archive has no entry for this platform
    #[error("release archive has no executable for this platform")]
    NoExecutable,

    /// Release archive could not be unpacked
    #[error("failed to extract the new executable: {message}")]
    Extract { message: String },

    /// Copy of the running executable could not be made
    #[error("failed to back up the running executable to {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Running executable could not be replaced
    #[error("failed to replace the running executable: {0}")]
    Replace(#[source] std::io::Error),

    /// New executable did not pass `--help`
    #[error("new executable failed its self-test: {message}")]
    Verify { message: String },
}

impl RegistryError {
    /// Creates a new ModNotFound error
    pub fn mod_not_found(mod_id: impl Into<String>) -> Self {
        RegistryError::ModNotFound {
            mod_id: mod_id.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(mod_id: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::NetworkError {
            mod_id: mod_id.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(mod_id: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::InvalidResponse {
            mod_id: mod_id.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(mod_id: impl Into<String>) -> Self {
        RegistryError::Timeout {
            mod_id: mod_id.into(),
        }
    }

    /// Creates a new DownloadFailed error
    pub fn download_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::DownloadFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Returns true for transport-level failures (network, timeout, rate limit)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RegistryError::NetworkError { .. }
                | RegistryError::Timeout { .. }
                | RegistryError::RateLimitExceeded { .. }
                | RegistryError::DownloadFailed { .. }
        )
    }
}

impl ModError {
    /// Creates a new ArchiveOpen error
    pub fn archive_open(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ModError::ArchiveOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new ArchiveRead error
    pub fn archive_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ModError::ArchiveRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new ManifestMissing error
    pub fn manifest_missing(path: impl Into<PathBuf>) -> Self {
        ModError::ManifestMissing { path: path.into() }
    }

    /// Creates a new ManifestParse error
    pub fn manifest_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ModError::ManifestParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new InvalidPath error
    pub fn invalid_path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidImportLine error
    pub fn invalid_import_line(line: impl Into<String>) -> Self {
        ConfigError::InvalidImportLine { line: line.into() }
    }
}
