//! Release metadata published by the mod registry

use super::SemVer;
use chrono::NaiveDateTime;
use serde::Serialize;

/// A single downloadable release of a mod
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Release {
    /// Registry release identifier
    pub release_id: u64,
    /// URL of the release archive
    pub download_url: String,
    /// File name the archive should be stored under
    pub filename: String,
    /// Release version
    pub version: SemVer,
    /// Game versions this release declares support for
    pub supported_game_versions: Vec<SemVer>,
    /// When the release was published, if the registry said so
    pub created: Option<NaiveDateTime>,
}

impl Release {
    /// Creates a new Release
    pub fn new(
        release_id: u64,
        download_url: impl Into<String>,
        filename: impl Into<String>,
        version: SemVer,
    ) -> Self {
        Self {
            release_id,
            download_url: download_url.into(),
            filename: filename.into(),
            version,
            supported_game_versions: Vec::new(),
            created: None,
        }
    }

    /// Sets the supported game versions
    pub fn with_game_versions(mut self, versions: Vec<SemVer>) -> Self {
        self.supported_game_versions = versions;
        self
    }

    /// Sets the publication time
    pub fn with_created(mut self, created: Option<NaiveDateTime>) -> Self {
        self.created = created;
        self
    }

    /// Returns true if the release lists the given game version
    pub fn supports_game_version(&self, game: &SemVer) -> bool {
        self.supported_game_versions.iter().any(|v| v == game)
    }
}
