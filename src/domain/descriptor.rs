//! Local mod descriptor
//!
//! One descriptor is created per mod archive found in the mod directory.
//! Broken archives still produce a descriptor, with `parse_error` set, so
//! they can be reported alongside healthy mods.

use super::{AppSide, ModInfo, ModType, SemVer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Parsed local representation of one mod archive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModDescriptor {
    /// Path to the archive
    pub path: PathBuf,
    /// Display name
    pub name: String,
    /// Registry id; empty means the mod cannot be looked up
    pub mod_id: String,
    /// Installed version
    pub installed_version: SemVer,
    /// Dependency name to version constraint (`game` is the game itself)
    pub dependencies: BTreeMap<String, String>,
    pub description: String,
    pub authors: Vec<String>,
    pub mod_type: Option<ModType>,
    pub side: AppSide,
    /// Why the archive could not be understood
    pub parse_error: Option<String>,
}

impl ModDescriptor {
    /// Build a descriptor from a decoded manifest.
    /// An unparseable version marks the descriptor as broken.
    pub fn from_info(path: impl Into<PathBuf>, info: ModInfo) -> Self {
        let (installed_version, parse_error) = match SemVer::parse(&info.version) {
            Ok(v) => (v, None),
            Err(e) => (SemVer::zero(), Some(e.to_string())),
        };

        Self {
            path: path.into(),
            name: info.name,
            mod_id: info.modid.trim().to_string(),
            installed_version,
            dependencies: info.dependencies,
            description: info.description,
            authors: info.authors,
            mod_type: info.mod_type,
            side: info.side,
            parse_error,
        }
    }

    /// Descriptor for an archive that could not be read
    pub fn broken(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: String::new(),
            mod_id: String::new(),
            installed_version: SemVer::zero(),
            dependencies: BTreeMap::new(),
            description: String::new(),
            authors: Vec::new(),
            mod_type: None,
            side: AppSide::default(),
            parse_error: Some(error.into()),
        }
    }

    /// Minimal descriptor, mostly for self-update and tests
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        mod_id: impl Into<String>,
        installed_version: SemVer,
    ) -> Self {
        Self {
            name: name.into(),
            mod_id: mod_id.into(),
            installed_version,
            parse_error: None,
            ..Self::broken(path, "")
        }
    }

    /// Pre-release updates are allowed when a pre-release is already installed
    pub fn pre_release_allowed(&self) -> bool {
        self.installed_version.is_prerelease()
    }

    /// Returns true if the mod has a registry id
    pub fn has_mod_id(&self) -> bool {
        !self.mod_id.is_empty()
    }

    /// Returns true if the archive could not be parsed
    pub fn is_broken(&self) -> bool {
        self.parse_error.is_some()
    }

    /// Archive file name
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Game version constraint, `*` rendered as `any`
    pub fn game_version(&self) -> Option<&str> {
        self.dependencies
            .get("game")
            .map(|v| if v == "*" { "any" } else { v.as_str() })
    }

    /// Multi-line block used by the list mode
    pub fn details(&self) -> String {
        if let Some(err) = &self.parse_error {
            return format!("File:\t\t{}\nError:\t\t{}", self.file_name(), err);
        }

        let mut lines = vec![
            format!("Name:\t\t{}", self.name),
            format!("ModID:\t\t{}", self.mod_id),
            format!("Version:\t{}", self.installed_version),
        ];
        if let Some(game) = self.game_version() {
            lines.push(format!("Game Version:\t{}", game));
        }
        lines.push(format!("Authors:\t{}", self.authors.join(", ")));
        lines.push(format!("Description:\t{}", self.description));
        lines.join("\n")
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl fmt::Display for ModDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            return write!(f, "{}", file_stem(&self.path));
        }
        if !self.installed_version.is_valid() {
            return write!(f, "{}", self.name);
        }
        write!(f, "{}@{}", self.name, self.installed_version)
    }
}
