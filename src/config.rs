//! Run configuration
//!
//! CLI flags take precedence over the TOML settings file, which takes
//! precedence over built-in defaults. The resulting `RunConfig` is immutable
//! and handed to the orchestrator at construction.

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::registry::DEFAULT_TIMEOUT;
use crate::update::PreReleasePolicy;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Game data directory name under the user configuration directory
const DATA_DIR_NAME: &str = "VintagestoryData";

/// Settings file name inside the game data directory
pub const SETTINGS_FILE_NAME: &str = "vsmodup.toml";

/// Contents of the optional settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub mod_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
    pub backup: Option<bool>,
    pub pre_release: Option<bool>,
    pub interactive: Option<bool>,
    pub ignore: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

impl FileSettings {
    /// Load a settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// `<user config dir>/VintagestoryData`
pub fn game_data_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(DATA_DIR_NAME))
}

/// Immutable configuration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory holding the installed mod archives
    pub mod_path: PathBuf,
    /// Directory old archives are moved to
    pub backup_path: PathBuf,
    /// Keep old archives in `backup_path` instead of deleting them
    pub backup: bool,
    pub dry_run: bool,
    /// Ask before each update
    pub interactive: bool,
    pub pre_release: PreReleasePolicy,
    /// Registry request timeout
    pub timeout: Duration,
    ignore: BTreeSet<String>,
}

impl RunConfig {
    /// Build the configuration for `args`, reading the settings file if any
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let data_dir = game_data_dir();

        let settings = match (&args.config, &data_dir) {
            (Some(path), _) => FileSettings::load(path)?,
            (None, Some(dir)) if dir.join(SETTINGS_FILE_NAME).is_file() => {
                FileSettings::load(&dir.join(SETTINGS_FILE_NAME))?
            }
            _ => FileSettings::default(),
        };

        Self::resolve(args, settings, data_dir.as_deref())
    }

    /// Layer CLI flags over settings over defaults
    pub fn resolve(
        args: &CliArgs,
        settings: FileSettings,
        data_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let default_path = |name: &str| {
            data_dir
                .map(|dir| dir.join(name))
                .ok_or(ConfigError::NoConfigDir)
        };

        let mod_path = match args.mod_path.clone().or(settings.mod_path) {
            Some(path) => path,
            None => default_path("Mods")?,
        };
        let backup_path = match args.backup_path.clone().or(settings.backup_path) {
            Some(path) => path,
            None => default_path("ModBackups")?,
        };

        if mod_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_path(&mod_path, "mod path is empty"));
        }
        if backup_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_path(&backup_path, "backup path is empty"));
        }

        let ignore_list = if args.ignore.is_empty() {
            settings.ignore.unwrap_or_default()
        } else {
            args.ignore.clone()
        };
        let ignore = ignore_list
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        let timeout = args
            .timeout
            .or(settings.timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let config = Self {
            mod_path,
            backup_path,
            backup: args.backup.or(settings.backup).unwrap_or(false),
            dry_run: args.dry_run,
            interactive: args
                .interactive
                .or(settings.interactive)
                .unwrap_or(cfg!(windows)),
            pre_release: PreReleasePolicy::from_flag(
                args.pre_release.or(settings.pre_release).unwrap_or(false),
            ),
            timeout,
            ignore,
        };
        debug!(?config, "resolved run configuration");
        Ok(config)
    }

    /// Returns true if the mod id is in the ignore set
    pub fn is_ignored(&self, mod_id: &str) -> bool {
        self.ignore.contains(mod_id)
    }

    /// Ignored mod ids in sorted order
    pub fn ignored(&self) -> impl Iterator<Item = &str> {
        self.ignore.iter().map(String::as_str)
    }

    /// Default configuration rooted at `mod_path`, for tests and embedding
    pub fn for_mod_path(mod_path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            mod_path: mod_path.into(),
            backup_path: backup_path.into(),
            backup: false,
            dry_run: false,
            interactive: false,
            pre_release: PreReleasePolicy::InstalledOnly,
            timeout: DEFAULT_TIMEOUT,
            ignore: BTreeSet::new(),
        }
    }

    /// Copy of this configuration with a different ignore set
    pub fn with_ignore<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = ids.into_iter().map(Into::into).collect();
        self
    }
}
