//! CLI argument parsing module for vsmodup

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Vintage Story mod updater
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "vsmodup",
    about = "Vintage Story mod updater",
    disable_version_flag = true,
    group(
        ArgGroup::new("mode")
            .args(["print_version", "self_update", "list", "import", "export"])
            .multiple(false)
    )
)]
pub struct CliArgs {
    // Paths
    /// Mod directory (default: <config dir>/VintagestoryData/Mods)
    #[arg(long, value_name = "DIR")]
    pub mod_path: Option<PathBuf>,

    /// Backup directory (default: <config dir>/VintagestoryData/ModBackups)
    #[arg(long, value_name = "DIR")]
    pub backup_path: Option<PathBuf>,

    /// Settings file (default: <config dir>/VintagestoryData/vsmodup.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // Update behaviour
    /// Keep old versions in the backup directory
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub backup: Option<bool>,

    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Ask before each update (default: on for Windows)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub interactive: Option<bool>,

    /// Allow updating any mod to a pre-release
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub pre_release: Option<bool>,

    /// Mod ids to leave untouched (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "MODID,...")]
    pub ignore: Vec<String>,

    /// Registry request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    // Modes
    /// Print the version
    #[arg(short = 'V', long = "version")]
    pub print_version: bool,

    /// Update this program
    #[arg(long = "self")]
    pub self_update: bool,

    /// List installed mods
    #[arg(long)]
    pub list: bool,

    /// Install the mods listed in FILE (one modID@version per line)
    #[arg(long, value_name = "FILE")]
    pub import: Option<PathBuf>,

    /// Write installed mods to FILE (one modID@version per line)
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    // Output options
    /// Output the run summary in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// What the program was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Update,
    Version,
    SelfUpdate,
    List,
    Import(PathBuf),
    Export(PathBuf),
}

impl CliArgs {
    /// Selected mode; update when no mode flag is given
    pub fn mode(&self) -> Mode {
        if self.print_version {
            Mode::Version
        } else if self.self_update {
            Mode::SelfUpdate
        } else if self.list {
            Mode::List
        } else if let Some(path) = &self.import {
            Mode::Import(path.clone())
        } else if let Some(path) = &self.export {
            Mode::Export(path.clone())
        } else {
            Mode::Update
        }
    }
}
