//! Entry points for the modes other than updating
//!
//! - List: print every installed mod's details
//! - Export: write `modID@version` lines for the installed mods
//! - Import: download the exact versions named in an export file
//! - Self-update: replace the running executable with the latest release

mod export;
mod import;
mod list;
mod self_update;

pub use export::{export_mods, export_lines, ExportReport};
pub use import::{import_mods, parse_import_line};
pub use list::list_mods;
pub use self_update::{
    extract_executable, is_executable_entry, self_update, Platform, SelfUpdateOutcome,
    SELF_MOD_ID,
};
