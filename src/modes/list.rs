//! List mode

use crate::error::AppError;
use crate::inventory::scan_mod_dir;
use crate::output::StatusPrinter;
use std::io::Write;
use std::path::Path;

const SEPARATOR_WIDTH: usize = 80;

/// Print the details of every mod in `mod_path`, separated by `=` lines.
///
/// Returns the number of archives listed. Broken archives are listed in red.
pub fn list_mods(
    mod_path: &Path,
    printer: &StatusPrinter,
    out: &mut dyn Write,
) -> Result<usize, AppError> {
    let mods = scan_mod_dir(mod_path)?;
    if mods.is_empty() {
        printer.line(out, "No Mods found")?;
        return Ok(0);
    }

    let separator = "=".repeat(SEPARATOR_WIDTH);
    for descriptor in &mods {
        printer.line(out, &separator)?;
        if descriptor.is_broken() {
            printer.error_line(out, &descriptor.details())?;
        } else {
            printer.line(out, &descriptor.details())?;
        }
    }
    printer.line(out, &separator)?;

    Ok(mods.len())
}
