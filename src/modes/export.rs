//! Export mode

use crate::domain::ModDescriptor;
use crate::error::{AppError, ModError};
use crate::inventory::scan_mod_dir;
use crate::output::StatusPrinter;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Absolute path of the written file
    pub path: PathBuf,
    /// Mods written
    pub exported: usize,
    /// Mods left out because they have no mod id
    pub skipped: usize,
}

/// `modID@version` lines for every descriptor that has a mod id
pub fn export_lines(mods: &[ModDescriptor]) -> Vec<String> {
    mods.iter()
        .filter(|d| d.has_mod_id())
        .map(|d| format!("{}@{}", d.mod_id, d.installed_version))
        .collect()
}

/// Write the installed mods of `mod_path` to `output`.
///
/// The parent directory of `output` is created when missing. An empty mod
/// directory leaves `output` untouched.
pub fn export_mods(
    mod_path: &Path,
    output: &Path,
    printer: &StatusPrinter,
    out: &mut dyn Write,
) -> Result<ExportReport, AppError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ModError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mods = scan_mod_dir(mod_path)?;
    let path = std::path::absolute(output).unwrap_or_else(|_| output.to_path_buf());
    if mods.is_empty() {
        printer.line(out, "No Mods found")?;
        return Ok(ExportReport {
            path,
            exported: 0,
            skipped: 0,
        });
    }

    let mut skipped = 0;
    for descriptor in mods.iter().filter(|d| !d.has_mod_id()) {
        let reason = descriptor
            .parse_error
            .as_deref()
            .unwrap_or("no modid, SKIP");
        printer.error_line(out, &format!("{} - {}", descriptor, reason))?;
        skipped += 1;
    }

    let lines = export_lines(&mods);
    std::fs::write(output, lines.join("\n")).map_err(|source| ModError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), count = lines.len(), "exported mods");

    printer.line(out, &format!("Finished export {}", path.display()))?;
    Ok(ExportReport {
        path,
        exported: lines.len(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemVer;
    use std::io::Write as _;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_mod(dir: &Path, file: &str, manifest: &str) {
        let f = std::fs::File::create(dir.join(file)).unwrap();
        let mut zip = ZipWriter::new(f);
        zip.start_file("modinfo.json", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(manifest.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_export_lines_skip_missing_id() {
        let mods = vec![
            ModDescriptor::new("/m/a.zip", "A", "alpha", SemVer::parse("1.0.0").unwrap()),
            ModDescriptor::new("/m/b.zip", "B", "", SemVer::parse("2.0.0").unwrap()),
            ModDescriptor::new("/m/c.zip", "C", "gamma", SemVer::parse("0.3.1-rc.2").unwrap()),
        ];
        assert_eq!(export_lines(&mods), vec!["alpha@v1.0.0", "gamma@v0.3.1-rc.2"]);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let mods = dir.path().join("Mods");
        std::fs::create_dir_all(&mods).unwrap();
        write_mod(&mods, "a.zip", r#"{"name": "A", "modid": "alpha", "version": "1.0.0"}"#);
        write_mod(&mods, "b.zip", r#"{"name": "B", "version": "2.0.0"}"#);
        write_mod(&mods, "c.zip", r#"{"name": "C", "modid": "gamma", "version": "3.1.0"}"#);

        let output = dir.path().join("nested").join("mods.txt");
        let mut out = Vec::new();
        let report = export_mods(&mods, &output, &StatusPrinter::plain(), &mut out).unwrap();

        assert_eq!(report.exported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "alpha@v1.0.0\ngamma@v3.1.0"
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("B@v2.0.0 - no modid, SKIP"));
        assert!(text.contains("Finished export"));
    }

    #[test]
    fn test_export_empty_dir_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("mods.txt");
        let mut out = Vec::new();
        let report = export_mods(dir.path(), &output, &StatusPrinter::plain(), &mut out).unwrap();

        assert_eq!(report.exported, 0);
        assert!(!output.exists());
        assert_eq!(String::from_utf8(out).unwrap(), "No Mods found\n");
    }
}
