//! Self-update mode
//!
//! vsmodup is published on the mod portal like any other mod, so the same
//! registry and resolver decide whether a newer build exists. The release
//! archive holds one executable per platform; the matching entry replaces
//! the running executable and is checked with `--help` before the backup is
//! dropped.

use crate::domain::{ModDescriptor, SemVer, UpdateDecision};
use crate::error::{AppError, SelfUpdateError};
use crate::inventory::archive_target;
use crate::output::StatusPrinter;
use crate::registry::ModRegistry;
use crate::update::UpdateResolver;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Registry id vsmodup is published under
pub const SELF_MOD_ID: &str = "5060";

const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Result of a self-update
#[derive(Debug, Clone, PartialEq)]
pub enum SelfUpdateOutcome {
    /// Nothing newer was installed
    UpToDate(UpdateDecision),
    /// The executable was replaced
    Updated { from: SemVer, to: SemVer },
}

/// Platform whose executable is picked out of a release archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// Suffix the macOS build carries instead of an extension
const MACOS_SUFFIX: &str = "_macOS";

/// Whether a release archive entry is the executable for `platform`.
///
/// Releases ship `<name>.exe`, `<name>_macOS` and a bare `<name>` side by side.
pub fn is_executable_entry(name: &str, platform: Platform) -> bool {
    if name.ends_with('/') {
        return false;
    }
    let path = Path::new(name);
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let has_extension = path.extension().is_some();
    let is_macos_build = file_name.ends_with(MACOS_SUFFIX);

    match platform {
        Platform::Windows => path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe")),
        Platform::MacOs => !has_extension && is_macos_build,
        Platform::Linux => !has_extension && !is_macos_build,
    }
}

/// Extract the executable for `platform` from `archive` into `dir`
pub fn extract_executable(
    archive: &Path,
    dir: &Path,
    platform: Platform,
) -> Result<PathBuf, SelfUpdateError> {
    let extract_err = |e: &dyn std::fmt::Display| SelfUpdateError::Extract {
        message: e.to_string(),
    };

    let file = File::open(archive).map_err(|e| extract_err(&e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| extract_err(&e))?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| extract_err(&e))?;
        if entry.is_dir() || !is_executable_entry(entry.name(), platform) {
            continue;
        }

        let file_name = Path::new(entry.name())
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or(SelfUpdateError::NoExecutable)?;
        let target = dir.join(file_name);
        let mut out = File::create(&target).map_err(|e| extract_err(&e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| extract_err(&e))?;
        set_executable(&target).map_err(|e| extract_err(&e))?;

        debug!(entry = entry.name(), target = %target.display(), "extracted executable");
        return Ok(target);
    }

    Err(SelfUpdateError::NoExecutable)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn backup_path(exe: &Path) -> PathBuf {
    let mut name = exe.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Run `<exe> --help` and require a zero exit status
fn verify(exe: &Path) -> Result<(), SelfUpdateError> {
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .map_err(|e| SelfUpdateError::Verify {
            message: e.to_string(),
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(SelfUpdateError::Verify {
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}

/// Update the running executable to the newest release
pub async fn self_update(
    registry: &dyn ModRegistry,
    resolver: UpdateResolver,
    printer: &StatusPrinter,
    out: &mut dyn Write,
) -> Result<SelfUpdateOutcome, AppError> {
    let exe = std::env::current_exe().map_err(SelfUpdateError::CurrentExe)?;
    let current = SemVer::parse(env!("CARGO_PKG_VERSION"))?;
    let me = ModDescriptor::new(&exe, APP_NAME, SELF_MOD_ID, current.clone());

    printer.line(out, "checking for update...")?;
    let releases = registry.fetch_releases(SELF_MOD_ID).await?;
    let decision = resolver.resolve(&me, &releases)?;
    let release = match decision.release() {
        Some(release) => release.clone(),
        None => {
            printer.line(out, &format!("{} - {}", me, decision))?;
            return Ok(SelfUpdateOutcome::UpToDate(decision));
        }
    };
    printer.line(
        out,
        &format!("update found, old: {}, new: {}", current, release.version),
    )?;

    let workdir = tempfile::tempdir().map_err(|e| SelfUpdateError::Extract {
        message: e.to_string(),
    })?;
    let archive = archive_target(workdir.path(), &release.filename)?;
    printer.step(out, &format!("Downloading {}", release.filename))?;
    if let Err(e) = registry.download(&release, &archive).await {
        printer.step_failed(out, &e.to_string())?;
        return Err(e.into());
    }
    printer.step_ok(out)?;

    let new_exe = extract_executable(&archive, workdir.path(), Platform::current())?;

    let backup = backup_path(&exe);
    std::fs::copy(&exe, &backup).map_err(|source| SelfUpdateError::Backup {
        path: backup.clone(),
        source,
    })?;
    debug!(backup = %backup.display(), "kept a copy of the running executable");

    self_replace::self_replace(&new_exe).map_err(SelfUpdateError::Replace)?;

    printer.line(out, "testing new version...")?;
    if let Err(e) = verify(&exe) {
        printer.error_line(out, &format!("new version failed: {}", e))?;
        if let Err(restore_err) = self_replace::self_replace(&backup) {
            warn!(error = %restore_err, backup = %backup.display(), "could not restore the previous executable");
            return Err(e.into());
        }
        if let Err(remove_err) = std::fs::remove_file(&backup) {
            warn!(error = %remove_err, backup = %backup.display(), "could not remove backup");
        }
        return Err(e.into());
    }

    if let Err(e) = std::fs::remove_file(&backup) {
        warn!(error = %e, backup = %backup.display(), "could not remove backup");
    }
    printer.line(out, &format!("updated to {}", release.version))?;

    Ok(SelfUpdateOutcome::Updated {
        from: current,
        to: release.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Release;
    use crate::error::RegistryError;
    use crate::registry::ModListing;
    use async_trait::async_trait;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_archive(path: &Path, entries: &[&str]) {
        let f = File::create(path).unwrap();
        let mut zip = ZipWriter::new(f);
        for name in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(name.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_is_executable_entry() {
        assert!(is_executable_entry("vsmodup", Platform::Linux));
        assert!(!is_executable_entry("vsmodup.exe", Platform::Linux));
        assert!(!is_executable_entry("README.md", Platform::Linux));
        assert!(!is_executable_entry("bin/", Platform::Linux));
        assert!(!is_executable_entry("vsmodup_macOS", Platform::Linux));
        assert!(is_executable_entry("vsmodup.exe", Platform::Windows));
        assert!(is_executable_entry("VSMODUP.EXE", Platform::Windows));
        assert!(!is_executable_entry("vsmodup", Platform::Windows));
        assert!(is_executable_entry("dist/vsmodup_macOS", Platform::MacOs));
        assert!(!is_executable_entry("vsmodup", Platform::MacOs));
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/opt/vsmodup")),
            PathBuf::from("/opt/vsmodup.bak")
        );
    }

    #[test]
    fn test_extract_executable() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("release.zip");
        write_archive(&archive, &["README.md", "vsmodup.exe", "vsmodup"]);

        let exe = extract_executable(&archive, dir.path(), Platform::current()).unwrap();
        let expected = if cfg!(windows) { "vsmodup.exe" } else { "vsmodup" };
        assert_eq!(exe, dir.path().join(expected));
        assert_eq!(std::fs::read_to_string(&exe).unwrap(), expected);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&exe).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_extract_executable_picks_each_platform_build() {
        let cases = [
            (Platform::Linux, "VSModUpdater"),
            (Platform::MacOs, "VSModUpdater_macOS"),
            (Platform::Windows, "VSModUpdater.exe"),
        ];
        for (platform, expected) in cases {
            let dir = TempDir::new().unwrap();
            let archive = dir.path().join("release.zip");
            write_archive(
                &archive,
                &["VSModUpdater_macOS", "VSModUpdater", "VSModUpdater.exe"],
            );
            let out = dir.path().join("out");
            std::fs::create_dir(&out).unwrap();

            let exe = extract_executable(&archive, &out, platform).unwrap();
            assert_eq!(exe, out.join(expected), "{:?}", platform);
            assert_eq!(std::fs::read_to_string(&exe).unwrap(), expected);
        }
    }

    #[test]
    fn test_extract_executable_missing() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("release.zip");
        write_archive(&archive, &["README.md"]);

        let err = extract_executable(&archive, dir.path(), Platform::Linux).unwrap_err();
        assert!(matches!(err, SelfUpdateError::NoExecutable));
    }

    struct CurrentOnly;

    #[async_trait]
    impl ModRegistry for CurrentOnly {
        fn registry_name(&self) -> &'static str {
            "current"
        }

        async fn fetch_mod(&self, _mod_id: &str) -> Result<ModListing, RegistryError> {
            Ok(ModListing {
                name: APP_NAME.to_string(),
                releases: vec![Release::new(
                    1,
                    "https://example.com/self.zip",
                    "self.zip",
                    SemVer::parse(env!("CARGO_PKG_VERSION")).unwrap(),
                )],
            })
        }

        async fn download(&self, _release: &Release, _target: &Path) -> Result<(), RegistryError> {
            panic!("nothing to download when up to date");
        }
    }

    #[tokio::test]
    async fn test_self_update_up_to_date() {
        let mut out = Vec::new();
        let outcome = self_update(
            &CurrentOnly,
            UpdateResolver::default(),
            &StatusPrinter::plain(),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            SelfUpdateOutcome::UpToDate(UpdateDecision::NoUpdateAvailable)
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("checking for update...\n"));
    }
}
