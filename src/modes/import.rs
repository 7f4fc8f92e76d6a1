//! Import mode
//!
//! Reads an export file and downloads exactly the listed versions into the
//! mod directory. A bad line or a failed download is reported and the import
//! moves on to the next line.

use crate::domain::{ActionTaken, ModDescriptor, ModOutcome, RunSummary, SemVer, UpdateDecision};
use crate::error::{AppError, ConfigError, ModError};
use crate::inventory::archive_target;
use crate::output::StatusPrinter;
use crate::registry::ModRegistry;
use crate::update::UpdateResolver;
use std::io::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Split an import line into mod id and version
pub fn parse_import_line(line: &str) -> Result<(String, SemVer), AppError> {
    let (mod_id, version) = line
        .trim()
        .split_once('@')
        .ok_or_else(|| ConfigError::invalid_import_line(line))?;
    let mod_id = mod_id.trim();
    if mod_id.is_empty() {
        return Err(ConfigError::invalid_import_line(line).into());
    }
    let version = SemVer::parse(version.trim())?;
    Ok((mod_id.to_string(), version))
}

/// Download every mod listed in `input` into `mod_path`
pub async fn import_mods(
    registry: &dyn ModRegistry,
    input: &Path,
    mod_path: &Path,
    cancel: &CancellationToken,
    printer: &StatusPrinter,
    out: &mut dyn Write,
) -> Result<RunSummary, AppError> {
    std::fs::create_dir_all(mod_path).map_err(|source| ModError::Write {
        path: mod_path.to_path_buf(),
        source,
    })?;
    let content = std::fs::read_to_string(input).map_err(|source| ConfigError::ImportRead {
        path: input.to_path_buf(),
        source,
    })?;

    let mut summary = RunSummary::new(false);
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if cancel.is_cancelled() {
            warn!(processed = summary.total(), "import cancelled");
            summary.cancelled = true;
            break;
        }

        let outcome = import_line(registry, line, mod_path, printer, out).await?;
        if let Some(message) = outcome.error_message() {
            debug!(line, error = message, "import line failed");
        }
        summary.push(outcome);
    }

    printer.line(out, "Finished import")?;
    Ok(summary)
}

/// Fetch and download one line. Only output failures are returned as errors.
async fn import_line(
    registry: &dyn ModRegistry,
    line: &str,
    mod_path: &Path,
    printer: &StatusPrinter,
    out: &mut dyn Write,
) -> Result<ModOutcome, AppError> {
    let (mod_id, version) = match parse_import_line(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            let descriptor = ModDescriptor::new(mod_path, line, "", SemVer::zero());
            return report(printer, out, ModOutcome::failed(descriptor, None, e.to_string()));
        }
    };
    let placeholder = ModDescriptor::new(mod_path, mod_id.as_str(), mod_id.as_str(), version.clone());

    let listing = match registry.fetch_mod(&mod_id).await {
        Ok(listing) => listing,
        Err(e) => {
            warn!(mod_id = %mod_id, error = %e, "registry fetch failed");
            return report(printer, out, ModOutcome::failed(placeholder, None, e.to_string()));
        }
    };

    let release = match UpdateResolver::find_version(&mod_id, &listing.releases, &version) {
        Ok(release) => release.clone(),
        Err(e) => return report(printer, out, ModOutcome::failed(placeholder, None, e.to_string())),
    };

    let target = match archive_target(mod_path, &release.filename) {
        Ok(target) => target,
        Err(e) => return report(printer, out, ModOutcome::failed(placeholder, None, e.to_string())),
    };
    let descriptor = ModDescriptor::new(&target, listing.name.as_str(), mod_id.as_str(), version);
    let decision = UpdateDecision::UpdateFound {
        release: release.clone(),
    };

    printer.step(out, &format!("Downloading {}", descriptor))?;
    match registry.download(&release, &target).await {
        Ok(()) => {
            printer.step_ok(out)?;
            Ok(ModOutcome::finalized(descriptor, decision, ActionTaken::Downloaded))
        }
        Err(e) => {
            printer.step_failed(out, &e.to_string())?;
            Ok(ModOutcome::failed(descriptor, Some(decision), e.to_string()))
        }
    }
}

fn report(
    printer: &StatusPrinter,
    out: &mut dyn Write,
    outcome: ModOutcome,
) -> Result<ModOutcome, AppError> {
    printer.outcome(out, &outcome)?;
    Ok(outcome)
}
