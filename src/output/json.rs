//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run summary
//! - Per-mod outcome records (skips only in verbose mode)

use crate::domain::{ModOutcome, ModState, RunSummary};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Whether this was a dry-run
    dry_run: bool,
    /// Whether the run stopped early
    cancelled: bool,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-mod results
    mods: Vec<JsonMod<'a>>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    updated: usize,
    reported: usize,
    skipped: usize,
    failed: usize,
}

/// JSON representation of one mod outcome
#[derive(Serialize)]
struct JsonMod<'a> {
    file: String,
    name: &'a str,
    mod_id: &'a str,
    version: String,
    state: ModState,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> From<&'a ModOutcome> for JsonMod<'a> {
    fn from(outcome: &'a ModOutcome) -> Self {
        let d = &outcome.descriptor;
        Self {
            file: d.file_name(),
            name: &d.name,
            mod_id: &d.mod_id,
            version: d.installed_version.to_string(),
            state: outcome.state,
            new_version: outcome
                .decision
                .as_ref()
                .and_then(|decision| decision.release())
                .map(|release| release.version.to_string()),
            error: outcome.error_message(),
        }
    }
}

impl JsonFormatter {
    /// Whether an outcome is listed at the current verbosity
    fn include(&self, outcome: &ModOutcome) -> bool {
        self.verbosity == Verbosity::Verbose
            || matches!(
                outcome.state,
                ModState::Finalized | ModState::Reported | ModState::Failed | ModState::Errored
            )
    }

    fn to_output<'a>(&self, summary: &'a RunSummary) -> JsonOutput<'a> {
        JsonOutput {
            dry_run: summary.dry_run,
            cancelled: summary.cancelled,
            summary: JsonSummary {
                total: summary.total(),
                updated: summary.updated(),
                reported: summary.reported(),
                skipped: summary.skipped(),
                failed: summary.failed(),
            },
            mods: summary
                .outcomes()
                .iter()
                .filter(|o| self.include(o))
                .map(JsonMod::from)
                .collect(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = self.to_output(summary);
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}
