//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Run summary line with counts per outcome class
//! - Semantic version change type indication (major/minor/patch)
//! - Failed mod listing with error messages

use crate::domain::{ModOutcome, ModState, RunSummary, SemVer};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn between(old: &SemVer, new: &SemVer) -> Self {
        match (old.as_version(), new.as_version()) {
            (Some(old), Some(new)) => {
                if new.major != old.major {
                    VersionChangeType::Major
                } else if new.minor != old.minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self, dry_run: bool) -> String {
        if !dry_run {
            String::new()
        } else if self.color {
            format!("{} ", "(dry-run)".cyan())
        } else {
            "(dry-run) ".to_string()
        }
    }

    /// Summary line with counts
    fn summary_line(&self, summary: &RunSummary) -> String {
        let total = summary.total();
        let noun = if total == 1 { "mod" } else { "mods" };

        let mut parts = Vec::new();
        if summary.dry_run {
            parts.push(format!("{} update(s) available", summary.reported()));
        } else {
            parts.push(format!("{} updated", summary.updated()));
        }
        parts.push(format!("{} skipped", summary.skipped()));
        parts.push(format!("{} failed", summary.failed()));

        format!(
            "{}{} {} checked: {}",
            self.dry_run_prefix(summary.dry_run),
            total,
            noun,
            parts.join(", ")
        )
    }

    /// Line for an update that was applied or reported
    fn update_line(&self, outcome: &ModOutcome) -> Option<String> {
        let release = outcome.decision.as_ref()?.release()?;
        let d = &outcome.descriptor;
        let change = VersionChangeType::between(&d.installed_version, &release.version);

        if self.color {
            Some(format!(
                "  {} {} {} {} [{}]",
                d.name,
                d.installed_version.to_string().dimmed(),
                "→".dimmed(),
                release.version.to_string().bright_white().bold(),
                change.colored_label()
            ))
        } else {
            Some(format!(
                "  {} {} → {} [{}]",
                d.name,
                d.installed_version,
                release.version,
                change.label()
            ))
        }
    }

    /// Line for a failed mod
    fn failure_line(&self, outcome: &ModOutcome) -> String {
        let name = if outcome.descriptor.name.is_empty() {
            outcome.descriptor.file_name()
        } else {
            outcome.descriptor.to_string()
        };
        let message = outcome.error_message().unwrap_or("unknown error");
        if self.color {
            format!("  {} {}: {}", "✗".red(), name, message.red())
        } else {
            format!("  ✗ {}: {}", name, message)
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &RunSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        if summary.cancelled {
            let line = "Run cancelled; remaining mods were left untouched.";
            if self.color {
                writeln!(writer, "{}", line.yellow())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
        }

        let line = self.summary_line(summary);
        if self.color {
            writeln!(writer, "{}", line.bold())?;
        } else {
            writeln!(writer, "{}", line)?;
        }

        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        if self.verbosity == Verbosity::Verbose {
            for outcome in summary
                .outcomes()
                .iter()
                .filter(|o| matches!(o.state, ModState::Finalized | ModState::Reported))
            {
                if let Some(line) = self.update_line(outcome) {
                    writeln!(writer, "{}", line)?;
                }
            }
        }

        for outcome in summary.failures() {
            writeln!(writer, "{}", self.failure_line(outcome))?;
        }

        Ok(())
    }
}
