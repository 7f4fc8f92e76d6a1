//! Live status lines
//!
//! Every mod gets one line ending in a marker (`SUCCESS`, `FAIL`, `SKIP`, ...)
//! as soon as its outcome is known. Multi-step actions print the step label
//! first and complete the line when the step finishes.

use crate::domain::{ModOutcome, ModState};
use colored::Colorize;
use std::io::Write;

/// Writes status lines for a run
#[derive(Debug, Clone, Copy)]
pub struct StatusPrinter {
    color: bool,
}

impl StatusPrinter {
    /// Create a new printer
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Printer without ANSI colors
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Status line for an outcome that needed no multi-step action
    pub fn outcome_line(&self, outcome: &ModOutcome) -> Option<String> {
        let d = &outcome.descriptor;
        let message = outcome.error_message().unwrap_or_default();
        let line = match outcome.state {
            ModState::Ignored => format!("{} - Ignore", d),
            ModState::Errored => format!("!!! {} - Failed: {}", d.file_name(), message),
            ModState::NoUpdate => format!("{} - No updates", d),
            ModState::PreReleaseSkip => match &outcome.decision {
                Some(decision) => format!("{} - {}, SKIP", d, capitalize(&decision.to_string())),
                None => format!("{} - Pre-release version available, SKIP", d),
            },
            ModState::MissingModId => format!("{} - No modid, SKIP", d),
            ModState::Declined => format!("{} - Declined, SKIP", d),
            ModState::Reported => {
                let version = outcome
                    .decision
                    .as_ref()
                    .and_then(|decision| decision.release())
                    .map(|release| release.version.to_string())
                    .unwrap_or_default();
                format!("{} - Update {} found!", d, version)
            }
            ModState::Failed => format!("{} - FAIL: {}", d, message),
            _ => return None,
        };
        Some(line)
    }

    /// Write the status line for an outcome, red for failures
    pub fn outcome(&self, writer: &mut dyn Write, outcome: &ModOutcome) -> std::io::Result<()> {
        match self.outcome_line(outcome) {
            Some(line) if outcome.is_failure() => self.error_line(writer, &line),
            Some(line) => writeln!(writer, "{}", line),
            None => Ok(()),
        }
    }

    /// Write an unadorned line
    pub fn line(&self, writer: &mut dyn Write, text: &str) -> std::io::Result<()> {
        writeln!(writer, "{}", text)
    }

    /// Write a line in red
    pub fn error_line(&self, writer: &mut dyn Write, text: &str) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", text.red())
        } else {
            writeln!(writer, "{}", text)
        }
    }

    /// Start a step line; completed by `step_ok` or `step_failed`
    pub fn step(&self, writer: &mut dyn Write, label: &str) -> std::io::Result<()> {
        write!(writer, "{} - ", label)?;
        writer.flush()
    }

    /// Complete a step line with SUCCESS
    pub fn step_ok(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", "SUCCESS".green())
        } else {
            writeln!(writer, "SUCCESS")
        }
    }

    /// Complete a step line with FAIL and print the error below it
    pub fn step_failed(&self, writer: &mut dyn Write, error: &str) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}", "FAIL".red().bold())?;
            writeln!(writer, "  {}", error.red())
        } else {
            writeln!(writer, "FAIL")?;
            writeln!(writer, "  {}", error)
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
