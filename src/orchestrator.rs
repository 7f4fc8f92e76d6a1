//! Update orchestrator for coordinating the per-mod update workflow
//!
//! This module provides:
//! - Workflow coordination: scan → precheck → fetch → resolve → confirm → backup → download → finalize
//! - Dry-run mode support
//! - Interactive confirmation with a run-scoped "update all" answer; prompts
//!   go to the status writer and a cancellation ends a pending prompt
//! - Failure isolation: one mod's error never stops the batch
//! - Cancellation between mods
//!
//! Mods are processed strictly one after another. The old archive is moved
//! into the backup directory before the new one is written (both may share a
//! file name), and in non-backup mode the moved copy is deleted only after
//! the download succeeded.

use crate::config::RunConfig;
use crate::domain::{
    ActionTaken, ModDescriptor, ModOutcome, ModState, Release, RunSummary, UpdateDecision,
};
use crate::error::AppError;
use crate::inventory::{archive_target, backup_archive, remove_archive, restore_archive, scan_mod_dir};
use crate::output::StatusPrinter;
use crate::progress::Progress;
use crate::registry::ModRegistry;
use crate::update::UpdateResolver;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Answer to an update prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Update this mod
    Yes,
    /// Leave this mod alone
    No,
    /// Update this mod and every remaining one without asking
    All,
}

impl Answer {
    /// Parse a prompt reply; only the first character matters and anything
    /// other than `n` or `a` confirms
    pub fn parse(input: &str) -> Self {
        match input.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('n') => Answer::No,
            Some('a') => Answer::All,
            _ => Answer::Yes,
        }
    }
}

/// Prompt text for one update
pub fn prompt_text(descriptor: &ModDescriptor, release: &Release) -> String {
    format!(
        "Update {}: {} => {}? [Y/n/a] ",
        descriptor.name, descriptor.installed_version, release.version
    )
}

/// Read one line from stdin.
///
/// The read runs on its own thread so the runtime keeps serving the interrupt
/// handler; an abandoned read dies with the process. `None` on end of input
/// or a read error.
pub async fn read_stdin_line() -> Option<String> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line).map(|n| (n, line));
        let _ = tx.send(read);
    });

    match rx.await {
        Ok(Ok((0, _))) => None,
        Ok(Ok((_, line))) => Some(line),
        Ok(Err(e)) => {
            warn!(error = %e, "failed to read from stdin");
            None
        }
        Err(_) => None,
    }
}

/// Source of update confirmations.
///
/// The prompt itself has already been written when `confirm` is called.
#[async_trait(?Send)]
pub trait Confirm {
    /// Ask whether `release` should replace the installed version
    async fn confirm(&mut self, descriptor: &ModDescriptor, release: &Release) -> Answer;
}

/// Reads the reply from stdin; end of input declines
#[derive(Debug, Default)]
pub struct StdinConfirm;

#[async_trait(?Send)]
impl Confirm for StdinConfirm {
    async fn confirm(&mut self, _descriptor: &ModDescriptor, _release: &Release) -> Answer {
        match read_stdin_line().await {
            Some(reply) => Answer::parse(&reply),
            None => {
                warn!("no reply to prompt, skipping update");
                Answer::No
            }
        }
    }
}

/// Replays prepared answers and records every prompt; once the answers run
/// out every further prompt is confirmed
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<Answer>,
    prompts: Vec<String>,
}

impl ScriptedConfirm {
    /// Create a new scripted source
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

#[async_trait(?Send)]
impl Confirm for ScriptedConfirm {
    async fn confirm(&mut self, descriptor: &ModDescriptor, release: &Release) -> Answer {
        self.prompts.push(prompt_text(descriptor, release));
        self.answers.pop_front().unwrap_or(Answer::Yes)
    }
}

#[async_trait(?Send)]
impl<C: Confirm + ?Sized> Confirm for &mut C {
    async fn confirm(&mut self, descriptor: &ModDescriptor, release: &Release) -> Answer {
        (**self).confirm(descriptor, release).await
    }
}

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator<'c> {
    /// Registry queried for releases
    registry: Arc<dyn ModRegistry>,
    /// Immutable run configuration
    config: RunConfig,
    resolver: UpdateResolver,
    confirm: Box<dyn Confirm + 'c>,
    /// Set by an "all" answer; lives for one run
    auto_confirm: bool,
    cancel: CancellationToken,
    progress: Progress,
    printer: StatusPrinter,
}

impl<'c> Orchestrator<'c> {
    /// Create a new orchestrator reading prompt replies from stdin
    pub fn new(registry: Arc<dyn ModRegistry>, config: RunConfig) -> Self {
        let resolver = UpdateResolver::new(config.pre_release);
        Self {
            registry,
            config,
            resolver,
            confirm: Box::new(StdinConfirm),
            auto_confirm: false,
            cancel: CancellationToken::new(),
            progress: Progress::disabled(),
            printer: StatusPrinter::plain(),
        }
    }

    /// Use another confirmation source
    pub fn with_confirm(mut self, confirm: impl Confirm + 'c) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Show a spinner while the registry is queried
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = Progress::new(enabled);
        self
    }

    /// Use another status printer
    pub fn with_printer(mut self, printer: StatusPrinter) -> Self {
        self.printer = printer;
        self
    }

    /// Run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Token that stops the run before the next mod
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan the mod directory and update every mod found.
    ///
    /// Only a failure to read the mod directory (or to write status output)
    /// is returned as an error; per-mod failures end up in the summary.
    pub async fn run(&mut self, out: &mut dyn Write) -> Result<RunSummary, AppError> {
        let mod_path = self.config.mod_path.clone();
        self.printer
            .line(out, &format!("Updating mods: {}", mod_path.display()))?;

        let mods = scan_mod_dir(&mod_path)?;
        if mods.is_empty() {
            self.printer.line(out, "No Mods found")?;
            return Ok(RunSummary::new(self.config.dry_run));
        }

        let summary = self.process_all(mods, out).await?;
        self.printer.line(out, "Finished Updating.")?;
        Ok(summary)
    }

    /// Process already scanned mods in order
    pub async fn process_all(
        &mut self,
        mods: Vec<ModDescriptor>,
        out: &mut dyn Write,
    ) -> Result<RunSummary, AppError> {
        self.auto_confirm = false;
        let mut summary = RunSummary::new(self.config.dry_run);
        let total = mods.len();

        for descriptor in mods {
            if self.cancel.is_cancelled() {
                warn!(
                    processed = summary.total(),
                    remaining = total - summary.total(),
                    "run cancelled"
                );
                summary.cancelled = true;
                break;
            }

            let outcome = self.process(descriptor, out).await?;
            summary.push(outcome);
        }

        info!(
            total = summary.total(),
            updated = summary.updated(),
            failed = summary.failed(),
            "run finished"
        );
        Ok(summary)
    }

    /// Drive one mod to a terminal state
    async fn process(
        &mut self,
        descriptor: ModDescriptor,
        out: &mut dyn Write,
    ) -> Result<ModOutcome, AppError> {
        debug!(mod_file = %descriptor.file_name(), state = ?ModState::Scanned, "processing mod");

        if descriptor.has_mod_id() && self.config.is_ignored(&descriptor.mod_id) {
            return self.finish(ModOutcome::ignored(descriptor), out);
        }

        if let Some(decision) = self.resolver.precheck(&descriptor) {
            let outcome = match decision {
                UpdateDecision::ParseError { message } => ModOutcome::errored(descriptor, message),
                other => ModOutcome::resolved(descriptor, other),
            };
            return self.finish(outcome, out);
        }

        self.progress
            .spinner(&format!("Checking {}", descriptor.name));
        let fetched = self.registry.fetch_releases(&descriptor.mod_id).await;
        self.progress.finish_and_clear();

        let releases = match fetched {
            Ok(releases) => releases,
            Err(e) => {
                warn!(mod_id = %descriptor.mod_id, error = %e, "registry fetch failed");
                return self.finish(ModOutcome::failed(descriptor, None, e.to_string()), out);
            }
        };

        let decision = match self.resolver.resolve(&descriptor, &releases) {
            Ok(decision) => decision,
            Err(e) => {
                warn!(mod_id = %descriptor.mod_id, error = %e, "registry returned no usable release");
                return self.finish(ModOutcome::failed(descriptor, None, e.to_string()), out);
            }
        };
        debug!(mod_id = %descriptor.mod_id, state = ?ModState::Resolved, %decision, "resolved");

        let release = match decision.release() {
            Some(release) => release.clone(),
            None => return self.finish(ModOutcome::resolved(descriptor, decision), out),
        };

        if self.config.dry_run {
            return self.finish(ModOutcome::resolved(descriptor, decision), out);
        }

        if self.config.interactive && !self.auto_confirm {
            debug!(mod_id = %descriptor.mod_id, state = ?ModState::AwaitingConfirmation, "asking");
            write!(out, "{}", prompt_text(&descriptor, &release))?;
            out.flush()?;
            let answer = tokio::select! {
                answer = self.confirm.confirm(&descriptor, &release) => answer,
                _ = self.cancel.cancelled() => {
                    writeln!(out)?;
                    Answer::No
                }
            };
            match answer {
                Answer::No => return self.finish(ModOutcome::declined(descriptor, decision), out),
                Answer::All => self.auto_confirm = true,
                Answer::Yes => {}
            }
        }

        debug!(mod_id = %descriptor.mod_id, state = ?ModState::UpdateFound, "applying update");
        self.apply(descriptor, decision, release, out).await
    }

    /// UpdateFound → BackedUp → Downloaded → Finalized, or Failed at any step
    async fn apply(
        &mut self,
        descriptor: ModDescriptor,
        decision: UpdateDecision,
        release: Release,
        out: &mut dyn Write,
    ) -> Result<ModOutcome, AppError> {
        let target = match archive_target(&self.config.mod_path, &release.filename) {
            Ok(target) => target,
            Err(e) => {
                let outcome = ModOutcome::failed(descriptor, Some(decision), e.to_string());
                return self.finish(outcome, out);
            }
        };

        let moved = match backup_archive(&descriptor.path, &self.config.backup_path) {
            Ok(moved) => moved,
            Err(e) => {
                let outcome = ModOutcome::failed(descriptor, Some(decision), e.to_string());
                return self.finish(outcome, out);
            }
        };
        debug!(mod_id = %descriptor.mod_id, state = ?ModState::BackedUp, backup = %moved.display(), "backed up");

        // The spinner owns the terminal line until it is cleared
        let label = format!(
            "Downloading {}: {} => {}",
            descriptor.name, descriptor.installed_version, release.version
        );
        self.progress.spinner(&label);
        let downloaded = self.registry.download(&release, &target).await;
        self.progress.finish_and_clear();
        self.printer.step(out, &label)?;

        if let Err(e) = downloaded {
            self.printer.step_failed(out, &e.to_string())?;
            if let Err(restore_err) = restore_archive(&moved, &descriptor.path) {
                warn!(error = %restore_err, backup = %moved.display(), "could not restore backup");
            }
            return Ok(ModOutcome::failed(descriptor, Some(decision), e.to_string()));
        }
        self.printer.step_ok(out)?;
        debug!(mod_id = %descriptor.mod_id, state = ?ModState::Downloaded, target = %target.display(), "downloaded");

        if self.config.backup {
            return Ok(ModOutcome::finalized(descriptor, decision, ActionTaken::BackedUp));
        }

        self.printer.step(out, &format!("Removing {}", descriptor))?;
        match remove_archive(&moved) {
            Ok(()) => {
                self.printer.step_ok(out)?;
                Ok(ModOutcome::finalized(descriptor, decision, ActionTaken::Removed))
            }
            Err(e) => {
                self.printer.step_failed(out, &e.to_string())?;
                let message = format!("update installed but the old archive was kept: {}", e);
                Ok(ModOutcome::failed(descriptor, Some(decision), message))
            }
        }
    }

    /// Print the status line of a terminal outcome
    fn finish(&self, outcome: ModOutcome, out: &mut dyn Write) -> Result<ModOutcome, AppError> {
        debug!(mod_file = %outcome.descriptor.file_name(), state = ?outcome.state, "done");
        self.printer.outcome(out, &outcome)?;
        Ok(outcome)
    }
}
