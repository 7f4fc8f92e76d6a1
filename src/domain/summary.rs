//! Run summary
//!
//! Outcomes are appended in processing order and never modified afterwards.

use super::{ModOutcome, ModState};
use serde::Serialize;

/// Ordered outcomes of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// One entry per processed mod, in processing order
    outcomes: Vec<ModOutcome>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Whether the run was cancelled before every mod was processed
    pub cancelled: bool,
}

impl RunSummary {
    /// Creates a new RunSummary
    pub fn new(dry_run: bool) -> Self {
        Self {
            outcomes: Vec::new(),
            dry_run,
            cancelled: false,
        }
    }

    /// Appends an outcome
    pub fn push(&mut self, outcome: ModOutcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes
    pub fn outcomes(&self) -> &[ModOutcome] {
        &self.outcomes
    }

    /// Returns the number of processed mods
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the number of mods updated
    pub fn updated(&self) -> usize {
        self.count(|o| o.is_update())
    }

    /// Returns the number of updates found in dry-run mode
    pub fn reported(&self) -> usize {
        self.count(|o| o.state == ModState::Reported)
    }

    /// Returns the number of failed mods (including unparseable archives)
    pub fn failed(&self) -> usize {
        self.count(|o| o.is_failure())
    }

    /// Returns the number of mods left untouched for any other reason
    pub fn skipped(&self) -> usize {
        self.total() - self.updated() - self.reported() - self.failed()
    }

    /// Returns all failed outcomes
    pub fn failures(&self) -> impl Iterator<Item = &ModOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Finds the outcome for a mod id
    pub fn find(&self, mod_id: &str) -> Option<&ModOutcome> {
        self.outcomes.iter().find(|o| o.descriptor.mod_id == mod_id)
    }

    fn count(&self, predicate: impl Fn(&ModOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new(false)
    }
}
