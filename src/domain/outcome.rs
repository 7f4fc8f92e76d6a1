//! Per-mod update decisions and outcomes

use super::{ModDescriptor, Release, SemVer};
use serde::Serialize;
use std::fmt;

/// What the resolver decided for one mod
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateDecision {
    /// Installed version is the newest
    NoUpdateAvailable,
    /// A newer pre-release exists but pre-releases are not allowed
    PreReleaseSkipped { latest: SemVer },
    /// The mod has no registry id
    MissingModId,
    /// The archive could not be parsed
    ParseError { message: String },
    /// A newer release should be installed
    UpdateFound { release: Release },
}

impl UpdateDecision {
    /// Returns the release to install, if any
    pub fn release(&self) -> Option<&Release> {
        match self {
            UpdateDecision::UpdateFound { release } => Some(release),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateDecision::NoUpdateAvailable => write!(f, "no updates"),
            UpdateDecision::PreReleaseSkipped { latest } => {
                write!(f, "pre-release version {} available", latest)
            }
            UpdateDecision::MissingModId => write!(f, "no modid"),
            UpdateDecision::ParseError { message } => write!(f, "parse error: {}", message),
            UpdateDecision::UpdateFound { release } => {
                write!(f, "update {} found", release.version)
            }
        }
    }
}

/// Side effect performed for one mod
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionTaken {
    None,
    /// Listed in the ignore set
    Ignored,
    /// User answered "no" at the confirmation prompt
    Declined,
    /// Dry run: update reported but not applied
    Reported,
    /// New archive downloaded with no previous archive to handle (import)
    Downloaded,
    /// New archive downloaded, old archive kept in the backup directory
    BackedUp,
    /// New archive downloaded, old archive deleted
    Removed,
    Failed { message: String },
}

/// Per-mod state machine states. Terminal states end processing of a mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModState {
    Scanned,
    Resolved,
    AwaitingConfirmation,
    UpdateFound,
    BackedUp,
    Downloaded,
    // terminal
    Ignored,
    Errored,
    NoUpdate,
    PreReleaseSkip,
    MissingModId,
    Declined,
    Reported,
    Finalized,
    Failed,
}

impl ModState {
    /// Returns true for states that end processing of a mod
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ModState::Scanned
                | ModState::Resolved
                | ModState::AwaitingConfirmation
                | ModState::UpdateFound
                | ModState::BackedUp
                | ModState::Downloaded
        )
    }
}

/// Final record for one mod in a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModOutcome {
    pub descriptor: ModDescriptor,
    pub decision: Option<UpdateDecision>,
    pub action: ActionTaken,
    pub state: ModState,
}

impl ModOutcome {
    fn new(
        descriptor: ModDescriptor,
        decision: Option<UpdateDecision>,
        action: ActionTaken,
        state: ModState,
    ) -> Self {
        debug_assert!(state.is_terminal());
        Self {
            descriptor,
            decision,
            action,
            state,
        }
    }

    /// Mod is in the ignore set
    pub fn ignored(descriptor: ModDescriptor) -> Self {
        Self::new(descriptor, None, ActionTaken::Ignored, ModState::Ignored)
    }

    /// Mod archive could not be parsed
    pub fn errored(descriptor: ModDescriptor, message: impl Into<String>) -> Self {
        let decision = UpdateDecision::ParseError {
            message: message.into(),
        };
        Self::new(descriptor, Some(decision), ActionTaken::None, ModState::Errored)
    }

    /// Resolver produced a decision that needs no side effect
    pub fn resolved(descriptor: ModDescriptor, decision: UpdateDecision) -> Self {
        let state = match &decision {
            UpdateDecision::NoUpdateAvailable => ModState::NoUpdate,
            UpdateDecision::PreReleaseSkipped { .. } => ModState::PreReleaseSkip,
            UpdateDecision::MissingModId => ModState::MissingModId,
            UpdateDecision::ParseError { .. } => ModState::Errored,
            UpdateDecision::UpdateFound { .. } => ModState::Reported,
        };
        let action = if state == ModState::Reported {
            ActionTaken::Reported
        } else {
            ActionTaken::None
        };
        Self::new(descriptor, Some(decision), action, state)
    }

    /// User declined the update
    pub fn declined(descriptor: ModDescriptor, decision: UpdateDecision) -> Self {
        Self::new(
            descriptor,
            Some(decision),
            ActionTaken::Declined,
            ModState::Declined,
        )
    }

    /// Update applied
    pub fn finalized(
        descriptor: ModDescriptor,
        decision: UpdateDecision,
        action: ActionTaken,
    ) -> Self {
        Self::new(descriptor, Some(decision), action, ModState::Finalized)
    }

    /// Any step failed
    pub fn failed(
        descriptor: ModDescriptor,
        decision: Option<UpdateDecision>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            descriptor,
            decision,
            ActionTaken::Failed {
                message: message.into(),
            },
            ModState::Failed,
        )
    }

    /// Returns true if a new archive was installed
    pub fn is_update(&self) -> bool {
        self.state == ModState::Finalized
    }

    /// Returns true if processing failed
    pub fn is_failure(&self) -> bool {
        matches!(self.state, ModState::Failed | ModState::Errored)
    }

    /// Failure message, if any
    pub fn error_message(&self) -> Option<&str> {
        match (&self.action, &self.decision) {
            (ActionTaken::Failed { message }, _) => Some(message),
            (_, Some(UpdateDecision::ParseError { message })) => Some(message),
            _ => None,
        }
    }
}
