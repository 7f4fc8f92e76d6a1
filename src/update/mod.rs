//! Update resolution for installed mods
//!
//! This module provides:
//! - Pre-release policy configuration from CLI args
//! - Update resolver that decides whether a newer release should be installed

use crate::domain::{ModDescriptor, Release, SemVer, UpdateDecision};
use crate::error::ResolveError;

/// Which mods may be updated to a pre-release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreReleasePolicy {
    /// Only mods that already run a pre-release
    #[default]
    InstalledOnly,
    /// Every mod (`--pre-release`)
    Always,
}

impl PreReleasePolicy {
    /// Policy for the `--pre-release` flag
    pub fn from_flag(allow: bool) -> Self {
        if allow {
            PreReleasePolicy::Always
        } else {
            PreReleasePolicy::InstalledOnly
        }
    }

    /// Returns true if `descriptor` may move to a pre-release
    pub fn allows(&self, descriptor: &ModDescriptor) -> bool {
        *self == PreReleasePolicy::Always || descriptor.pre_release_allowed()
    }
}

/// Decides whether a mod has an update
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateResolver {
    policy: PreReleasePolicy,
}

impl UpdateResolver {
    /// Create a new resolver with the given pre-release policy
    pub fn new(policy: PreReleasePolicy) -> Self {
        Self { policy }
    }

    /// Pre-release policy in effect
    pub fn policy(&self) -> PreReleasePolicy {
        self.policy
    }

    /// Decisions that can be made without asking the registry.
    /// Returns None if the registry must be queried.
    pub fn precheck(&self, descriptor: &ModDescriptor) -> Option<UpdateDecision> {
        if let Some(message) = &descriptor.parse_error {
            return Some(UpdateDecision::ParseError {
                message: message.clone(),
            });
        }
        if !descriptor.has_mod_id() {
            return Some(UpdateDecision::MissingModId);
        }
        None
    }

    /// Resolve the fetched releases of a mod into a decision.
    ///
    /// The newest release is taken over the whole set before the pre-release
    /// policy is applied, so a gated pre-release yields `PreReleaseSkipped`
    /// even when an older stable release exists. Among duplicate newest
    /// versions the first one listed wins.
    pub fn resolve(
        &self,
        descriptor: &ModDescriptor,
        releases: &[Release],
    ) -> Result<UpdateDecision, ResolveError> {
        if let Some(decision) = self.precheck(descriptor) {
            return Ok(decision);
        }

        let latest = SemVer::max_of(releases.iter().map(|r| &r.version));
        let release = releases
            .iter()
            .find(|r| r.version == latest)
            .ok_or_else(|| ResolveError::NoReleases {
                mod_id: descriptor.mod_id.clone(),
            })?;

        if latest <= descriptor.installed_version {
            return Ok(UpdateDecision::NoUpdateAvailable);
        }

        if latest.is_prerelease() && !self.policy.allows(descriptor) {
            return Ok(UpdateDecision::PreReleaseSkipped { latest });
        }

        Ok(UpdateDecision::UpdateFound {
            release: release.clone(),
        })
    }

    /// Find the release matching an exact version, as recorded by an export
    pub fn find_version<'a>(
        mod_id: &str,
        releases: &'a [Release],
        version: &SemVer,
    ) -> Result<&'a Release, ResolveError> {
        releases
            .iter()
            .find(|r| &r.version == version)
            .ok_or_else(|| ResolveError::VersionNotFound {
                mod_id: mod_id.to_string(),
                version: version.to_string(),
            })
    }
}
