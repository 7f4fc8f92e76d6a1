//! Core domain models for vsmodup
//!
//! This module contains the fundamental types used throughout the application:
//! - Semantic versions with pre-release detection
//! - Registry release metadata
//! - `modinfo.json` manifests and the local mod descriptors built from them
//! - Update decisions, per-mod outcomes and the run summary

mod descriptor;
mod manifest;
mod outcome;
mod release;
mod semver;
mod summary;

pub use descriptor::ModDescriptor;
pub use manifest::{AppSide, ModInfo, ModType};
pub use outcome::{ActionTaken, ModOutcome, ModState, UpdateDecision};
pub use release::Release;
pub use semver::SemVer;
pub use summary::RunSummary;
