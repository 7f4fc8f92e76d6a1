//! vsmodup - Vintage Story mod updater library
//!
//! This library provides the core functionality for keeping the mods of a
//! Vintage Story installation up to date:
//! - Scanning mod archives and their `modinfo.json` manifests
//! - Querying mods.vintagestory.at for releases
//! - Resolving updates with semantic-version precedence and pre-release gating
//! - Applying updates with backup, rollback and per-mod failure isolation
//! - Listing, exporting and importing installed mods

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod modes;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod update;
