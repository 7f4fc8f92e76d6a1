//! Registry adapters for fetching mod release information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - Vintage Story mod database adapter

mod client;
mod vintagestory;

pub use client::{part_path, HttpClient, DEFAULT_TIMEOUT};
pub use vintagestory::{VintageStoryRegistry, DEFAULT_API_URL};

use crate::domain::Release;
use crate::error::RegistryError;
use async_trait::async_trait;
use std::path::Path;

/// Mod listing as published by a registry
#[derive(Debug, Clone, PartialEq)]
pub struct ModListing {
    /// Display name in the registry
    pub name: String,
    /// Releases whose version parsed; malformed entries are already dropped
    pub releases: Vec<Release>,
}

/// Trait for mod registries
#[async_trait]
pub trait ModRegistry: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch the listing for a mod id
    async fn fetch_mod(&self, mod_id: &str) -> Result<ModListing, RegistryError>;

    /// Fetch the usable releases for a mod id
    async fn fetch_releases(&self, mod_id: &str) -> Result<Vec<Release>, RegistryError> {
        Ok(self.fetch_mod(mod_id).await?.releases)
    }

    /// Download a release archive to `target`
    async fn download(&self, release: &Release, target: &Path) -> Result<(), RegistryError>;
}
