//! Vintage Story mod database adapter
//!
//! Fetches release information from the public mod database.
//! API endpoint: https://mods.vintagestory.at/api/mod/{modid}
//!
//! The API is loosely typed: `statuscode` is a string or a number, and
//! release entries occasionally carry malformed fields. Each release is
//! decoded on its own so one bad entry never poisons the listing.

use crate::domain::{Release, SemVer};
use crate::error::RegistryError;
use crate::registry::{HttpClient, ModListing, ModRegistry};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Mod database API base URL
pub const DEFAULT_API_URL: &str = "https://mods.vintagestory.at/api/mod";

/// Timestamp format used by the `created` fields
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Vintage Story mod database adapter
pub struct VintageStoryRegistry {
    client: HttpClient,
    base_url: String,
}

/// Top-level API response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "mod", default)]
    listing: Option<ApiMod>,
    #[serde(default)]
    statuscode: Option<Value>,
}

/// Mod object; only the fields the updater needs are decoded
#[derive(Debug, Deserialize)]
struct ApiMod {
    #[serde(default)]
    name: String,
    #[serde(default)]
    releases: Vec<Value>,
}

/// One release entry
#[derive(Debug, Deserialize)]
struct ApiRelease {
    #[serde(default)]
    releaseid: u64,
    #[serde(default)]
    mainfile: String,
    #[serde(default)]
    filename: String,
    modversion: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    created: Option<String>,
}

impl ApiResponse {
    /// Status code as a number, whichever way the API spelled it
    fn status(&self) -> Option<u16> {
        match self.statuscode.as_ref()? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
    }
}

impl ApiRelease {
    fn into_release(self) -> Result<Release, String> {
        let version = SemVer::parse(&self.modversion).map_err(|e| e.to_string())?;
        if self.mainfile.is_empty() {
            return Err(format!("release {} has no download url", version));
        }

        let game_versions = self
            .tags
            .iter()
            .filter_map(|tag| SemVer::parse(tag).ok())
            .collect();
        let created = self
            .created
            .as_deref()
            .and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), CREATED_FORMAT).ok());

        Ok(
            Release::new(self.releaseid, self.mainfile, self.filename, version)
                .with_game_versions(game_versions)
                .with_created(created),
        )
    }
}

impl VintageStoryRegistry {
    /// Create a new adapter against the public mod database
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, DEFAULT_API_URL)
    }

    /// Create a new adapter against another API base URL
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Build the URL for a mod; the id is escaped as one path segment
    fn build_url(&self, mod_id: &str) -> Result<String, RegistryError> {
        let invalid = |reason: String| {
            RegistryError::network_error(
                mod_id,
                format!("invalid API URL {}: {}", self.base_url, reason),
            )
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(mod_id);
        Ok(url.into())
    }

    /// Decode a raw API response into a listing
    fn parse_listing(mod_id: &str, response: ApiResponse) -> Result<ModListing, RegistryError> {
        match response.status() {
            Some(404) => return Err(RegistryError::mod_not_found(mod_id)),
            Some(status) if !(200..300).contains(&status) => {
                return Err(RegistryError::invalid_response(
                    mod_id,
                    format!("status code {}", status),
                ))
            }
            _ => {}
        }

        let listing = response
            .listing
            .ok_or_else(|| RegistryError::invalid_response(mod_id, "response has no mod"))?;

        let releases = listing
            .releases
            .into_iter()
            .filter_map(|raw| {
                let decoded = serde_json::from_value::<ApiRelease>(raw)
                    .map_err(|e| e.to_string())
                    .and_then(ApiRelease::into_release);
                match decoded {
                    Ok(release) => Some(release),
                    Err(reason) => {
                        warn!(mod_id, %reason, "dropping unusable release");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        debug!(mod_id, releases = releases.len(), "fetched mod listing");
        Ok(ModListing {
            name: listing.name,
            releases,
        })
    }
}

#[async_trait]
impl ModRegistry for VintageStoryRegistry {
    fn registry_name(&self) -> &'static str {
        "mods.vintagestory.at"
    }

    async fn fetch_mod(&self, mod_id: &str) -> Result<ModListing, RegistryError> {
        let url = self.build_url(mod_id)?;
        let response: ApiResponse = self.client.get_json(&url, mod_id).await?;
        Self::parse_listing(mod_id, response)
    }

    async fn download(&self, release: &Release, target: &Path) -> Result<(), RegistryError> {
        self.client
            .download_to(&release.download_url, target)
            .await
            .map(|_| ())
    }
}
