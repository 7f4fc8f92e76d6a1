//! `modinfo.json` manifest model
//!
//! Mod manifests are hand-written by mod authors and decoded permissively:
//! enum fields accept several spellings and booleans accept strings.
//! Keys are expected to be lowercased before decoding (see
//! `inventory::lenient`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of mod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModType {
    Theme,
    Content,
    Code,
}

impl ModType {
    /// Parse `theme|content|code` or `0|1|2`, case-insensitively
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "theme" | "0" => Some(ModType::Theme),
            "content" | "1" => Some(ModType::Content),
            "code" | "2" => Some(ModType::Code),
            _ => None,
        }
    }
}

impl fmt::Display for ModType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModType::Theme => write!(f, "theme"),
            ModType::Content => write!(f, "content"),
            ModType::Code => write!(f, "code"),
        }
    }
}

impl<'de> Deserialize<'de> for ModType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = scalar_to_string(Value::deserialize(deserializer)?);
        ModType::parse_lenient(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown mod type: {}", raw)))
    }
}

/// Side of the game a mod runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AppSide {
    Server,
    Client,
    #[default]
    Universal,
}

impl AppSide {
    /// Parse `server|1` or `client|2`; anything else is `Universal`.
    ///
    /// The fallback is a policy choice: manifests in the wild use values
    /// the game itself treats as "both sides".
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "server" | "1" => AppSide::Server,
            "client" | "2" => AppSide::Client,
            _ => AppSide::Universal,
        }
    }
}

impl<'de> Deserialize<'de> for AppSide {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = scalar_to_string(Value::deserialize(deserializer)?);
        Ok(AppSide::parse_lenient(&raw))
    }
}

/// Accepts `true|t|1` as a JSON bool, number or string; anything else is false
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = scalar_to_string(Value::deserialize(deserializer)?);
    Ok(matches!(raw.to_lowercase().as_str(), "true" | "t" | "1"))
}

/// Accepts a string or a number (`"version": 1` is seen in the wild)
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decoded `modinfo.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModInfo {
    #[serde(rename = "type")]
    pub mod_type: Option<ModType>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub modid: String,
    #[serde(deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub networkversion: String,
    pub texturesize: Option<u32>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub website: String,
    #[serde(deserialize_with = "lenient_string")]
    pub iconpath: String,
    pub authors: Vec<String>,
    pub contributors: Vec<String>,
    pub side: AppSide,
    #[serde(deserialize_with = "lenient_bool")]
    pub requiredonclient: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub requiredonserver: bool,
    pub dependencies: BTreeMap<String, String>,
}
