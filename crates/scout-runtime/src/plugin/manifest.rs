use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::export::Export;
use crate::paths::SearchPathSet;

/// Manifest file expected inside every plugin directory
pub const MANIFEST_FILE: &str = "plugin.toml";

/// Current API version native plugins must match
pub const CURRENT_API_VERSION: u32 = 1;

/// Plugin manifest (parsed from plugin.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_api_version")]
    pub api_version: u32,
    #[serde(default)]
    pub description: String,
    /// Path to a native shared library relative to the manifest dir.
    /// When absent, `[exports]` is the module's root export.
    #[serde(default)]
    pub entry_point: Option<String>,
    #[serde(default)]
    pub exports: toml::Table,
}

fn default_api_version() -> u32 {
    CURRENT_API_VERSION
}

impl PluginManifest {
    /// Load manifest from plugin.toml file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read plugin manifest: {:?}", path))?;
        let manifest: Self =
            toml::from_str(&content).context(format!("Failed to parse manifest: {:?}", path))?;
        Ok(manifest)
    }

    /// Resolve entry point path relative to manifest directory
    pub fn resolve_entry_point(&self, manifest_dir: &Path) -> Option<PathBuf> {
        self.entry_point
            .as_ref()
            .map(|entry| manifest_dir.join(entry))
    }

    /// Declared exports as an object export
    pub fn declared_exports(&self) -> Export {
        Export::from(toml::Value::Table(self.exports.clone()))
    }
}

/// First `<dir>/<name>` in search order that holds a manifest
pub fn find_plugin_dir(name: &str, paths: &SearchPathSet) -> Option<PathBuf> {
    paths
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.join(MANIFEST_FILE).is_file())
}
