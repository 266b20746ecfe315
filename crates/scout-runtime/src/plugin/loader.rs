use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::export::Export;
use crate::module::ModuleLoader;
use crate::paths::SearchPathSet;

use super::ffi_bridge::PluginHandle;
use super::manifest::{find_plugin_dir, PluginManifest, CURRENT_API_VERSION, MANIFEST_FILE};

/// Loaded module: root export + FFI handle for native plugins
struct CachedModule {
    root: Export,
    /// Keeps the library mapped even when the root holds no functions
    _handle: Option<Arc<PluginHandle>>,
}

/// Filesystem module loader.
///
/// Resolves `<dir>/<name>/plugin.toml` through the search path set (first hit
/// wins). Manifests without an entry point export their `[exports]` table;
/// manifests with one load the native library and export what the plugin
/// returns. Modules are cached per directory, so loading a name twice yields
/// the same root.
#[derive(Default)]
pub struct ManifestLoader {
    modules: DashMap<PathBuf, CachedModule>,
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a module from its plugin directory, bypassing name resolution.
    pub fn load_dir(&self, plugin_dir: &Path) -> Result<Export> {
        if let Some(cached) = self.modules.get(plugin_dir) {
            return Ok(cached.root.clone());
        }

        let manifest = PluginManifest::load(&plugin_dir.join(MANIFEST_FILE))?;

        // Validate API version
        if manifest.api_version != CURRENT_API_VERSION {
            return Err(anyhow!(
                "Plugin '{}' API version {} doesn't match runtime version {}",
                manifest.name,
                manifest.api_version,
                CURRENT_API_VERSION
            ));
        }

        let module = match manifest.resolve_entry_point(plugin_dir) {
            Some(entry_path) => {
                if !entry_path.exists() {
                    return Err(anyhow!("Plugin entry point not found: {:?}", entry_path));
                }
                let handle = PluginHandle::load(&entry_path)?;
                let root = handle.exports()?;
                info!(
                    plugin = %manifest.name,
                    entry = ?entry_path,
                    "Native plugin loaded via FFI"
                );
                CachedModule {
                    root,
                    _handle: Some(handle),
                }
            }
            None => {
                debug!(
                    plugin = %manifest.name,
                    version = %manifest.version,
                    "Manifest plugin loaded"
                );
                CachedModule {
                    root: manifest.declared_exports(),
                    _handle: None,
                }
            }
        };

        let root = module.root.clone();
        self.modules.insert(plugin_dir.to_path_buf(), module);
        Ok(root)
    }

    /// Number of distinct modules loaded so far
    pub fn loaded_count(&self) -> usize {
        self.modules.len()
    }
}

impl ModuleLoader for ManifestLoader {
    fn load(&self, name: &str, paths: &SearchPathSet) -> Result<Export> {
        let plugin_dir = find_plugin_dir(name, paths).ok_or_else(|| {
            anyhow!(
                "Cannot find module '{}' in search paths [{}]",
                name,
                paths.joined()
            )
        })?;
        self.load_dir(&plugin_dir)
    }
}
