//! FFI bridge for loading native plugins (.so/.dylib) via libloading.
//!
//! Uses double-boxing pattern: `Box<Box<dyn Plugin>>` → thin `*mut c_void`
//! to avoid passing fat pointers over `extern "C"` boundary.
//!
//! **Constraint:** Plugin and host must share the same Rust compiler version.

use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use libloading::Library;

use super::manifest::CURRENT_API_VERSION;
use super::plugin_trait::Plugin;
use crate::export::{Export, ExportFn};

/// Symbol type for `_plugin_create() -> *mut c_void`
type CreateFn = extern "C" fn() -> *mut c_void;

/// Safe wrapper around a dynamically loaded plugin.
///
/// Drop order matters: `plugin` must be dropped before `_library`
/// (Rust drops fields in declaration order).
pub struct PluginHandle {
    plugin: Box<dyn Plugin>,
    _library: Library,
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("plugin_name", &self.plugin.name())
            .field("version", &self.plugin.version())
            .finish()
    }
}

impl PluginHandle {
    /// Load a native plugin from a shared library path (.so/.dylib).
    ///
    /// Calls `_plugin_create()` with panic isolation, reconstructs the
    /// double-boxed `Box<dyn Plugin>` from the returned thin pointer.
    pub fn load(path: &Path) -> Result<Arc<Self>> {
        // Load the shared library
        let lib = unsafe { Library::new(path) }
            .with_context(|| format!("Failed to load library: {}", path.display()))?;

        // Resolve _plugin_create symbol
        let create_fn = unsafe { lib.get::<CreateFn>(b"_plugin_create\0") }
            .with_context(|| format!("Symbol _plugin_create not found in {}", path.display()))?;

        // Call _plugin_create with panic isolation
        let raw = catch_unwind(AssertUnwindSafe(|| create_fn()))
            .map_err(|_| anyhow!("Plugin panicked during _plugin_create"))?;

        if raw.is_null() {
            bail!("_plugin_create returned null in {}", path.display());
        }

        // SAFETY: `raw` is the double-boxed plugin from `declare_plugin!` and is
        // reclaimed exactly once. Ownership moves to the host; valid only when
        // host and plugin share the same allocator (same Rust toolchain).
        let plugin = unsafe { *Box::from_raw(raw as *mut Box<dyn Plugin>) };

        if plugin.api_version() != CURRENT_API_VERSION {
            bail!(
                "Plugin '{}' API version {} doesn't match runtime version {}",
                plugin.name(),
                plugin.api_version(),
                CURRENT_API_VERSION
            );
        }

        Ok(Arc::new(Self {
            plugin,
            _library: lib,
        }))
    }

    /// Get immutable reference to the loaded plugin.
    pub fn plugin(&self) -> &dyn Plugin {
        &*self.plugin
    }

    /// Root export with every function pinned to this handle, so the library
    /// stays mapped while any exported function is reachable.
    pub fn exports(self: &Arc<Self>) -> Result<Export> {
        let exports = catch_unwind(AssertUnwindSafe(|| self.plugin.exports()))
            .map_err(|_| anyhow!("Plugin '{}' panicked while exporting", self.plugin.name()))?;
        Ok(pin(exports, self))
    }
}

/// Exported function kept alive together with its library.
/// `inner` drops before `handle`.
struct Pinned {
    inner: ExportFn,
    handle: Arc<PluginHandle>,
}

impl Pinned {
    fn call(&self) -> Result<Export> {
        let out = catch_unwind(AssertUnwindSafe(|| self.inner.call()))
            .map_err(|_| anyhow!("Plugin function '{}' panicked", self.inner.name()))??;
        Ok(pin(out, &self.handle))
    }
}

fn pin(export: Export, handle: &Arc<PluginHandle>) -> Export {
    match export {
        Export::Function(inner) => {
            let name = inner.name().to_string();
            let pinned = Pinned {
                inner,
                handle: handle.clone(),
            };
            Export::function(name, move || pinned.call())
        }
        Export::Object(map) => Export::Object(
            map.into_iter()
                .map(|(key, value)| (key, pin(value, handle)))
                .collect(),
        ),
        value => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_library() {
        let result = PluginHandle::load(Path::new("/nonexistent/libfoo.so"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to load"));
    }

    #[test]
    fn test_load_invalid_library() {
        // Create a file that is not a valid shared library
        let dir = tempfile::tempdir().unwrap();
        let fake_lib = dir.path().join("libfake.so");
        std::fs::write(&fake_lib, b"not a real library").unwrap();

        let result = PluginHandle::load(&fake_lib);
        assert!(result.is_err());
    }
}
