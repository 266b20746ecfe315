pub mod ffi_bridge;
pub mod loader;
pub mod manifest;
pub mod plugin_trait;

pub use ffi_bridge::PluginHandle;
pub use loader::ManifestLoader;
pub use manifest::{PluginManifest, MANIFEST_FILE};
pub use plugin_trait::Plugin;
