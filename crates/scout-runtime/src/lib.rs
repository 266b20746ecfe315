pub mod config;
pub mod configure;
pub mod discovery;
pub mod enumerate;
pub mod error;
pub mod export;
pub mod global;
pub mod module;
pub mod paths;
pub mod plugin;
pub mod strategy;

pub use config::{ConfigOverrides, DiscoveryConfig, ExportName};
pub use configure::Configurer;
pub use discovery::{Dictionary, Discoverer, DiscoverySession, Roots};
pub use error::DiscoveryError;
pub use export::{Export, ExportFn};
pub use global::{FixedGlobalPath, GlobalPathResolver, WhichResolver};
pub use module::{LoadedPlugin, ModuleLoader, RegistryLoader};
pub use paths::{SearchPathSet, SearchPathState, SEARCH_PATH_VAR};
pub use plugin::{ManifestLoader, Plugin, PluginHandle, PluginManifest};
pub use strategy::KeyStrategy;

/// Initialize structured JSON logging (stderr, filtered by `RUST_LOG`)
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
