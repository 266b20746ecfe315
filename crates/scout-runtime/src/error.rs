use std::path::PathBuf;

use thiserror::Error;

/// Every way a discovery run can fail. A failed run never yields a dictionary.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A required named export, or its fallback, is missing from a plugin.
    #[error(
        "Plugin '{plugin}' doesn't export a named {kind}property '{export}'",
        kind = fallback_label(.fallback)
    )]
    ExportNotFound {
        plugin: String,
        export: String,
        fallback: bool,
    },

    #[error("Invalid strategy '{0}' used")]
    InvalidStrategy(String),

    /// The loading primitive itself failed; the source is kept verbatim.
    #[error("Failed to load plugin '{name}'")]
    ModuleLoad {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Could not locate '{binary}' to derive the global plugin path")]
    GlobalPathResolution {
        binary: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to enumerate plugin directory {dir:?}")]
    Enumerate {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Strategy '{strategy}' requires a dictionary key property")]
    KeyPropertyUnset { strategy: String },

    #[error("Plugin '{plugin}' has no key property '{property}'")]
    KeyPropertyMissing { plugin: String, property: String },

    #[error("Key property '{property}' of plugin '{plugin}' is not callable")]
    KeyNotCallable { plugin: String, property: String },

    #[error("Key property '{property}' of plugin '{plugin}' did not produce a string key")]
    KeyNotString { plugin: String, property: String },

    #[error("Key method '{property}' of plugin '{plugin}' failed")]
    KeyMethodFailed {
        plugin: String,
        property: String,
        #[source]
        source: anyhow::Error,
    },

    /// A configure hook (or one of the named configurers) failed.
    #[error("Configurer '{name}' failed")]
    Configure {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid discovery config: {0}")]
    Config(String),

    #[error("Plugin loading task failed")]
    Join(#[from] tokio::task::JoinError),
}

fn fallback_label(fallback: &bool) -> &'static str {
    if *fallback {
        "(fallback) "
    } else {
        ""
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_not_found_messages() {
        let named = DiscoveryError::ExportNotFound {
            plugin: "sx-foo".into(),
            export: "factory".into(),
            fallback: false,
        };
        assert_eq!(
            named.to_string(),
            "Plugin 'sx-foo' doesn't export a named property 'factory'"
        );

        let fallback = DiscoveryError::ExportNotFound {
            plugin: "sx-foo".into(),
            export: "default".into(),
            fallback: true,
        };
        assert!(fallback.to_string().contains("(fallback) property 'default'"));
    }

    #[test]
    fn test_invalid_strategy_names_value() {
        let err = DiscoveryError::InvalidStrategy("bogus".into());
        assert_eq!(err.to_string(), "Invalid strategy 'bogus' used");
    }
}
