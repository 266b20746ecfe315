//! Discovery configuration: documented defaults plus partial overrides.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::configure::Configurer;
use crate::error::{DiscoveryError, Result};
use crate::strategy::KeyStrategy;

pub const DEFAULT_PREFIX: &str = "sx";
pub const DEFAULT_MODULES_DIR: &str = "node_modules";
pub const DEFAULT_GLOBAL_BINARY: &str = "npm";

/// Resolved configuration for one discovery run.
#[derive(Clone)]
pub struct DiscoveryConfig {
    prefix: String,
    pub key_strategy: KeyStrategy,
    pub key_property: Option<String>,
    pub search_paths: Vec<PathBuf>,
    pub discover_global: bool,
    pub discover_cwd: bool,
    pub import_named: Option<String>,
    pub named_fallback: Option<String>,
    /// Named configurers, invoked in registration order by the default hook
    pub configurers: Vec<(String, Arc<dyn Configurer>)>,
    /// Replaces the default hook when set
    pub configure: Option<Arc<dyn Configurer>>,
    /// Directory name appended to the cwd and to the global lib root
    pub modules_dir: String,
    /// Package-manager binary used to locate the global plugin root
    pub global_binary: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            key_strategy: KeyStrategy::ModuleName,
            key_property: None,
            search_paths: Vec::new(),
            discover_global: true,
            discover_cwd: true,
            import_named: None,
            named_fallback: None,
            configurers: Vec::new(),
            configure: None,
            modules_dir: DEFAULT_MODULES_DIR.to_string(),
            global_binary: DEFAULT_GLOBAL_BINARY.to_string(),
        }
    }
}

impl fmt::Debug for DiscoveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configurers: Vec<&str> = self.configurers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("DiscoveryConfig")
            .field("prefix", &self.prefix)
            .field("key_strategy", &self.key_strategy)
            .field("key_property", &self.key_property)
            .field("search_paths", &self.search_paths)
            .field("discover_global", &self.discover_global)
            .field("discover_cwd", &self.discover_cwd)
            .field("import_named", &self.import_named)
            .field("named_fallback", &self.named_fallback)
            .field("configurers", &configurers)
            .field("custom_configure", &self.configure.is_some())
            .field("modules_dir", &self.modules_dir)
            .field("global_binary", &self.global_binary)
            .finish()
    }
}

/// Strip exactly one trailing dash.
fn normalize_prefix(prefix: &str) -> String {
    prefix.strip_suffix('-').unwrap_or(prefix).to_string()
}

impl DiscoveryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge overrides onto the defaults.
    pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self> {
        Self::default().merge(overrides)
    }

    /// Load overrides from a TOML file. Keys may sit at top level or under `[discovery]`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiscoveryError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        let overrides = ConfigOverrides::from_toml(&content)
            .map_err(|e| DiscoveryError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
        Self::from_overrides(overrides)
    }

    /// Apply every field the overrides set. The strategy is parsed here.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(prefix) = overrides.prefix {
            self.prefix = prefix;
        }
        if let Some(strategy) = overrides.dictionary_key_strategy {
            self.key_strategy = strategy.parse()?;
        }
        if let Some(property) = overrides.dictionary_key_property {
            self.key_property = Some(property);
        }
        if let Some(paths) = overrides.search_paths {
            self.search_paths = paths;
        }
        if let Some(global) = overrides.discover_global {
            self.discover_global = global;
        }
        if let Some(cwd) = overrides.discover_cwd {
            self.discover_cwd = cwd;
        }
        if let Some(named) = overrides.import_named {
            self.import_named = named.into_name("import_named")?;
        }
        if let Some(fallback) = overrides.named_fallback {
            self.named_fallback = fallback.into_name("named_fallback")?;
        }
        if let Some(dir) = overrides.modules_dir {
            self.modules_dir = dir;
        }
        if let Some(binary) = overrides.global_binary {
            self.global_binary = binary;
        }

        self.prefix = normalize_prefix(&self.prefix);
        Ok(self)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn with_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.prefix = normalize_prefix(prefix.as_ref());
        self
    }

    pub fn with_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    pub fn with_key_property(mut self, property: impl Into<String>) -> Self {
        self.key_property = Some(property.into());
        self
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    pub fn discover_global(mut self, enabled: bool) -> Self {
        self.discover_global = enabled;
        self
    }

    pub fn discover_cwd(mut self, enabled: bool) -> Self {
        self.discover_cwd = enabled;
        self
    }

    pub fn import_named(mut self, export: impl Into<String>) -> Self {
        self.import_named = Some(export.into());
        self
    }

    pub fn named_fallback(mut self, export: impl Into<String>) -> Self {
        self.named_fallback = Some(export.into());
        self
    }

    pub fn with_configurer(
        mut self,
        name: impl Into<String>,
        configurer: Arc<dyn Configurer>,
    ) -> Self {
        self.configurers.push((name.into(), configurer));
        self
    }

    pub fn with_configure(mut self, configure: Arc<dyn Configurer>) -> Self {
        self.configure = Some(configure);
        self
    }
}

/// An export name, or `false` to disable the lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportName {
    Name(String),
    Flag(bool),
}

impl ExportName {
    fn into_name(self, field: &str) -> Result<Option<String>> {
        match self {
            ExportName::Name(name) if !name.is_empty() => Ok(Some(name)),
            ExportName::Name(_) | ExportName::Flag(false) => Ok(None),
            ExportName::Flag(true) => Err(DiscoveryError::Config(format!(
                "{} must be an export name or false",
                field
            ))),
        }
    }
}

/// Partial configuration; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub prefix: Option<String>,
    pub dictionary_key_strategy: Option<String>,
    pub dictionary_key_property: Option<String>,
    pub search_paths: Option<Vec<PathBuf>>,
    pub discover_global: Option<bool>,
    pub discover_cwd: Option<bool>,
    pub import_named: Option<ExportName>,
    pub named_fallback: Option<ExportName>,
    pub modules_dir: Option<String>,
    pub global_binary: Option<String>,
}

impl ConfigOverrides {
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut value: toml::Table = toml::from_str(content)?;
        match value.remove("discovery") {
            Some(section @ toml::Value::Table(_)) => section.try_into(),
            Some(other) => {
                value.insert("discovery".to_string(), other);
                toml::Value::Table(value).try_into()
            }
            None => toml::Value::Table(value).try_into(),
        }
    }
}
