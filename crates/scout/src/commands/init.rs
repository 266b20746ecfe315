use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# plugscout configuration
[discovery]
# Plugins are entries named "<prefix>-*" in the search paths
prefix = "sx"

# module_name | strip_prefix | property | method | custom
dictionary_key_strategy = "module_name"
# dictionary_key_property = "name"

# Scanned after <cwd>/<modules_dir>, before the global directory
search_paths = []
discover_cwd = true
discover_global = true

# Export to import from each plugin, or false for the whole module
import_named = false
named_fallback = false

modules_dir = "node_modules"
global_binary = "npm"
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_runtime::{ConfigOverrides, DiscoveryConfig, KeyStrategy};

    #[test]
    fn test_default_config_parses_to_defaults() {
        let overrides = ConfigOverrides::from_toml(DEFAULT_CONFIG).unwrap();
        let config = DiscoveryConfig::from_overrides(overrides).unwrap();
        assert_eq!(config.prefix(), "sx");
        assert_eq!(config.key_strategy, KeyStrategy::ModuleName);
        assert!(config.import_named.is_none());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scout.toml");

        run_init(&path).unwrap();
        assert!(path.exists());
        assert!(run_init(&path).is_err());
    }
}
