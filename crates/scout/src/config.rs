use anyhow::{Context, Result};
use scout_runtime::{ConfigOverrides, DiscoveryConfig};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::DiscoverArgs;

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<DiscoveryConfig> {
    let Some(path) = path else {
        return Ok(DiscoveryConfig::default());
    };

    let content =
        fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
    let mut overrides =
        ConfigOverrides::from_toml(&content).context("Failed to parse TOML config")?;

    if let Some(paths) = overrides.search_paths.take() {
        let expanded = paths
            .iter()
            .map(|p| expand_path(&p.to_string_lossy()))
            .collect::<Result<Vec<_>>>()?;
        overrides.search_paths = Some(expanded);
    }

    Ok(DiscoveryConfig::from_overrides(overrides)?)
}

/// Command-line flags win over the config file
pub fn apply_args(mut config: DiscoveryConfig, args: &DiscoverArgs) -> Result<DiscoveryConfig> {
    if let Some(prefix) = &args.prefix {
        config = config.with_prefix(prefix);
    }
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy.into());
    }
    if let Some(property) = &args.key_property {
        config = config.with_key_property(property);
    }
    for path in &args.search_paths {
        config = config.with_search_path(expand_path(path)?);
    }
    if args.no_cwd {
        config = config.discover_cwd(false);
    }
    if args.no_global {
        config = config.discover_global(false);
    }
    if let Some(named) = &args.import_named {
        config = config.import_named(named);
    }
    if let Some(fallback) = &args.named_fallback {
        config = config.named_fallback(fallback);
    }
    Ok(config)
}

/// Expand `~` and `$VAR` in a search path
fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw).context(format!("Failed to expand path: {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
