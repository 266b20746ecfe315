use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{DiscoveryError, Result};

/// Locates the package manager's global plugin directory.
#[async_trait]
pub trait GlobalPathResolver: Send + Sync {
    fn resolve(&self) -> Result<PathBuf>;

    async fn resolve_async(&self) -> Result<PathBuf>;
}

/// Resolves a binary on `PATH` and derives `<bin>/../../lib/<modules_dir>`.
#[derive(Debug, Clone)]
pub struct WhichResolver {
    binary: String,
    modules_dir: String,
}

impl WhichResolver {
    pub fn new(binary: impl Into<String>, modules_dir: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            modules_dir: modules_dir.into(),
        }
    }

    fn lookup(binary: &str, modules_dir: &str) -> Result<PathBuf> {
        let bin = which::which(binary).map_err(|e| DiscoveryError::GlobalPathResolution {
            binary: binary.to_string(),
            source: e.into(),
        })?;
        Ok(global_root(&bin, modules_dir))
    }
}

#[async_trait]
impl GlobalPathResolver for WhichResolver {
    fn resolve(&self) -> Result<PathBuf> {
        Self::lookup(&self.binary, &self.modules_dir)
    }

    async fn resolve_async(&self) -> Result<PathBuf> {
        let binary = self.binary.clone();
        let modules_dir = self.modules_dir.clone();
        tokio::task::spawn_blocking(move || Self::lookup(&binary, &modules_dir))
            .await
            .map_err(|e| DiscoveryError::GlobalPathResolution {
                binary: self.binary.clone(),
                source: e.into(),
            })?
    }
}

/// Fixed global directory, for hosts that already know it.
#[derive(Debug, Clone)]
pub struct FixedGlobalPath(pub PathBuf);

#[async_trait]
impl GlobalPathResolver for FixedGlobalPath {
    fn resolve(&self) -> Result<PathBuf> {
        Ok(self.0.clone())
    }

    async fn resolve_async(&self) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}

/// `/usr/local/bin/npm` with `node_modules` becomes `/usr/local/lib/node_modules`.
pub fn global_root(binary_path: &Path, modules_dir: &str) -> PathBuf {
    let install_root = binary_path
        .parent()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("/"));
    install_root.join("lib").join(modules_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_root_two_levels_up() {
        assert_eq!(
            global_root(Path::new("/usr/local/bin/npm"), "node_modules"),
            PathBuf::from("/usr/local/lib/node_modules")
        );
        assert_eq!(
            global_root(Path::new("/opt/tool/bin/pm"), "plugins"),
            PathBuf::from("/opt/tool/lib/plugins")
        );
    }

    #[test]
    fn test_missing_binary_is_resolution_failure() {
        let resolver = WhichResolver::new("plugscout-no-such-binary-4f1c", "node_modules");
        let err = resolver.resolve().unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::GlobalPathResolution { ref binary, .. }
                if binary == "plugscout-no-such-binary-4f1c"
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_async() {
        let resolver = WhichResolver::new("plugscout-no-such-binary-4f1c", "node_modules");
        assert!(matches!(
            resolver.resolve_async().await,
            Err(DiscoveryError::GlobalPathResolution { .. })
        ));
    }

    #[tokio::test]
    async fn test_fixed_path() {
        let resolver = FixedGlobalPath(PathBuf::from("/srv/plugins"));
        assert_eq!(resolver.resolve().unwrap(), PathBuf::from("/srv/plugins"));
        assert_eq!(resolver.resolve_async().await.unwrap(), PathBuf::from("/srv/plugins"));
    }
}
