//! Module loading capability and named-export extraction.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;

use crate::error::{DiscoveryError, Result};
use crate::export::Export;
use crate::paths::SearchPathSet;

/// Resolves a candidate name to its root export.
///
/// `paths` is the run's search path set; implementations resolve names
/// against it in order. Loading may run plugin initialization code.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, name: &str, paths: &SearchPathSet) -> anyhow::Result<Export>;
}

/// A plugin's raw root export and the value extracted from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlugin {
    pub root: Export,
    pub imported: Export,
}

/// Named-export rules applied to a loaded root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractRules<'a> {
    pub import_named: Option<&'a str>,
    pub named_fallback: Option<&'a str>,
}

/// Load `name` and apply `rules`. Loader failures become [`DiscoveryError::ModuleLoad`].
pub fn load_plugin(
    loader: &dyn ModuleLoader,
    name: &str,
    paths: &SearchPathSet,
    rules: ExtractRules<'_>,
) -> Result<LoadedPlugin> {
    let root = loader
        .load(name, paths)
        .map_err(|source| DiscoveryError::ModuleLoad {
            name: name.to_string(),
            source,
        })?;
    extract_exports(name, root, rules)
}

pub fn extract_exports(
    plugin: &str,
    root: Export,
    rules: ExtractRules<'_>,
) -> Result<LoadedPlugin> {
    if let Some(named) = rules.import_named {
        if let Some(imported) = root.get_present(named) {
            return Ok(LoadedPlugin {
                imported: imported.clone(),
                root,
            });
        }
        if rules.named_fallback.is_none() {
            return Err(DiscoveryError::ExportNotFound {
                plugin: plugin.to_string(),
                export: named.to_string(),
                fallback: false,
            });
        }
    }

    if let Some(fallback) = rules.named_fallback {
        if root.is_object() {
            let imported = root
                .get_present(fallback)
                .cloned()
                .ok_or_else(|| DiscoveryError::ExportNotFound {
                    plugin: plugin.to_string(),
                    export: fallback.to_string(),
                    fallback: true,
                })?;
            return Ok(LoadedPlugin { imported, root });
        }
    }

    Ok(LoadedPlugin {
        imported: root.clone(),
        root,
    })
}

type Factory = Arc<dyn Fn() -> anyhow::Result<Export> + Send + Sync>;

/// Build-time plugin registry: names map to factories producing the root export.
///
/// Filesystem enumeration still decides which names are candidates; the
/// registry only supplies their exports.
#[derive(Default, Clone)]
pub struct RegistryLoader {
    factories: HashMap<String, Factory>,
}

impl RegistryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Export> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl ModuleLoader for RegistryLoader {
    fn load(&self, name: &str, _paths: &SearchPathSet) -> anyhow::Result<Export> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| anyhow!("Cannot find module '{}'", name))?;
        factory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn rules<'a>(
        import_named: Option<&'a str>,
        named_fallback: Option<&'a str>,
    ) -> ExtractRules<'a> {
        ExtractRules {
            import_named,
            named_fallback,
        }
    }

    fn module() -> Export {
        Export::object([
            ("factory", Export::from("the-factory")),
            ("default", Export::from("the-default")),
        ])
    }

    #[test]
    fn test_no_rules_imports_root() {
        let loaded = extract_exports("sx-a", module(), rules(None, None)).unwrap();
        assert_eq!(loaded.imported, loaded.root);
    }

    #[test]
    fn test_import_named_present() {
        let loaded = extract_exports("sx-a", module(), rules(Some("factory"), None)).unwrap();
        assert_eq!(loaded.imported, Export::from("the-factory"));
        assert_eq!(loaded.root, module());
    }

    #[test]
    fn test_import_named_missing_without_fallback() {
        let err = extract_exports("sx-a", module(), rules(Some("builder"), None)).unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::ExportNotFound { ref export, fallback: false, .. }
                if export == "builder"
        ));
    }

    #[test]
    fn test_import_named_missing_uses_fallback() {
        let loaded =
            extract_exports("sx-a", module(), rules(Some("builder"), Some("default"))).unwrap();
        assert_eq!(loaded.imported, Export::from("the-default"));
    }

    #[test]
    fn test_fallback_missing() {
        let err =
            extract_exports("sx-a", module(), rules(Some("builder"), Some("main"))).unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::ExportNotFound { ref export, fallback: true, .. } if export == "main"
        ));
    }

    #[test]
    fn test_fallback_only_applies_to_objects() {
        let root = Export::function("CakeMaker", || Ok(Export::from("cake")));
        let loaded =
            extract_exports("sx-cake", root.clone(), rules(None, Some("default"))).unwrap();
        assert_eq!(loaded.imported, root);
    }

    #[test]
    fn test_falsy_named_export_counts_as_missing() {
        let root = Export::object([("factory", Export::from(Value::Null))]);
        assert!(extract_exports("sx-a", root, rules(Some("factory"), None)).is_err());
    }

    #[test]
    fn test_empty_string_and_zero_named_exports_count_as_missing() {
        for value in [Export::from(""), Export::from(serde_json::json!(0))] {
            let root = Export::object([("factory", value)]);
            let err = extract_exports("sx-a", root, rules(Some("factory"), None)).unwrap_err();
            assert!(matches!(
                err,
                DiscoveryError::ExportNotFound { ref export, fallback: false, .. }
                    if export == "factory"
            ));
        }
    }

    #[test]
    fn test_falsy_named_export_falls_through_to_fallback() {
        let root = Export::object([
            ("factory", Export::from(serde_json::json!(0))),
            ("default", Export::from("the-default")),
        ]);
        let loaded =
            extract_exports("sx-a", root, rules(Some("factory"), Some("default"))).unwrap();
        assert_eq!(loaded.imported, Export::from("the-default"));
    }

    #[test]
    fn test_registry_loader() {
        let loader = RegistryLoader::new().register("sx-bacon", || Ok(Export::from("bacon")));
        let paths = SearchPathSet::default();

        assert!(loader.contains("sx-bacon"));
        assert_eq!(loader.load("sx-bacon", &paths).unwrap(), Export::from("bacon"));

        let err = load_plugin(&loader, "sx-missing", &paths, ExtractRules::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::ModuleLoad { ref name, .. } if name == "sx-missing"));
    }
}
