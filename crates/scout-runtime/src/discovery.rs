//! Discovery runs: path assembly → enumeration → loading → dictionary assembly.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::DiscoveryConfig;
use crate::configure::run_configure;
use crate::enumerate::{enumerate_candidates, enumerate_candidates_async};
use crate::error::Result;
use crate::export::Export;
use crate::global::{GlobalPathResolver, WhichResolver};
use crate::module::{load_plugin, ExtractRules, ModuleLoader};
use crate::paths::{assemble_paths, PathInputs, SearchPathSet, SearchPathState};
use crate::strategy::KeyStrategy;

/// Derived key → imported export
pub type Dictionary = BTreeMap<String, Export>;

/// Derived key → raw root export
pub type Roots = BTreeMap<String, Export>;

/// Entry point: holds the host capabilities a run needs.
///
/// ```ignore
/// let discoverer = Discoverer::new(Arc::new(ManifestLoader::new()));
/// let config = DiscoveryConfig::new()
///     .with_prefix("test-prefix")
///     .with_strategy(KeyStrategy::StripPrefix);
/// let plugins = discoverer.discover_sync(config)?;
/// ```
#[derive(Clone)]
pub struct Discoverer {
    loader: Arc<dyn ModuleLoader>,
    global: Option<Arc<dyn GlobalPathResolver>>,
    search_state: SearchPathState,
    cwd: Option<PathBuf>,
}

impl Discoverer {
    /// Uses a `which`-based global resolver, a search-path state seeded from
    /// the environment, and the process working directory.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            global: None,
            search_state: SearchPathState::from_env(),
            cwd: None,
        }
    }

    pub fn with_global_resolver(mut self, resolver: Arc<dyn GlobalPathResolver>) -> Self {
        self.global = Some(resolver);
        self
    }

    pub fn with_search_state(mut self, state: SearchPathState) -> Self {
        self.search_state = state;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn search_state(&self) -> &SearchPathState {
        &self.search_state
    }

    /// Fresh session for one run, for callers that need roots or candidates.
    pub fn session(&self, config: DiscoveryConfig) -> DiscoverySession {
        DiscoverySession {
            discoverer: self.clone(),
            config,
            paths: SearchPathSet::default(),
            candidates: Vec::new(),
            dictionary: Dictionary::new(),
            roots: Roots::new(),
        }
    }

    /// Blocking discovery.
    pub fn discover_sync(&self, config: DiscoveryConfig) -> Result<Dictionary> {
        let mut session = self.session(config);
        session.run_sync()?;
        Ok(session.into_dictionary())
    }

    /// Non-blocking discovery; same results as [`Discoverer::discover_sync`].
    pub async fn discover(&self, config: DiscoveryConfig) -> Result<Dictionary> {
        let mut session = self.session(config);
        session.run().await?;
        Ok(session.into_dictionary())
    }

    fn global_resolver(&self, config: &DiscoveryConfig) -> Arc<dyn GlobalPathResolver> {
        match &self.global {
            Some(resolver) => resolver.clone(),
            None => Arc::new(WhichResolver::new(
                config.global_binary.clone(),
                config.modules_dir.clone(),
            )),
        }
    }

    fn cwd(&self) -> PathBuf {
        self.cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// State of one discovery run.
pub struct DiscoverySession {
    discoverer: Discoverer,
    config: DiscoveryConfig,
    paths: SearchPathSet,
    candidates: Vec<String>,
    dictionary: Dictionary,
    roots: Roots,
}

impl DiscoverySession {
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn paths(&self) -> &SearchPathSet {
        &self.paths
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn into_dictionary(self) -> Dictionary {
        self.dictionary
    }

    pub fn run_sync(&mut self) -> Result<()> {
        let extra_paths = if self.config.discover_global {
            vec![self.discoverer.global_resolver(&self.config).resolve()?]
        } else {
            Vec::new()
        };

        if !self.assemble(&extra_paths) {
            return Ok(());
        }

        let candidates = enumerate_candidates(&self.paths, self.config.prefix())?;
        self.build_dictionary(candidates)
    }

    /// Async run. Enumeration uses `tokio::fs`; loading and dictionary
    /// assembly run on the blocking pool.
    pub async fn run(&mut self) -> Result<()> {
        let extra_paths = if self.config.discover_global {
            vec![self.discoverer.global_resolver(&self.config).resolve_async().await?]
        } else {
            Vec::new()
        };

        if !self.assemble(&extra_paths) {
            return Ok(());
        }

        let candidates = enumerate_candidates_async(&self.paths, self.config.prefix()).await?;

        // Loaders touch the filesystem and may dlopen, so assembly runs on the
        // blocking pool. A failed task leaves the session empty.
        let placeholder = self.discoverer.session(self.config.clone());
        let mut session = std::mem::replace(self, placeholder);
        let (session, result) = tokio::task::spawn_blocking(move || {
            let result = session.build_dictionary(candidates);
            (session, result)
        })
        .await?;
        *self = session;
        result
    }

    /// Returns false when there is nothing to scan.
    fn assemble(&mut self, extra_paths: &[PathBuf]) -> bool {
        let cwd = self.discoverer.cwd();
        self.paths = assemble_paths(
            PathInputs {
                search_paths: &self.config.search_paths,
                extra_paths,
                discover_cwd: self.config.discover_cwd,
                cwd: &cwd,
                modules_dir: &self.config.modules_dir,
            },
            &self.discoverer.search_state,
        );

        if self.paths.is_empty() {
            debug!("No search paths configured, skipping discovery");
            return false;
        }
        true
    }

    /// Load, key, configure and store each candidate in order. Any failure
    /// aborts the run and leaves the dictionary empty.
    pub fn build_dictionary(&mut self, candidates: Vec<String>) -> Result<()> {
        self.candidates = candidates;

        let result = self.assemble_entries();
        if result.is_err() {
            self.dictionary.clear();
            self.roots.clear();
        }
        result
    }

    fn assemble_entries(&mut self) -> Result<()> {
        let config = &self.config;
        let rules = ExtractRules {
            import_named: config.import_named.as_deref(),
            named_fallback: config.named_fallback.as_deref(),
        };

        for name in &self.candidates {
            let loaded = load_plugin(self.discoverer.loader.as_ref(), name, &self.paths, rules)?;
            let key = config.key_strategy.derive_key(
                name,
                &loaded.imported,
                config.prefix(),
                config.key_property.as_deref(),
            )?;

            run_configure(
                config.configure.as_ref(),
                &config.configurers,
                key.as_deref(),
                &loaded.imported,
                &loaded.root,
            )?;

            if config.key_strategy == KeyStrategy::Custom {
                continue;
            }
            let Some(key) = key else {
                continue;
            };

            debug!(plugin = %name, key = %key, "Plugin registered");
            if self.dictionary.insert(key.clone(), loaded.imported).is_some() {
                debug!(plugin = %name, key = %key, "Dictionary key overwritten");
            }
            self.roots.insert(key, loaded.root);
        }

        info!(
            prefix = %config.prefix(),
            strategy = %config.key_strategy,
            candidates = self.candidates.len(),
            plugins = self.dictionary.len(),
            "Plugin discovery complete"
        );

        Ok(())
    }
}
