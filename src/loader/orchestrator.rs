//! The load orchestrator.
//!
//! Construction decides whether the cache is cold and, if so, rebuilds it
//! before returning. Only a fully built orchestrator can be registered, so
//! every resolution it serves runs against a complete cache. Resolution is
//! read-only: it never generates, discovers or writes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{Artifact, CacheKey, FsProxyCache, ProxyCache};
use crate::config::ConfigStore;
use crate::host::{Definitions, HookHandle, HookOptions, PathResolver, ResolutionChain, ResolveError, Resolver};
use crate::loader::bootstrap::{Bootstrap, BootstrapComponents, BootstrapOutcome, DefaultComponents};
use crate::loader::state::CacheState;
use crate::loader::LoaderError;
use crate::observability::metrics::{self, ResolutionOutcome};

/// Serves precomputed proxies and falls back to ordinary resolution.
pub struct LoadOrchestrator {
    config: Arc<ConfigStore>,
    cache: FsProxyCache,
    state: CacheState,
    bootstrap: Option<BootstrapOutcome>,
    definitions: Arc<Definitions>,
    fallback: Option<Arc<dyn Resolver>>,
    separator: char,
}

impl std::fmt::Debug for LoadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOrchestrator")
            .field("cache", &self.cache.root())
            .field("state", &self.state)
            .field("bootstrap", &self.bootstrap)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Builder for [`LoadOrchestrator`].
pub struct OrchestratorBuilder {
    config: Arc<ConfigStore>,
    definitions: Arc<Definitions>,
    cache_dir: Option<PathBuf>,
    fallback: Fallback,
    components: Box<dyn BootstrapComponents>,
    force_rebuild: bool,
}

enum Fallback {
    Default,
    Custom(Arc<dyn Resolver>),
    None,
}

impl OrchestratorBuilder {
    /// Use this cache directory instead of the configured `cache-dir`.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Resolver consulted on a cache miss. Defaults to [`PathResolver`].
    pub fn fallback(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.fallback = Fallback::Custom(resolver);
        self
    }

    /// Report cache misses as unresolved instead of consulting a fallback.
    pub fn no_fallback(mut self) -> Self {
        self.fallback = Fallback::None;
        self
    }

    /// Discovery and generator used if a rebuild is needed.
    pub fn components(mut self, components: impl BootstrapComponents + 'static) -> Self {
        self.components = Box::new(components);
        self
    }

    /// Rebuild even if the cache looks warm.
    pub fn force_rebuild(mut self, force: bool) -> Self {
        self.force_rebuild = force;
        self
    }

    /// Open the cache, judge it, rebuild if cold.
    ///
    /// Any failure here is fatal: no orchestrator is returned.
    pub fn build(self) -> Result<LoadOrchestrator, LoaderError> {
        let settings = self.config.config();
        let cache_dir = self.cache_dir.unwrap_or_else(|| settings.cache_dir.clone());
        let cache = FsProxyCache::open(&cache_dir, &settings.artifact_extension)
            .map_err(LoaderError::CacheUnavailable)?;

        let state = CacheState::inspect(&cache, settings.warm_threshold, &settings.environment)?;
        tracing::info!(
            cache_dir = %cache_dir.display(),
            artifacts = state.artifacts,
            environment = %state.environment,
            cold = state.is_cold(),
            "Proxy cache inspected"
        );

        let bootstrap = if state.is_cold() || self.force_rebuild {
            if let Some(reason) = state.reason() {
                tracing::info!(%reason, "Rebuilding proxy cache");
            } else {
                tracing::info!("Forced proxy cache rebuild");
            }
            let outcome = Bootstrap {
                config: &self.config,
                cache: &cache,
                cache_dir: &cache_dir,
                components: self.components.as_ref(),
                force: self.force_rebuild,
            }
            .run()?;
            Some(outcome)
        } else {
            None
        };

        let fallback = match self.fallback {
            Fallback::Default => Some(Arc::new(PathResolver::new(&self.config, self.definitions.clone())) as Arc<dyn Resolver>),
            Fallback::Custom(resolver) => Some(resolver),
            Fallback::None => None,
        };

        Ok(LoadOrchestrator {
            separator: settings.namespace_separator,
            config: self.config,
            cache,
            state,
            bootstrap,
            definitions: self.definitions,
            fallback,
        })
    }
}

impl LoadOrchestrator {
    pub fn builder(config: Arc<ConfigStore>, definitions: Arc<Definitions>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            definitions,
            cache_dir: None,
            fallback: Fallback::Default,
            components: Box::new(DefaultComponents),
            force_rebuild: false,
        }
    }

    /// Construct with default collaborators over `cache_dir`.
    pub fn new(cache_dir: &Path, config: Arc<ConfigStore>, definitions: Arc<Definitions>) -> Result<Self, LoaderError> {
        Self::builder(config, definitions).cache_dir(cache_dir).build()
    }

    /// Remove every hook from `chain` and install this orchestrator as the only one.
    pub fn register(self: &Arc<Self>, chain: &ResolutionChain, options: HookOptions) -> HookHandle {
        let existing = chain.list();
        for handle in &existing {
            chain.remove(*handle);
        }
        if !existing.is_empty() {
            metrics::record_hooks_displaced(existing.len());
            tracing::info!(displaced = existing.len(), "Removed previously registered resolution hooks");
        }

        let hook: Arc<dyn Resolver> = self.clone();
        chain.install(hook, options)
    }

    /// Resolve `name` from the cache, or delegate to the fallback.
    ///
    /// Returns `Ok(true)` if the name is now defined.
    pub fn resolve(&self, name: &str) -> Result<bool, LoaderError> {
        let key = CacheKey::derive(name, self.separator);

        match self.cache.read(&key) {
            Ok(Some(bytes)) => {
                let artifact = Artifact::parse(&bytes, name).map_err(|source| {
                    metrics::record_resolution(ResolutionOutcome::Invalid);
                    LoaderError::CachedArtifactInvalid {
                        name: name.to_string(),
                        path: self.cache.path_for(&key),
                        source,
                    }
                })?;
                self.definitions.define(name, artifact.body());
                metrics::record_resolution(ResolutionOutcome::CacheHit);
                tracing::trace!(name, key = %key, "Resolved from proxy cache");
                return Ok(true);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(name, error = %e, "Cached artifact unreadable, delegating to fallback");
            }
        }

        let Some(fallback) = &self.fallback else {
            metrics::record_resolution(ResolutionOutcome::Miss);
            return Ok(false);
        };

        match fallback.resolve(name) {
            Ok(found) => {
                metrics::record_resolution(if found {
                    ResolutionOutcome::FallbackHit
                } else {
                    ResolutionOutcome::Miss
                });
                Ok(found)
            }
            Err(e) => {
                metrics::record_resolution(ResolutionOutcome::Error);
                Err(e.into())
            }
        }
    }

    pub fn state(&self) -> &CacheState {
        &self.state
    }

    /// What the construction-time bootstrap did, if one ran.
    pub fn bootstrap_outcome(&self) -> Option<&BootstrapOutcome> {
        self.bootstrap.as_ref()
    }

    pub fn cache(&self) -> &FsProxyCache {
        &self.cache
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn definitions(&self) -> &Arc<Definitions> {
        &self.definitions
    }
}

impl Resolver for LoadOrchestrator {
    fn resolve(&self, name: &str) -> Result<bool, ResolveError> {
        LoadOrchestrator::resolve(self, name).map_err(|e| match e {
            LoaderError::Fallback(inner) => inner,
            other => ResolveError::new(name, other),
        })
    }
}
