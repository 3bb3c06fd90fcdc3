//! Single-writer cache bootstrap.
//!
//! # Responsibilities
//! - Serialize rebuilds across processes through the rebuild lock
//! - Re-judge the cache once the lock is held; a peer may have warmed it
//! - Regenerate every proxy in place, then prune artifacts no structure produced
//! - Abort on the first generation failure and leave the cache cold
//!
//! # Design Decisions
//! - Discovery is eager; generation starts only once the full set is known
//! - Discovery and generator live only for the duration of one rebuild
//! - Artifacts are overwritten atomically, never cleared up front, so
//!   workers already serving from the cache keep hitting it during a rebuild

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::cache::{CacheKey, FsProxyCache, ProxyCache};
use crate::config::ConfigStore;
use crate::discovery::{FsDiscovery, StructureDiscovery};
use crate::generator::{PassthroughGenerator, ProxyGenerator};
use crate::loader::lock::BootstrapLock;
use crate::loader::state::CacheState;
use crate::loader::LoaderError;
use crate::observability::metrics;

/// Builds the collaborators a rebuild needs.
///
/// The default wires [`FsDiscovery`] and [`PassthroughGenerator`]; tests and
/// embedders swap in their own.
pub trait BootstrapComponents: Send + Sync {
    fn discovery(&self, config: &ConfigStore) -> Box<dyn StructureDiscovery>;

    fn generator<'a>(
        &self,
        source: &'a dyn StructureDiscovery,
        cache: &'a dyn ProxyCache,
        config: &ConfigStore,
    ) -> Box<dyn ProxyGenerator + 'a>;
}

/// File-system discovery plus the pass-through generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultComponents;

impl BootstrapComponents for DefaultComponents {
    fn discovery(&self, config: &ConfigStore) -> Box<dyn StructureDiscovery> {
        Box::new(FsDiscovery::new(&config.config().project_dirs, config))
    }

    fn generator<'a>(
        &self,
        source: &'a dyn StructureDiscovery,
        cache: &'a dyn ProxyCache,
        config: &ConfigStore,
    ) -> Box<dyn ProxyGenerator + 'a> {
        Box::new(PassthroughGenerator::new(source, cache, config.config().namespace_separator))
    }
}

/// What a bootstrap did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// This instance rebuilt the cache.
    Rebuilt {
        id: Uuid,
        structures: usize,
        /// Stale artifacts removed because no structure produced them.
        pruned: usize,
        elapsed: Duration,
    },
    /// Another process warmed the cache before this one got the lock.
    Skipped { artifacts: usize },
}

pub(crate) struct Bootstrap<'a> {
    pub config: &'a ConfigStore,
    pub cache: &'a FsProxyCache,
    pub cache_dir: &'a Path,
    pub components: &'a dyn BootstrapComponents,
    /// Rebuild even if the cache is warm once the lock is held.
    pub force: bool,
}

impl Bootstrap<'_> {
    /// Take the rebuild lock (if enabled) and rebuild, unless a peer already did.
    pub fn run(&self) -> Result<BootstrapOutcome, LoaderError> {
        let id = Uuid::new_v4();
        let config = self.config.config();
        let lock_config = &config.bootstrap_lock;

        if !lock_config.enabled {
            return self.rebuild(id);
        }

        let acquired = BootstrapLock::acquire(
            self.cache_dir,
            Duration::from_millis(lock_config.wait_ms),
            Duration::from_millis(lock_config.poll_ms),
        )?;
        let _lock = acquired.lock;

        // The cold verdict that got us here predates the lock.
        if !self.force {
            let state = CacheState::inspect(self.cache, config.warm_threshold, &config.environment)?;
            if !state.is_cold() {
                tracing::info!(
                    artifacts = state.artifacts,
                    waited = acquired.contended,
                    "Cache warmed by another process, skipping rebuild"
                );
                return Ok(BootstrapOutcome::Skipped {
                    artifacts: state.artifacts,
                });
            }
        }

        self.rebuild(id)
    }

    fn rebuild(&self, id: Uuid) -> Result<BootstrapOutcome, LoaderError> {
        let started = Instant::now();
        let span = tracing::info_span!("bootstrap", bootstrap_id = %id);
        let _enter = span.enter();

        let result = self.populate();
        match &result {
            Ok((structures, pruned)) => {
                metrics::record_bootstrap(true, *structures);
                tracing::info!(
                    structures,
                    pruned,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Proxy cache rebuilt"
                );
            }
            Err(e) => {
                metrics::record_bootstrap(false, 0);
                tracing::error!(error = %e, "Bootstrap failed");
                // A partial cache must not look warm to the next start.
                if let Err(clear_err) = self.cache.clear() {
                    tracing::error!(error = %clear_err, "Failed to clear partially built cache");
                }
            }
        }

        let (structures, pruned) = result?;
        Ok(BootstrapOutcome::Rebuilt {
            id,
            structures,
            pruned,
            elapsed: started.elapsed(),
        })
    }

    fn populate(&self) -> Result<(usize, usize), LoaderError> {
        let separator = self.config.config().namespace_separator;
        let discovery = self.components.discovery(self.config);
        let structures = discovery.list_all()?;
        tracing::info!(count = structures.len(), "Generating proxies");

        let generator = self.components.generator(discovery.as_ref(), self.cache, self.config);
        let mut produced = HashSet::with_capacity(structures.len());
        for structure in &structures {
            generator
                .generate_proxy_for(structure.identity())
                .map_err(|cause| LoaderError::BootstrapFailed {
                    identity: structure.identity().clone(),
                    cause,
                })?;
            produced.insert(CacheKey::derive(structure.identity().as_str(), separator));
        }

        let pruned = self.cache.prune(&produced).map_err(LoaderError::Cache)?;
        Ok((structures.len(), pruned))
    }
}
