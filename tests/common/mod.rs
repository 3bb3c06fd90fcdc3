//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use contract_loader::cache::{Artifact, CacheKey, FsProxyCache, ProxyCache};
use contract_loader::config::{ConfigStore, Environment, LoaderConfig};
use contract_loader::discovery::{StructureDiscovery, StructureIdentity};
use contract_loader::generator::{GenerationError, ProxyGenerator};
use contract_loader::host::{ResolveError, Resolver};
use contract_loader::loader::{BootstrapComponents, DefaultComponents};
use tempfile::TempDir;

/// A project directory and an empty cache directory.
pub struct Fixture {
    pub project: TempDir,
    pub cache: TempDir,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        Self {
            project: tempfile::tempdir().unwrap(),
            cache: tempfile::tempdir().unwrap(),
        }
    }

    /// Write the source file for a `\`-separated structure name.
    pub fn add_structure(&self, name: &str, body: &str) -> PathBuf {
        let mut path = self.project.path().to_path_buf();
        for segment in name.split('\\') {
            path.push(segment);
        }
        path.set_extension("src");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    pub fn config(&self, environment: Environment) -> Arc<ConfigStore> {
        self.config_with(environment, |_| {})
    }

    pub fn config_with(&self, environment: Environment, tweak: impl FnOnce(&mut LoaderConfig)) -> Arc<ConfigStore> {
        let mut config = LoaderConfig {
            environment,
            project_dirs: vec![self.project.path().to_path_buf()],
            cache_dir: self.cache.path().to_path_buf(),
            ..LoaderConfig::default()
        };
        tweak(&mut config);
        Arc::new(ConfigStore::from_config(config).unwrap())
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache.path()
    }

    pub fn open_cache(&self) -> FsProxyCache {
        FsProxyCache::open(self.cache.path(), "proxy").unwrap()
    }

    /// Put a valid artifact straight into the cache, bypassing any generator.
    pub fn seed_artifact(&self, name: &str, body: &str) {
        let artifact = Artifact::new(StructureIdentity::from(name), body);
        self.open_cache()
            .write(&CacheKey::derive(name, '\\'), artifact.render().as_bytes())
            .unwrap();
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.open_cache().path_for(&CacheKey::derive(name, '\\'))
    }
}

/// Default components that count how often a rebuild asks for discovery.
#[derive(Clone, Default)]
pub struct CountingComponents {
    pub rebuilds: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingComponents {
    pub fn rebuilds(&self) -> usize {
        self.rebuilds.load(Ordering::SeqCst)
    }
}

impl BootstrapComponents for CountingComponents {
    fn discovery(&self, config: &ConfigStore) -> Box<dyn StructureDiscovery> {
        self.rebuilds.fetch_add(1, Ordering::SeqCst);
        DefaultComponents.discovery(config)
    }

    fn generator<'a>(
        &self,
        source: &'a dyn StructureDiscovery,
        cache: &'a dyn ProxyCache,
        config: &ConfigStore,
    ) -> Box<dyn ProxyGenerator + 'a> {
        DefaultComponents.generator(source, cache, config)
    }
}

/// Default components whose generator fails for one identity.
pub struct FailingComponents {
    pub fail_on: String,
}

struct FailingGenerator<'a> {
    inner: Box<dyn ProxyGenerator + 'a>,
    fail_on: String,
}

impl ProxyGenerator for FailingGenerator<'_> {
    fn generate_proxy_for(&self, identity: &StructureIdentity) -> Result<(), GenerationError> {
        if identity.as_str() == self.fail_on {
            return Err(GenerationError::new(identity, "contract annotation malformed"));
        }
        self.inner.generate_proxy_for(identity)
    }
}

impl BootstrapComponents for FailingComponents {
    fn discovery(&self, config: &ConfigStore) -> Box<dyn StructureDiscovery> {
        DefaultComponents.discovery(config)
    }

    fn generator<'a>(
        &self,
        source: &'a dyn StructureDiscovery,
        cache: &'a dyn ProxyCache,
        config: &ConfigStore,
    ) -> Box<dyn ProxyGenerator + 'a> {
        Box::new(FailingGenerator {
            inner: DefaultComponents.generator(source, cache, config),
            fail_on: self.fail_on.clone(),
        })
    }
}

/// Default components whose generator sleeps before each structure.
pub struct SlowComponents {
    pub delay: Duration,
}

struct SlowGenerator<'a> {
    inner: Box<dyn ProxyGenerator + 'a>,
    delay: Duration,
}

impl ProxyGenerator for SlowGenerator<'_> {
    fn generate_proxy_for(&self, identity: &StructureIdentity) -> Result<(), GenerationError> {
        thread::sleep(self.delay);
        self.inner.generate_proxy_for(identity)
    }
}

impl BootstrapComponents for SlowComponents {
    fn discovery(&self, config: &ConfigStore) -> Box<dyn StructureDiscovery> {
        DefaultComponents.discovery(config)
    }

    fn generator<'a>(
        &self,
        source: &'a dyn StructureDiscovery,
        cache: &'a dyn ProxyCache,
        config: &ConfigStore,
    ) -> Box<dyn ProxyGenerator + 'a> {
        Box::new(SlowGenerator {
            inner: DefaultComponents.generator(source, cache, config),
            delay: self.delay,
        })
    }
}

/// Fallback resolver with a fixed answer that records what it was asked.
pub struct StubResolver {
    answer: Result<bool, String>,
    pub asked: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubResolver {
    pub fn answering(found: bool) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(found),
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Resolver for StubResolver {
    fn resolve(&self, name: &str) -> Result<bool, ResolveError> {
        self.asked.lock().unwrap().push(name.to_string());
        self.answer
            .clone()
            .map_err(|message| ResolveError::new(name, message))
    }
}
