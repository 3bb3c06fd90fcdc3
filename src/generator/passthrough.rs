//! Default generator: wraps the structure's source in an artifact header.
//!
//! Contract checks are not injected here. This is the wiring a real
//! contract-checking generator replaces.

use std::fs;

use crate::cache::{Artifact, CacheKey, ProxyCache};
use crate::discovery::{StructureDiscovery, StructureIdentity};
use crate::generator::{GenerationError, ProxyGenerator};

pub struct PassthroughGenerator<'a> {
    source: &'a dyn StructureDiscovery,
    cache: &'a dyn ProxyCache,
    separator: char,
}

impl<'a> PassthroughGenerator<'a> {
    pub fn new(source: &'a dyn StructureDiscovery, cache: &'a dyn ProxyCache, separator: char) -> Self {
        Self {
            source,
            cache,
            separator,
        }
    }
}

impl ProxyGenerator for PassthroughGenerator<'_> {
    fn generate_proxy_for(&self, identity: &StructureIdentity) -> Result<(), GenerationError> {
        let path = self
            .source
            .locate(identity)
            .ok_or_else(|| GenerationError::new(identity, "structure source not found"))?;
        let body = fs::read_to_string(&path)
            .map_err(|e| GenerationError::new(identity, format!("{}: {}", path.display(), e)))?;

        let artifact = Artifact::new(identity.clone(), body);
        let key = CacheKey::derive(identity.as_str(), self.separator);
        self.cache
            .write(&key, artifact.render().as_bytes())
            .map_err(|e| GenerationError::new(identity, e))?;

        tracing::debug!(identity = %identity, key = %key, "Proxy generated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FsProxyCache;
    use crate::config::{ConfigStore, LoaderConfig};
    use crate::discovery::FsDiscovery;
    use std::path::PathBuf;

    #[test]
    fn test_generates_headered_artifact() {
        let project = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(project.path().join("Acme")).unwrap();
        fs::write(project.path().join("Acme/Invoice.src"), "struct Invoice;").unwrap();

        let dirs: Vec<PathBuf> = vec![project.path().to_path_buf()];
        let config = ConfigStore::from_config(LoaderConfig {
            project_dirs: dirs.clone(),
            ..LoaderConfig::default()
        })
        .unwrap();
        let discovery = FsDiscovery::new(&dirs, &config);
        let cache = FsProxyCache::open(cache_dir.path(), "proxy").unwrap();
        let generator = PassthroughGenerator::new(&discovery, &cache, '\\');

        let identity = StructureIdentity::from("Acme\\Invoice");
        generator.generate_proxy_for(&identity).unwrap();

        let bytes = cache.read(&CacheKey::derive("Acme\\Invoice", '\\')).unwrap().unwrap();
        let artifact = Artifact::parse(&bytes, "Acme\\Invoice").unwrap();
        assert_eq!(artifact.body(), "struct Invoice;");

        let err = generator
            .generate_proxy_for(&StructureIdentity::from("Acme\\Ghost"))
            .unwrap_err();
        assert_eq!(err.identity.as_str(), "Acme\\Ghost");
    }
}
