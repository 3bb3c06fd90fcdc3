//! Persistent proxy cache backed by a flat directory.
//!
//! Layout: `<root>/<key>.<artifact-extension>`, one file per structure.
//! Anything else in the directory (lock files, dotfiles, temp files) is
//! bookkeeping and is not counted as an artifact.
//!
//! Writes go to a temp file first and are renamed into place, so a reader
//! never sees a partially written artifact.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cache::key::CacheKey;

/// Errors from the cache directory.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory {} unavailable: {source}", .path.display())]
    Unavailable { path: PathBuf, source: io::Error },

    #[error("cache path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cache I/O failed on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Storage for generated proxy artifacts, keyed by [`CacheKey`].
pub trait ProxyCache: Send + Sync {
    /// Where the artifact for `key` lives (whether or not it exists).
    fn path_for(&self, key: &CacheKey) -> PathBuf;

    /// True if an artifact is stored under `key`.
    fn exists(&self, key: &CacheKey) -> bool;

    /// Artifact bytes, or `None` if nothing is stored under `key`.
    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store an artifact, replacing any previous one.
    fn write(&self, key: &CacheKey, contents: &[u8]) -> Result<(), CacheError>;

    /// Number of genuine artifacts currently stored.
    fn artifact_count(&self) -> Result<usize, CacheError>;

    /// Remove every artifact. Bookkeeping files are left alone.
    fn clear(&self) -> Result<usize, CacheError>;

    /// Remove every artifact whose key is not in `keep`.
    fn prune(&self, keep: &HashSet<CacheKey>) -> Result<usize, CacheError>;
}

/// Directory-backed [`ProxyCache`].
#[derive(Debug, Clone)]
pub struct FsProxyCache {
    root: PathBuf,
    extension: String,
}

impl FsProxyCache {
    /// Open an existing cache directory.
    ///
    /// The directory must exist and be listable; it is never created here.
    pub fn open(root: &Path, extension: &str) -> Result<Self, CacheError> {
        let meta = fs::metadata(root).map_err(|source| CacheError::Unavailable {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(CacheError::NotADirectory(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|source| CacheError::Unavailable {
            path: root.to_path_buf(),
            source,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            extension: extension.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_artifact(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        !hidden && path.extension().is_some_and(|ext| ext == self.extension.as_str())
    }

    fn artifacts(&self) -> Result<Vec<PathBuf>, CacheError> {
        let entries = fs::read_dir(&self.root).map_err(|source| CacheError::Unavailable {
            path: self.root.clone(),
            source,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CacheError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_file()) && self.is_artifact(&path) {
                found.push(path);
            }
        }
        Ok(found)
    }

    fn remove_all(&self, paths: &[PathBuf]) -> Result<(), CacheError> {
        for path in paths {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(CacheError::Io { path: path.clone(), source }),
            }
        }
        Ok(())
    }
}

impl ProxyCache for FsProxyCache {
    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.{}", key, self.extension))
    }

    fn exists(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn write(&self, key: &CacheKey, contents: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{}.{:016x}.tmp", key, fastrand::u64(..)));

        if let Err(source) = fs::write(&tmp, contents) {
            let _ = fs::remove_file(&tmp);
            return Err(CacheError::Io { path: tmp, source });
        }
        fs::rename(&tmp, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            CacheError::Io { path, source }
        })
    }

    fn artifact_count(&self) -> Result<usize, CacheError> {
        Ok(self.artifacts()?.len())
    }

    fn clear(&self) -> Result<usize, CacheError> {
        let artifacts = self.artifacts()?;
        self.remove_all(&artifacts)?;
        Ok(artifacts.len())
    }

    fn prune(&self, keep: &HashSet<CacheKey>) -> Result<usize, CacheError> {
        let stale: Vec<PathBuf> = self
            .artifacts()?
            .into_iter()
            .filter(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map_or(true, |stem| !keep.contains(&CacheKey::from_raw(stem)))
            })
            .collect();
        self.remove_all(&stale)?;
        Ok(stale.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("cache");
        assert!(matches!(
            FsProxyCache::open(&missing, "proxy"),
            Err(CacheError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_open_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            FsProxyCache::open(&file, "proxy"),
            Err(CacheError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_write_read_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsProxyCache::open(dir.path(), "proxy").unwrap();
        let key = CacheKey::derive("Acme\\Invoice", '\\');

        assert!(!cache.exists(&key));
        assert_eq!(cache.read(&key).unwrap(), None);

        cache.write(&key, b"first").unwrap();
        cache.write(&key, b"second").unwrap();

        assert!(cache.exists(&key));
        assert_eq!(cache.read(&key).unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(cache.path_for(&key), dir.path().join("Acme_Invoice.proxy"));
        assert_eq!(cache.artifact_count().unwrap(), 1);
    }

    #[test]
    fn test_bookkeeping_files_are_not_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".bootstrap.lock"), "id").unwrap();
        fs::write(dir.path().join(".gitignore"), "*").unwrap();
        fs::write(dir.path().join("README"), "notes").unwrap();
        fs::create_dir(dir.path().join("sub.proxy")).unwrap();

        let cache = FsProxyCache::open(dir.path(), "proxy").unwrap();
        assert_eq!(cache.artifact_count().unwrap(), 0);

        cache.write(&CacheKey::derive("Foo", '\\'), b"x").unwrap();
        assert_eq!(cache.artifact_count().unwrap(), 1);

        assert_eq!(cache.clear().unwrap(), 1);
        assert_eq!(cache.artifact_count().unwrap(), 0);
        assert!(dir.path().join(".bootstrap.lock").exists());
    }

    #[test]
    fn test_prune_keeps_listed_keys_only() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsProxyCache::open(dir.path(), "proxy").unwrap();
        let keep = CacheKey::derive("Acme\\Invoice", '\\');
        let stale = CacheKey::derive("Acme\\Retired", '\\');
        cache.write(&keep, b"fresh").unwrap();
        cache.write(&stale, b"old").unwrap();
        fs::write(dir.path().join(".bootstrap.lock"), "").unwrap();

        let pruned = cache.prune(&HashSet::from([keep.clone()])).unwrap();
        assert_eq!(pruned, 1);
        assert!(cache.exists(&keep));
        assert!(!cache.exists(&stale));
        assert!(dir.path().join(".bootstrap.lock").exists());
    }
}
