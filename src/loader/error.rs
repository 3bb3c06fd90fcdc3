//! Loader error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

use crate::cache::{ArtifactError, CacheError};
use crate::config::ConfigError;
use crate::discovery::{DiscoveryError, StructureIdentity};
use crate::generator::GenerationError;
use crate::host::ResolveError;

/// Errors from constructing an orchestrator or resolving through it.
///
/// Everything except `CachedArtifactInvalid` and `Fallback` happens during
/// construction and means no orchestrator exists.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cache directory missing or unreadable.
    #[error("proxy cache unavailable: {0}")]
    CacheUnavailable(#[source] CacheError),

    /// Cache I/O failed during bootstrap.
    #[error("proxy cache error: {0}")]
    Cache(#[source] CacheError),

    /// Structure discovery failed during bootstrap.
    #[error("structure discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Generating one structure's proxy failed; the rebuild was abandoned.
    #[error("bootstrap failed at {identity}: {cause}")]
    BootstrapFailed {
        identity: StructureIdentity,
        #[source]
        cause: GenerationError,
    },

    /// Could not create or inspect the rebuild lock.
    #[error("bootstrap lock {} failed: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process held the rebuild lock for too long.
    #[error("timed out after {waited_ms}ms waiting for bootstrap lock {}", .path.display())]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    /// A cached artifact exists but is not a valid definition for the name.
    #[error("cached artifact {} for {name} is invalid: {source}", .path.display())]
    CachedArtifactInvalid {
        name: String,
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },

    /// The fallback resolver failed.
    #[error(transparent)]
    Fallback(#[from] ResolveError),
}
