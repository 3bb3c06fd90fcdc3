//! Structure discovery subsystem.
//!
//! # Data Flow
//! ```text
//! project-dirs (from ConfigStore)
//!     → files.rs (walk, filter by source extension)
//!     → structure.rs (relative path → StructureIdentity)
//!     → Vec<StructureDescriptor>, sorted, duplicate-free
//! ```
//!
//! # Design Decisions
//! - Eager: the whole set is known before generation starts
//! - Identity is a pure function of the relative path, so it is stable across runs
//! - Duplicate identities across project dirs are an error, not a silent shadow

use std::path::PathBuf;

use thiserror::Error;

pub mod files;
pub mod structure;
pub mod watcher;

pub use files::FsDiscovery;
pub use structure::{StructureDescriptor, StructureIdentity};

/// Errors raised while enumerating structures.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("project directory not found: {}", .0.display())]
    MissingProjectDir(PathBuf),

    #[error("structure {identity} defined twice: {} and {}", .first.display(), .second.display())]
    DuplicateIdentity {
        identity: StructureIdentity,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Enumerates the structures eligible for proxy generation.
pub trait StructureDiscovery: Send + Sync {
    /// Every discovered structure. Exhaustive and deterministic in membership.
    fn list_all(&self) -> Result<Vec<StructureDescriptor>, DiscoveryError>;

    /// Source file of a structure, if it is known to this discovery.
    fn locate(&self, identity: &StructureIdentity) -> Option<PathBuf>;
}
