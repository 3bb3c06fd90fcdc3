//! Proxy cache subsystem.
//!
//! # Data Flow
//! ```text
//! Write (bootstrap only):
//!     StructureIdentity → key.rs (CacheKey) → artifact.rs (render) → store.rs (atomic write)
//!
//! Read (every resolution):
//!     requested name → key.rs (CacheKey) → store.rs (read) → artifact.rs (parse & check)
//! ```
//!
//! # Design Decisions
//! - One flat directory, one file per structure
//! - Warmth is judged by counting artifact files only
//! - Readers never write; the cache is read-only after bootstrap

pub mod artifact;
pub mod key;
pub mod store;

pub use artifact::{Artifact, ArtifactError};
pub use key::CacheKey;
pub use store::{CacheError, FsProxyCache, ProxyCache};
