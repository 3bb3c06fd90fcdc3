//! Host runtime seam.
//!
//! # Data Flow
//! ```text
//! host asks for a name
//!     → chain.rs (walk hooks in order)
//!     → Resolver::resolve(name)
//!     → definitions.rs (loaded definition recorded on success)
//! ```
//!
//! # Design Decisions
//! - Hooks are trait objects behind `Arc`, shared by every worker
//! - A resolver reports `Ok(false)` for "not mine", `Err` only for real failures

use thiserror::Error;

pub mod chain;
pub mod definitions;
pub mod path_resolver;

pub use chain::{HookHandle, HookOptions, ResolutionChain};
pub use definitions::Definitions;
pub use path_resolver::PathResolver;

/// A resolver failed while handling a name.
#[derive(Debug, Error)]
#[error("resolving {name} failed: {source}")]
pub struct ResolveError {
    pub name: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl ResolveError {
    pub fn new(name: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            name: name.to_string(),
            source: source.into(),
        }
    }
}

/// Resolves a requested name to a loaded definition.
pub trait Resolver: Send + Sync {
    /// `Ok(true)` if the name is now defined, `Ok(false)` if this resolver has nothing for it.
    fn resolve(&self, name: &str) -> Result<bool, ResolveError>;
}
