//! Proxy generation subsystem.
//!
//! # Responsibilities
//! - Turn a structure identity into a persisted proxy artifact
//! - Report failures with the offending identity attached
//!
//! # Design Decisions
//! - Generation only ever runs inside the bootstrap step
//! - The generator writes straight into the cache it was built with
//! - What a proxy checks, and how, belongs to the generator implementation

use thiserror::Error;

use crate::discovery::StructureIdentity;

pub mod passthrough;

pub use passthrough::PassthroughGenerator;

/// Proxy generation failed for one structure.
#[derive(Debug, Error)]
#[error("proxy generation failed for {identity}: {cause}")]
pub struct GenerationError {
    pub identity: StructureIdentity,
    pub cause: String,
}

impl GenerationError {
    pub fn new(identity: &StructureIdentity, cause: impl ToString) -> Self {
        Self {
            identity: identity.clone(),
            cause: cause.to_string(),
        }
    }
}

/// Produces a proxy for a structure and persists it.
pub trait ProxyGenerator {
    fn generate_proxy_for(&self, identity: &StructureIdentity) -> Result<(), GenerationError>;
}
