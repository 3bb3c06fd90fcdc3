//! On-disk proxy artifact format.
//!
//! ```text
//! //! contract-proxy Acme\Billing\Invoice
//! <generated proxy source>
//! ```
//!
//! The header names the structure the artifact was generated for. A file
//! whose header is missing or names another structure is not a valid
//! definition for the requested name.

use thiserror::Error;

use crate::discovery::StructureIdentity;

const HEADER_PREFIX: &str = "//! contract-proxy ";

/// Reasons a cached artifact cannot be loaded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("artifact is not valid UTF-8")]
    NotUtf8,

    #[error("artifact has no contract-proxy header")]
    MissingHeader,

    #[error("artifact was generated for {found}, expected {expected}")]
    IdentityMismatch { expected: String, found: String },
}

/// A generated proxy, ready to be persisted or handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    identity: StructureIdentity,
    body: String,
}

impl Artifact {
    pub fn new(identity: StructureIdentity, body: impl Into<String>) -> Self {
        Self {
            identity,
            body: body.into(),
        }
    }

    /// Serialize with header, as stored in the cache.
    pub fn render(&self) -> String {
        format!("{}{}\n{}", HEADER_PREFIX, self.identity, self.body)
    }

    /// Parse stored bytes, checking they belong to `expected`.
    pub fn parse(bytes: &[u8], expected: &str) -> Result<Self, ArtifactError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ArtifactError::NotUtf8)?;
        let (header, body) = text.split_once('\n').unwrap_or((text, ""));
        let found = header
            .strip_prefix(HEADER_PREFIX)
            .ok_or(ArtifactError::MissingHeader)?;

        if found != expected {
            return Err(ArtifactError::IdentityMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }

        Ok(Self {
            identity: StructureIdentity::new(found),
            body: body.to_string(),
        })
    }

    pub fn identity(&self) -> &StructureIdentity {
        &self.identity
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
