//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ConfigStore (validated, immutable)
//!     → shared via Arc with the orchestrator and its collaborators
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no in-process reload
//! - Every field except `environment` has a default to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No ambient global: the store is passed explicitly

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, ConfigStore};
pub use schema::{Environment, LoaderConfig, LockConfig};
