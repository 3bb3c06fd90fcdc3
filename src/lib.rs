//! Contract proxy loader library.
//!
//! Precomputes contract-enforcing proxies for every project structure
//! before concurrent workers start, then resolves names from that cache.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod generator;
pub mod host;
pub mod loader;
pub mod observability;

pub use config::ConfigStore;
pub use host::{Definitions, HookOptions, ResolutionChain};
pub use loader::{LoadOrchestrator, LoaderError};
