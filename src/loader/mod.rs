//! Load orchestration.
//!
//! # Data Flow
//! ```text
//! Phase 1, startup (one writer):
//!     ConfigStore + cache dir
//!     → state.rs (count artifacts, judge cold/warm)
//!     → bootstrap.rs if cold (lock → re-judge → discover all → generate each → prune)
//!     → orchestrator.rs register (remove every hook, install self)
//!
//! Phase 2, serving (many readers, no writer):
//!     name → CacheKey → cached artifact? → define, Ok(true)
//!                     → otherwise fallback resolver's answer
//! ```
//!
//! # Design Decisions
//! - Fail fast: config, cache and bootstrap errors abort construction
//! - Phases are ordered by construction, not by runtime locks
//! - A cache miss in Phase 2 never triggers generation
//! - A corrupt artifact is an error for that request, not a silent fallback

pub mod bootstrap;
pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod state;

pub use bootstrap::{BootstrapComponents, BootstrapOutcome, DefaultComponents};
pub use error::LoaderError;
pub use orchestrator::{LoadOrchestrator, OrchestratorBuilder};
pub use state::{CacheState, ColdReason};
