//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! loader, cache, host produce:
//!     → tracing events (structured fields: identity, key, count)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr) in the CLI
//!     → whatever metrics recorder the embedding host installs
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Metrics are cheap (atomic increments) and safe on the resolution path

pub mod logging;
pub mod metrics;
