//! Metrics collection.
//!
//! # Metrics
//! - `contract_loader_resolutions_total` (counter): resolutions by outcome
//!   (`cache_hit`, `fallback_hit`, `miss`, `invalid`, `error`)
//! - `contract_loader_bootstrap_total` (counter): bootstraps by result
//! - `contract_loader_bootstrap_structures` (gauge): structures generated by the last bootstrap
//! - `contract_loader_cache_artifacts` (gauge): artifacts seen by the last cold check
//! - `contract_loader_hooks_displaced_total` (counter): hooks removed at registration
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; no exporter is installed here
//! - Without a recorder every call is a no-op

use ::metrics::{counter, gauge};

/// Outcome of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    CacheHit,
    FallbackHit,
    Miss,
    Invalid,
    Error,
}

impl ResolutionOutcome {
    fn label(self) -> &'static str {
        match self {
            ResolutionOutcome::CacheHit => "cache_hit",
            ResolutionOutcome::FallbackHit => "fallback_hit",
            ResolutionOutcome::Miss => "miss",
            ResolutionOutcome::Invalid => "invalid",
            ResolutionOutcome::Error => "error",
        }
    }
}

pub fn record_resolution(outcome: ResolutionOutcome) {
    counter!("contract_loader_resolutions_total", "outcome" => outcome.label()).increment(1);
}

pub fn record_bootstrap(success: bool, structures: usize) {
    let result = if success { "success" } else { "failure" };
    counter!("contract_loader_bootstrap_total", "result" => result).increment(1);
    if success {
        gauge!("contract_loader_bootstrap_structures").set(structures as f64);
    }
}

pub fn record_cache_artifacts(count: usize) {
    gauge!("contract_loader_cache_artifacts").set(count as f64);
}

pub fn record_hooks_displaced(count: usize) {
    counter!("contract_loader_hooks_displaced_total").increment(count as u64);
}
