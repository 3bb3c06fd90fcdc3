//! Cold-cache judgment.
//!
//! The cache is cold when it holds no more than `warm-threshold` artifacts,
//! or whenever the environment is `development`. Only artifact files count;
//! lock files and other bookkeeping never make a cache look warm.

use std::fmt;

use crate::cache::ProxyCache;
use crate::config::Environment;
use crate::loader::LoaderError;
use crate::observability::metrics;

/// Why a cache was judged cold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColdReason {
    /// Artifact count at or below the threshold.
    Empty,
    /// Development always rebuilds.
    Development,
}

impl fmt::Display for ColdReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColdReason::Empty => f.write_str("cache is empty"),
            ColdReason::Development => f.write_str("development environment"),
        }
    }
}

/// Result of inspecting the cache at construction time. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheState {
    pub artifacts: usize,
    pub threshold: usize,
    pub environment: Environment,
    reason: Option<ColdReason>,
}

impl CacheState {
    /// Pure judgment from an artifact count, threshold and environment.
    pub fn judge(artifacts: usize, threshold: usize, environment: &Environment) -> Self {
        // Development wins so the reported reason reflects the override.
        let reason = if environment.is_development() {
            Some(ColdReason::Development)
        } else if artifacts <= threshold {
            Some(ColdReason::Empty)
        } else {
            None
        };

        Self {
            artifacts,
            threshold,
            environment: environment.clone(),
            reason,
        }
    }

    /// Count the cache's artifacts and judge.
    pub fn inspect(cache: &dyn ProxyCache, threshold: usize, environment: &Environment) -> Result<Self, LoaderError> {
        let artifacts = cache.artifact_count().map_err(LoaderError::CacheUnavailable)?;
        metrics::record_cache_artifacts(artifacts);
        Ok(Self::judge(artifacts, threshold, environment))
    }

    pub fn is_cold(&self) -> bool {
        self.reason.is_some()
    }

    pub fn reason(&self) -> Option<ColdReason> {
        self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache_is_cold_in_every_environment() {
        for env in [
            Environment::Production,
            Environment::Development,
            Environment::Other("staging".into()),
        ] {
            assert!(CacheState::judge(0, 0, &env).is_cold());
        }
    }

    #[test]
    fn test_populated_cache_is_warm_outside_development() {
        let state = CacheState::judge(12, 0, &Environment::Production);
        assert!(!state.is_cold());
        assert_eq!(state.reason(), None);

        assert!(!CacheState::judge(1, 0, &Environment::Other("staging".into())).is_cold());
    }

    #[test]
    fn test_development_forces_cold() {
        for count in [0, 1, 3, 10_000] {
            let state = CacheState::judge(count, 0, &Environment::Development);
            assert_eq!(state.reason(), Some(ColdReason::Development));
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(CacheState::judge(2, 2, &Environment::Production).is_cold());
        assert!(!CacheState::judge(3, 2, &Environment::Production).is_cold());
    }
}
