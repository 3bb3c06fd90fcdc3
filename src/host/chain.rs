//! The host's resolution chain.
//!
//! # Responsibilities
//! - Hold the ordered list of resolution hooks
//! - List, remove and install hooks
//! - Walk the hooks for a name until one resolves it
//!
//! # Design Decisions
//! - The hook list lives in an `ArcSwap`: resolution is a lock-free read of
//!   a snapshot, mutation swaps in a new list
//! - Mutation is expected only during startup, before any resolution
//! - An explicit value instead of process-global state, so tests can own one

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::host::{ResolveError, Resolver};

/// Identifies one installed hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(u64);

/// Installation flags for a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookOptions {
    /// Propagate resolver errors out of the chain instead of logging and moving on.
    pub throws: bool,
    /// Install at the front, ahead of existing hooks and of later appended ones.
    pub prepend: bool,
}

impl Default for HookOptions {
    fn default() -> Self {
        Self {
            throws: true,
            prepend: true,
        }
    }
}

#[derive(Clone)]
struct Hook {
    handle: HookHandle,
    resolver: Arc<dyn Resolver>,
    options: HookOptions,
}

/// Ordered set of resolution hooks.
pub struct ResolutionChain {
    hooks: ArcSwap<Vec<Hook>>,
    next_id: AtomicU64,
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self {
            hooks: ArcSwap::from_pointee(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Handles of the installed hooks, in invocation order.
    pub fn list(&self) -> Vec<HookHandle> {
        self.hooks.load().iter().map(|h| h.handle).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.load().is_empty()
    }

    /// Remove a hook. Returns false if it was not installed.
    pub fn remove(&self, handle: HookHandle) -> bool {
        let previous = self.hooks.rcu(|hooks| {
            hooks
                .iter()
                .filter(|h| h.handle != handle)
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().any(|h| h.handle == handle)
    }

    /// Install a resolver and return its handle.
    pub fn install(&self, resolver: Arc<dyn Resolver>, options: HookOptions) -> HookHandle {
        let handle = HookHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let hook = Hook {
            handle,
            resolver,
            options,
        };

        self.hooks.rcu(|hooks| {
            let mut next = Vec::with_capacity(hooks.len() + 1);
            if options.prepend {
                next.push(hook.clone());
                next.extend(hooks.iter().cloned());
            } else {
                next.extend(hooks.iter().cloned());
                next.push(hook.clone());
            }
            next
        });

        tracing::debug!(handle = handle.0, prepend = options.prepend, "Resolution hook installed");
        handle
    }

    /// Ask each hook in turn to resolve `name`.
    ///
    /// Stops at the first hook reporting success. A hook error is returned if
    /// that hook was installed with `throws`, otherwise it is logged and the
    /// next hook is tried.
    pub fn resolve(&self, name: &str) -> Result<bool, ResolveError> {
        let hooks = self.hooks.load();
        for hook in hooks.iter() {
            match hook.resolver.resolve(name) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) if hook.options.throws => return Err(e),
                Err(e) => {
                    tracing::warn!(name, handle = hook.handle.0, error = %e, "Resolution hook failed");
                }
            }
        }
        Ok(false)
    }
}

impl Default for ResolutionChain {
    fn default() -> Self {
        Self::new()
    }
}
