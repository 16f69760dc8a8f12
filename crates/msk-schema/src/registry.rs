//! # Identifier Registry
//!
//! Keeps schema identifiers unique within one registry's lifetime. The
//! registry is an explicitly constructed, injected value — typically one
//! per schema-compilation run — not process-global state.
//!
//! ## Collision Resolution
//!
//! When a candidate `$id` is already owned by a *different* live schema
//! instance, the candidate is split into a base and an optional trailing
//! `_N` numeric suffix; the suffix is incremented (from 0 when absent) and
//! re-tested until an unused `base_N` is found. So a second `X` becomes
//! `X_1`, a third `X_2`, and deriving from `X_1` continues at `X_2`.
//!
//! ## Atomicity
//!
//! Collision resolution is a check-then-install sequence, so each claim —
//! including the release of the instance's previous identifier — runs
//! under a single lock acquisition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opaque identity of one live schema instance within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InstanceToken(u64);

/// Shared, cheaply cloneable identifier registry.
///
/// Clones share the same underlying state; every read and write is guarded
/// by one mutual-exclusion section per operation.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Map from `$id` to its current owner.
    entries: Mutex<HashMap<String, InstanceToken>>,
    next_token: AtomicU64,
    next_auto_id: AtomicU64,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `id` is currently owned by some schema instance.
    pub fn contains(&self, id: &str) -> bool {
        self.lock_entries().contains_key(id)
    }

    /// Number of identifiers currently registered.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// True if no identifiers are registered.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Allocate an identifier for an anonymous document.
    pub fn auto_id(&self) -> String {
        let n = self.inner.next_auto_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("/_auto_id_/{n}")
    }

    /// Mint a fresh instance identity.
    pub(crate) fn issue_token(&self) -> InstanceToken {
        InstanceToken(self.inner.next_token.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Install `candidate` (or the first free suffixed variant of it) as
    /// owned by `token`, releasing `previous` if that id is still owned by
    /// the same instance. Returns the id actually installed.
    pub(crate) fn claim(
        &self,
        candidate: &str,
        token: InstanceToken,
        previous: Option<&str>,
    ) -> String {
        let mut entries = self.lock_entries();

        if let Some(previous) = previous {
            if entries.get(previous) == Some(&token) {
                entries.remove(previous);
                tracing::debug!(id = previous, "released schema identifier");
            }
        }

        let mut id = candidate.to_string();
        loop {
            match entries.get(&id) {
                None => break,
                Some(owner) if *owner == token => break,
                Some(_) => {
                    let (base, suffix) = split_numeric_suffix(&id);
                    id = format!("{base}_{}", suffix + 1);
                }
            }
        }

        entries.insert(id.clone(), token);
        tracing::debug!(id = id.as_str(), candidate, "claimed schema identifier");
        id
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, InstanceToken>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Split an id into its base and trailing `_N` numeric suffix, if any.
/// `"X"` yields `("X", 0)`; `"X_3"` yields `("X", 3)`.
fn split_numeric_suffix(id: &str) -> (&str, u64) {
    if let Some((base, suffix)) = id.rsplit_once('_') {
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = suffix.parse::<u64>() {
                return (base, n);
            }
        }
    }
    (id, 0)
}
