//! Append-only model cache with an in-flight load registry
//!
//! Entries are keyed by normalized path and live for the whole session:
//! there is no eviction, expiry or invalidation. A second request for a
//! path that is still loading attaches to the pending load instead of
//! fetching again.

pub mod metrics;

use crate::error::LoadCause;
use crate::model::Model;
use futures::future::{AbortHandle, Abortable, BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What a finished load resolves to
pub(crate) type LoadOutcome = std::result::Result<Arc<Model>, Arc<LoadCause>>;

/// A load that any number of callers can await
pub(crate) type SharedLoad = Shared<BoxFuture<'static, LoadOutcome>>;

struct PendingLoad {
    generation: u64,
    future: SharedLoad,
    abort: AbortHandle,
}

/// Result of a cache lookup that may start a load
pub(crate) enum Lookup {
    Cached(Arc<Model>),
    Joined(SharedLoad),
    Started(SharedLoad),
}

/// Session-wide store of parsed models
#[derive(Default)]
pub struct ModelCache {
    models: RwLock<HashMap<String, Arc<Model>>>,
    pending: Mutex<HashMap<String, PendingLoad>>,
    generation: AtomicU64,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("models", &self.len())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached model for a normalized path
    pub fn get(&self, key: &str) -> Option<Arc<Model>> {
        self.models.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.models.read().contains_key(key)
    }

    /// Store a model. A later insert under the same key replaces the value.
    pub fn insert(&self, key: &str, model: Arc<Model>) -> Arc<Model> {
        self.models
            .write()
            .insert(key.to_string(), Arc::clone(&model));
        model
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    /// Keys of every cached model
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.models.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Whether a load for `key` is in progress
    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.lock().contains_key(key)
    }

    /// Return the cached model, join the pending load, or register a new one.
    ///
    /// The check and the registration happen under one lock, so at most one
    /// load per key is ever registered. `start` receives the generation that
    /// the load must pass to [`ModelCache::finish`].
    pub(crate) fn lookup_or_register(
        &self,
        key: &str,
        start: impl FnOnce(u64) -> BoxFuture<'static, LoadOutcome>,
    ) -> Lookup {
        let mut pending = self.pending.lock();

        if let Some(model) = self.get(key) {
            return Lookup::Cached(model);
        }
        if let Some(load) = pending.get(key) {
            return Lookup::Joined(load.future.clone());
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let (abort, registration) = AbortHandle::new_pair();
        let future = Abortable::new(start(generation), registration)
            .map(|result| match result {
                Ok(outcome) => outcome,
                Err(_aborted) => Err(Arc::new(LoadCause::Cancelled)),
            })
            .boxed()
            .shared();

        pending.insert(
            key.to_string(),
            PendingLoad {
                generation,
                future: future.clone(),
                abort,
            },
        );
        Lookup::Started(future)
    }

    /// Drop the pending entry left by a finished load
    pub(crate) fn finish(&self, key: &str, generation: u64) {
        let mut pending = self.pending.lock();
        if pending.get(key).is_some_and(|p| p.generation == generation) {
            pending.remove(key);
        }
    }

    /// Abort a pending load. Returns false when nothing was in progress.
    pub(crate) fn cancel(&self, key: &str) -> bool {
        match self.pending.lock().remove(key) {
            Some(load) => {
                load.abort.abort();
                true
            }
            None => false,
        }
    }
}
