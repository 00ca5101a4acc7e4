//! Async runtime abstraction for background loads
//!
//! The loader itself only produces futures. Hosts that want loads to run in
//! the background hand an [`AsyncSpawner`] to
//! [`ModelLoader::preload`](crate::loader::ModelLoader::preload).

pub mod inline;
#[cfg(feature = "runtime-tokio")]
pub mod tokio_impl;

use futures::future::{BoxFuture, FutureExt, RemoteHandle};
use std::fmt::{self, Debug};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Handle to a spawned task; awaiting it yields the task's output
///
/// Dropping a handle from [`AsyncSpawner::spawn_with_result`] cancels the
/// task unless it was detached. Handles from
/// [`AsyncSpawner::spawn_detached`] only observe the task.
pub struct JoinHandle<T> {
    inner: Inner<T>,
}

enum Inner<T> {
    Remote(RemoteHandle<T>),
    Observer(BoxFuture<'static, T>),
}

impl<T: Send + 'static> JoinHandle<T> {
    /// Split a task into the part to hand to a runtime and its handle
    pub fn pair<F>(task: F) -> (impl Future<Output = ()> + Send + 'static, Self)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (remote, inner) = task.remote_handle();
        (
            remote,
            Self {
                inner: Inner::Remote(inner),
            },
        )
    }

    /// Split a task into a runner and a handle whose drop leaves the
    /// runner going
    pub fn observed<F>(task: F) -> (impl Future<Output = ()> + Send + 'static, Self)
    where
        F: Future<Output = T> + Send + 'static,
        T: Clone + Sync,
    {
        let shared = task.boxed().shared();
        let runner = shared.clone().map(|_| ());
        (
            runner,
            Self {
                inner: Inner::Observer(shared.boxed()),
            },
        )
    }

    /// Let the task run to completion without anyone awaiting it
    pub fn detach(self) {
        if let Inner::Remote(remote) = self.inner {
            remote.forget();
        }
    }

    /// Whether dropping this handle cancels the task
    pub fn cancels_on_drop(&self) -> bool {
        matches!(self.inner, Inner::Remote(_))
    }
}

impl<T> Debug for JoinHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner {
            Inner::Remote(_) => "remote",
            Inner::Observer(_) => "observer",
        };
        f.debug_struct("JoinHandle").field("kind", &kind).finish()
    }
}

impl<T: 'static> Future for JoinHandle<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        match &mut self.inner {
            Inner::Remote(remote) => remote.poll_unpin(cx),
            Inner::Observer(shared) => shared.poll_unpin(cx),
        }
    }
}

/// Async task spawner trait
///
/// # Example
/// ```ignore
/// let spawner = InlineSpawner::new();
/// let handle = spawner.spawn_with_result(async { 40 + 2 });
/// ```
pub trait AsyncSpawner: Send + Sync + Clone + Debug {
    /// Spawn a fire-and-forget task
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Spawn a task whose output can be awaited through the handle
    fn spawn_with_result<F, T>(&self, task: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (remote, handle) = JoinHandle::pair(task);
        self.spawn(remote);
        handle
    }

    /// Spawn a task that runs to completion even if its handle is dropped
    fn spawn_detached<F, T>(&self, task: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let (runner, handle) = JoinHandle::observed(task);
        self.spawn(runner);
        handle
    }

    /// Get the name of this runtime (for debugging)
    fn runtime_name(&self) -> &'static str;

    /// Block on a future (if supported by the runtime)
    ///
    /// Returns None if blocking is not supported.
    fn block_on<F, T>(&self, _future: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        None
    }
}

pub use inline::InlineSpawner;

#[cfg(feature = "runtime-tokio")]
pub use tokio_impl::TokioSpawner;
