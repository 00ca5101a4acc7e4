//! Spawner that runs every task to completion on the calling thread

use super::AsyncSpawner;
use std::future::Future;

/// Drives each task in place with a simple executor
///
/// Useful for tests and for hosts without a runtime: by the time `spawn`
/// returns, the task has finished.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineSpawner;

impl InlineSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl AsyncSpawner for InlineSpawner {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        futures::executor::block_on(task);
    }

    fn runtime_name(&self) -> &'static str {
        "Inline"
    }

    fn block_on<F, T>(&self, future: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        Some(futures::executor::block_on(future))
    }
}
