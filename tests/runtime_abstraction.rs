//! Integration tests for async runtime abstraction

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tidyroom_asset::{AsyncSpawner, InlineSpawner, MemorySource, ModelLoader};

#[test]
fn test_inline_spawner_integration() {
    let spawner = InlineSpawner::new();

    let executed = Arc::new(AtomicBool::new(false));
    let executed_clone = Arc::clone(&executed);

    spawner.spawn(async move {
        executed_clone.store(true, Ordering::SeqCst);
    });

    // Inline tasks finish before spawn returns
    assert!(executed.load(Ordering::SeqCst));
}

#[test]
fn test_spawner_trait_bound() {
    fn spawn_task<S: AsyncSpawner>(spawner: &S) -> tidyroom_asset::JoinHandle<u8> {
        spawner.spawn_with_result(async { 7 })
    }

    let spawner = InlineSpawner::new();
    assert_eq!(spawner.block_on(spawn_task(&spawner)), Some(7));
}

#[test]
fn test_detached_preload_still_caches() {
    let loader = ModelLoader::new(
        MemorySource::new().with_asset("/models/room.glb", common::room_glb()),
    );
    for handle in loader.preload(&InlineSpawner::new(), &["/models/room.glb"]) {
        handle.detach();
    }
    assert!(loader.get_cached("/models/room.glb").is_some());
}

#[cfg(feature = "runtime-tokio")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_preload_shares_loads() {
    use tidyroom_asset::TokioSpawner;

    let loader = ModelLoader::new(
        MemorySource::new()
            .with_asset("/models/room.glb", common::room_glb())
            .with_asset("/models/mop.glb", common::room_glb()),
    );
    let paths = ["/models/room.glb", "/models/mop.glb", "/models/room.glb"];
    let handles = loader.preload(&TokioSpawner::new(), &paths);

    let results = futures::future::join_all(handles).await;
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(loader.cache().len(), 2);
    assert_eq!(loader.source().fetch_count("/models/room.glb"), 1);
}

#[cfg(feature = "runtime-tokio")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_tokio_preload_still_caches() {
    use std::time::Duration;
    use tidyroom_asset::{AssetSource, FetchRequest, SourceError, TokioSpawner};

    struct SlowSource(MemorySource);

    #[async_trait::async_trait]
    impl AssetSource for SlowSource {
        async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, SourceError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.fetch(request).await
        }
    }

    let loader = ModelLoader::new(SlowSource(
        MemorySource::new().with_asset("/models/room.glb", common::room_glb()),
    ));
    drop(loader.preload(&TokioSpawner::new(), &["/models/room.glb"]));

    for _ in 0..50 {
        if loader.get_cached("/models/room.glb").is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(loader.get_cached("/models/room.glb").is_some());
    assert!(!loader.is_loading("/models/room.glb"));
}
