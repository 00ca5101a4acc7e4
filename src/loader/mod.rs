//! Cached asynchronous model loading
//!
//! [`ModelLoader::load_model`] resolves a path to a shared, immutable model.
//! The first request fetches and parses; concurrent requests for the same
//! path attach to that load; later requests are served from the cache.
//! Failures are never cached, so a retry issues a fresh fetch.

pub mod decoder;
pub mod gltf;
pub mod source;

use crate::cache::metrics::LoadMetricsHandle;
use crate::cache::{LoadOutcome, Lookup, ModelCache};
use crate::config::LoaderConfig;
use crate::error::{AssetError, LoadCause, Result};
use crate::model::Model;
use crate::runtime::{AsyncSpawner, JoinHandle};
use futures::future::FutureExt;
use std::sync::Arc;
use std::time::Instant;

pub use decoder::{
    CompressedPrimitive, DecodedGeometry, DecoderModule, GeometryDecoder, DRACO_EXTENSION,
};
pub use source::{AssetSource, FetchRequest, FileSource, MemorySource};

/// Trim a requested path into a cache key, rejecting empty input
pub fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        log::error!("Invalid model path provided: {path:?}");
        return Err(AssetError::InvalidPath);
    }
    Ok(trimmed.to_string())
}

/// Owned state a background load needs
struct LoadContext<S> {
    source: Arc<S>,
    cache: Arc<ModelCache>,
    decoder: Arc<DecoderModule>,
    config: LoaderConfig,
    metrics: LoadMetricsHandle,
}

/// Loads models through an [`AssetSource`] into a shared [`ModelCache`]
///
/// Cloning is cheap; clones share the cache, decoder and metrics.
pub struct ModelLoader<S: AssetSource + 'static> {
    source: Arc<S>,
    cache: Arc<ModelCache>,
    decoder: Arc<DecoderModule>,
    config: LoaderConfig,
    metrics: LoadMetricsHandle,
}

impl<S: AssetSource + 'static> Clone for ModelLoader<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            cache: Arc::clone(&self.cache),
            decoder: Arc::clone(&self.decoder),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<S: AssetSource + 'static> std::fmt::Debug for ModelLoader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("cache", &self.cache)
            .field("decoder", &self.decoder)
            .field("config", &self.config)
            .finish()
    }
}

impl<S: AssetSource + 'static> ModelLoader<S> {
    /// Create a loader with default configuration and a fresh cache
    pub fn new(source: S) -> Self {
        Self::with_config(source, LoaderConfig::default())
    }

    pub fn with_config(source: S, config: LoaderConfig) -> Self {
        Self {
            source: Arc::new(source),
            cache: Arc::new(ModelCache::new()),
            decoder: Arc::new(DecoderModule::new(config.decoder_path.clone())),
            config,
            metrics: LoadMetricsHandle::new(),
        }
    }

    /// Share an existing cache, e.g. between several loaders and views
    pub fn with_cache(mut self, cache: Arc<ModelCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the compressed-geometry decoder module
    pub fn with_decoder(mut self, decoder: DecoderModule) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    fn context(&self) -> LoadContext<S> {
        LoadContext {
            source: Arc::clone(&self.source),
            cache: Arc::clone(&self.cache),
            decoder: Arc::clone(&self.decoder),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Load a model, reusing the cached or in-flight result for its path.
    ///
    /// Every successful call for the same path yields the same `Arc`.
    pub async fn load_model(&self, path: &str) -> Result<Arc<Model>> {
        let key = normalize_path(path)?;
        let metrics = &self.metrics;

        let lookup = self.cache.lookup_or_register(&key, |generation| {
            let ctx = self.context();
            let key = key.clone();
            async move { run_load(ctx, key, generation).await }.boxed()
        });

        let load = match lookup {
            Lookup::Cached(model) => {
                metrics.record_cache_hit();
                log::debug!("Using cached model for {key}");
                return Ok(model);
            }
            Lookup::Joined(load) => {
                metrics.record_in_flight_join();
                log::debug!("Joining in-flight load of {key}");
                load
            }
            Lookup::Started(load) => {
                metrics.record_cache_miss();
                load
            }
        };

        load.await
            .map_err(|cause| AssetError::load_failure(key, cause))
    }

    /// Cached model for a path, without starting a load
    pub fn get_cached(&self, path: &str) -> Option<Arc<Model>> {
        let key = path.trim();
        if key.is_empty() {
            return None;
        }
        self.cache.get(key)
    }

    /// Whether a load for `path` is in progress
    pub fn is_loading(&self, path: &str) -> bool {
        self.cache.is_pending(path.trim())
    }

    /// Load several models concurrently, pairing each requested path with
    /// its result in input order. One failure never aborts the others.
    pub async fn load_many<P: AsRef<str>>(&self, paths: &[P]) -> Vec<(String, Result<Arc<Model>>)> {
        futures::future::join_all(paths.iter().map(|p| async move {
            let path = p.as_ref();
            (path.to_string(), self.load_model(path).await)
        }))
        .await
    }

    /// Start background loads; results land in the cache.
    ///
    /// Each load runs to completion on the spawner whether or not its handle
    /// is awaited, dropped or detached.
    pub fn preload<A, P>(&self, spawner: &A, paths: &[P]) -> Vec<JoinHandle<Result<Arc<Model>>>>
    where
        A: AsyncSpawner,
        P: AsRef<str>,
    {
        paths
            .iter()
            .map(|path| {
                let loader = self.clone();
                let path = path.as_ref().to_string();
                log::debug!("Preloading {path} on {}", spawner.runtime_name());
                spawner.spawn_detached(async move { loader.load_model(&path).await })
            })
            .collect()
    }

    /// Abort the in-flight load for `path`; waiters receive a cancellation
    /// failure. Returns false when no load was in progress.
    pub fn cancel(&self, path: &str) -> bool {
        let key = path.trim();
        let cancelled = self.cache.cancel(key);
        if cancelled {
            log::info!("Cancelled model load of {key}");
        }
        cancelled
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    pub fn metrics(&self) -> &LoadMetricsHandle {
        &self.metrics
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn decoder(&self) -> &DecoderModule {
        &self.decoder
    }
}

/// Fetch, parse and cache one model
async fn run_load<S: AssetSource + 'static>(
    inner: LoadContext<S>,
    key: String,
    generation: u64,
) -> LoadOutcome {
    let start = Instant::now();
    let outcome = fetch_and_parse(&inner, &key).await;

    let outcome = match outcome {
        Ok(mut model) => {
            let elapsed = start.elapsed();
            model.metadata.load_duration = elapsed;
            let model = inner.cache.insert(&key, Arc::new(model));
            inner.metrics.record_load_time(&key, elapsed);
            log::info!(
                "Model loaded and cached from {key} in {:.2}ms",
                elapsed.as_secs_f64() * 1000.0
            );
            Ok(model)
        }
        Err(cause) => {
            log::error!("Error loading model from {key}: {cause}");
            inner.metrics.record_failure();
            Err(Arc::new(cause))
        }
    };

    inner.cache.finish(&key, generation);
    outcome
}

async fn fetch_and_parse<S: AssetSource + 'static>(
    inner: &LoadContext<S>,
    key: &str,
) -> std::result::Result<Model, LoadCause> {
    let request = FetchRequest::new(key, inner.config.cross_origin);
    inner.metrics.record_fetch(key);
    let bytes = inner.source.fetch(&request).await?;

    gltf::parse_model(
        key,
        bytes,
        inner.source.as_ref(),
        inner.config.cross_origin,
        &inner.decoder,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("  /models/room.glb ").unwrap(), "/models/room.glb");
        assert!(matches!(normalize_path(""), Err(AssetError::InvalidPath)));
        assert!(matches!(normalize_path(" \t\n"), Err(AssetError::InvalidPath)));
    }

    #[test]
    fn test_missing_asset_is_load_failure() {
        let loader = ModelLoader::new(MemorySource::new());
        let err = block_on(loader.load_model("/models/missing.glb")).unwrap_err();
        assert!(matches!(
            err,
            AssetError::LoadFailure { ref path, .. } if path == "/models/missing.glb"
        ));
        assert!(matches!(err.cause(), Some(LoadCause::Source(_))));
        assert!(!loader.is_loading("/models/missing.glb"));
        assert_eq!(loader.metrics().failures(), 1);
    }

    #[test]
    fn test_corrupt_payload_is_load_failure() {
        let source = MemorySource::new().with_asset("/bad.glb", b"glTF garbage".to_vec());
        let loader = ModelLoader::new(source);
        let err = block_on(loader.load_model("/bad.glb")).unwrap_err();
        assert!(matches!(err.cause(), Some(LoadCause::Gltf(_))));
        assert!(loader.get_cached("/bad.glb").is_none());
    }

    #[test]
    fn test_builders_keep_settings() {
        let cache = Arc::new(ModelCache::new());
        let loader = ModelLoader::new(MemorySource::new())
            .with_cache(Arc::clone(&cache))
            .with_decoder(DecoderModule::new("/vendor/draco/"));
        assert!(Arc::ptr_eq(loader.cache(), &cache));
        assert_eq!(loader.decoder().path(), std::path::Path::new("/vendor/draco/"));
        assert_eq!(loader.get_cached("   "), None);
    }
}
