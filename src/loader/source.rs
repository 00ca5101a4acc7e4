//! Byte sources for model payloads
//!
//! The loader never touches the filesystem directly: every fetch goes
//! through an [`AssetSource`], which lets tests and demos serve models from
//! memory and count requests.

use crate::config::CrossOrigin;
use crate::error::SourceError;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// One fetch issued by the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Normalized logical path, e.g. `/models/room.glb`
    pub path: String,
    pub cross_origin: CrossOrigin,
}

impl FetchRequest {
    pub fn new(path: impl Into<String>, cross_origin: CrossOrigin) -> Self {
        Self {
            path: path.into(),
            cross_origin,
        }
    }
}

/// Trait for retrieving raw asset bytes
///
/// Uses async-trait for dyn compatibility
#[async_trait::async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the full payload for a request
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, SourceError>;
}

/// Serves logical paths from a directory on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a logical path under the root, refusing paths that climb out of it
    pub fn resolve(&self, path: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(SourceError::Fetch(format!("path escapes asset root: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl AssetSource for FileSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, SourceError> {
        let full = self.resolve(&request.path)?;
        match std::fs::read(&full) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(request.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory catalogue that records every request it serves
#[derive(Debug, Default)]
pub struct MemorySource {
    assets: RwLock<HashMap<String, Vec<u8>>>,
    failures: RwLock<HashMap<String, String>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_asset(self, path: &str, data: Vec<u8>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn insert(&self, path: &str, data: Vec<u8>) {
        self.assets.write().insert(path.to_string(), data);
    }

    /// Make every fetch of `path` fail until [`MemorySource::clear_failure`]
    pub fn fail(&self, path: &str, message: &str) {
        self.failures
            .write()
            .insert(path.to_string(), message.to_string());
    }

    pub fn clear_failure(&self, path: &str) {
        self.failures.write().remove(path);
    }

    /// Number of fetches issued for `path`, failed ones included
    pub fn fetch_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn total_fetches(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every request served so far, in order
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl AssetSource for MemorySource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, SourceError> {
        self.requests.lock().push(request.clone());

        if let Some(message) = self.failures.read().get(&request.path) {
            return Err(SourceError::Fetch(message.clone()));
        }
        self.assets
            .read()
            .get(&request.path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(request.path.clone()))
    }
}
