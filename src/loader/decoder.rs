//! Compressed-geometry decoder module
//!
//! Primitives compressed with `KHR_draco_mesh_compression` carry an opaque
//! payload that must be expanded by an external decoder. The decoder is
//! resolved from a configured module location the first time a compressed
//! primitive is met, and reused afterwards.

use crate::error::DecoderError;
use glam::Vec3;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// glTF extension name for Draco-compressed primitives
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// A compressed primitive handed to the decoder
#[derive(Debug, Clone)]
pub struct CompressedPrimitive<'a> {
    pub mesh: usize,
    pub primitive: usize,
    /// Raw bytes of the extension's buffer view
    pub payload: &'a [u8],
    /// Attribute semantic to compressed attribute id
    pub attributes: Vec<(String, u32)>,
}

impl CompressedPrimitive<'_> {
    /// Compressed attribute id for a semantic such as `POSITION`
    pub fn attribute(&self, semantic: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|(name, _)| name == semantic)
            .map(|(_, id)| *id)
    }
}

/// Geometry recovered from a compressed primitive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedGeometry {
    pub positions: Vec<Vec3>,
    /// Triangle-list indices; empty means non-indexed
    pub indices: Vec<u32>,
}

/// Trait for compressed-geometry decoders
pub trait GeometryDecoder: Send + Sync {
    fn decode(&self, primitive: &CompressedPrimitive<'_>) -> Result<DecodedGeometry, DecoderError>;
}

type DecoderFactory =
    Box<dyn Fn(&Path) -> Result<Arc<dyn GeometryDecoder>, DecoderError> + Send + Sync>;

/// Lazily initialized decoder shared by every load of a loader
pub struct DecoderModule {
    path: PathBuf,
    factory: Option<DecoderFactory>,
    decoder: Mutex<Option<Arc<dyn GeometryDecoder>>>,
}

impl std::fmt::Debug for DecoderModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderModule")
            .field("path", &self.path)
            .field("has_factory", &self.factory.is_some())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl DecoderModule {
    /// A module location with no decoder behind it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            factory: None,
            decoder: Mutex::new(None),
        }
    }

    /// Resolve the decoder through `factory` on first use
    pub fn with_factory<F>(path: impl Into<PathBuf>, factory: F) -> Self
    where
        F: Fn(&Path) -> Result<Arc<dyn GeometryDecoder>, DecoderError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            factory: Some(Box::new(factory)),
            decoder: Mutex::new(None),
        }
    }

    /// Use an already constructed decoder
    pub fn with_decoder(path: impl Into<PathBuf>, decoder: Arc<dyn GeometryDecoder>) -> Self {
        Self {
            path: path.into(),
            factory: None,
            decoder: Mutex::new(Some(decoder)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.decoder.lock().is_some()
    }

    /// The decoder, initializing it if needed.
    ///
    /// A failed initialization is not remembered; the next call tries again.
    pub fn decoder(&self) -> Result<Arc<dyn GeometryDecoder>, DecoderError> {
        let mut slot = self.decoder.lock();
        if let Some(decoder) = slot.as_ref() {
            return Ok(Arc::clone(decoder));
        }

        let factory = self
            .factory
            .as_ref()
            .ok_or_else(|| DecoderError::Unavailable(self.path.display().to_string()))?;
        let decoder = factory(&self.path)?;
        log::info!("Geometry decoder initialized from {}", self.path.display());
        *slot = Some(Arc::clone(&decoder));
        Ok(decoder)
    }
}

impl Default for DecoderModule {
    fn default() -> Self {
        Self::new(crate::config::LoaderConfig::default().decoder_path)
    }
}
