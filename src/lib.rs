//! tidyroom_asset - Cached glTF loading and pointer picking for 3D showcases
//!
//! # Features
//! - Async model loading through pluggable byte sources
//! - Session-wide cache keyed by path, with in-flight deduplication
//! - Lazily initialized Draco decoder module
//! - Ray picking of named meshes under the pointer
//! - Dust motes and product carousel animation
//!
//! # Quick Start
//!
//! ```ignore
//! use tidyroom_asset::{pick, Camera, FileSource, ModelLoader, Pointer, Scene};
//!
//! let loader = ModelLoader::new(FileSource::new("public"));
//! let room = loader.load_model("/models/room.glb").await?;
//!
//! let mut scene = Scene::new();
//! scene.attach("/models/room.glb", room);
//! let camera = Camera::perspective(eye, target, 75.0, aspect);
//! if let Some(hit) = pick(Pointer::new(0.1, -0.2), Some(&scene), Some(&camera)) {
//!     println!("clicked {}", hit.name);
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `runtime-tokio`: Enable the Tokio spawner for background preloading

// Core modules
pub mod cache;
pub mod interaction;
pub mod loader;
pub mod runtime;
pub mod scene;

// Support modules
pub mod animation;
pub mod config;
pub mod model;

// Error types
mod error;
pub use error::{AssetError, DecoderError, LoadCause, Result, SourceError};

pub use cache::metrics::{LoadMetrics, LoadMetricsHandle};
pub use cache::ModelCache;

pub use config::{CarouselConfig, CrossOrigin, DustConfig, LoaderConfig, PickConfig, RoomConfig};

pub use loader::{
    normalize_path, AssetSource, CompressedPrimitive, DecodedGeometry, DecoderModule,
    FetchRequest, FileSource, GeometryDecoder, MemorySource, ModelLoader, DRACO_EXTENSION,
};

#[cfg(feature = "runtime-tokio")]
pub use runtime::TokioSpawner;
pub use runtime::{AsyncSpawner, InlineSpawner, JoinHandle};

pub use model::{
    CameraDesc, LightDesc, LightKind, Mesh, Model, ModelBuilder, ModelId, ModelMetadata, Node,
    Primitive, PrimitiveMode, Transform,
};

pub use scene::{Camera, InstanceId, InteractiveIndex, Projection, Scene, SceneInstance};

pub use interaction::ray::{Aabb, Ray};
pub use interaction::{pick, HoverEvent, HoverTracker, PickHit, Picker, Pointer, Viewport};

pub use animation::{orbit_positions, DustField, ProductCarousel};

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
