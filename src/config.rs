//! Configuration values for loading, picking and the room scene
//!
//! Every struct carries the showcase defaults through `Default`, so hosts
//! only override what they need.

use std::path::PathBuf;

/// Cross-origin policy forwarded to asset sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossOrigin {
    /// Fetch without credentials
    #[default]
    Anonymous,
    /// Fetch with credentials
    UseCredentials,
}

/// Model loader configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Location of the compressed-geometry decoder assets
    pub decoder_path: PathBuf,
    /// Cross-origin policy for every fetch issued by the loader
    pub cross_origin: CrossOrigin,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            decoder_path: PathBuf::from("/draco/"),
            cross_origin: CrossOrigin::Anonymous,
        }
    }
}

/// Pointer picking configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickConfig {
    /// Maximum ray length in world units
    pub max_distance: f32,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self { max_distance: 10.0 }
    }
}

/// Room scene settings
#[derive(Debug, Clone, PartialEq)]
pub struct RoomConfig {
    /// Model to load for the room view
    pub model_path: String,
    /// Mesh names that react to hover and click
    pub interactive_element_ids: Vec<String>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            model_path: "/models/room.glb".to_string(),
            interactive_element_ids: ["table", "sofa", "window"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Dust mote particle settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustConfig {
    /// Number of motes
    pub count: usize,
    /// Drift applied per frame (scaled by 0.1 and a random factor)
    pub drift_speed: f32,
}

impl Default for DustConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            drift_speed: 0.01,
        }
    }
}

/// Product carousel settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselConfig {
    /// Radius of the circular arrangement
    pub radius: f32,
    /// Angular speed in radians per second
    pub rotation_speed: f32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            rotation_speed: 0.01,
        }
    }
}
