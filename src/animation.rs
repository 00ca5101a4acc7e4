//! Per-frame procedural motion for the showcase scenes
//!
//! Both animations are pure functions of their inputs plus the caller's
//! random source or clock, so hosts decide when frames happen.

use crate::config::{CarouselConfig, DustConfig};
use crate::scene::Scene;
use glam::{Mat4, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

/// Volume the dust motes live in
pub const DUST_MIN: Vec3 = Vec3::new(-2.5, 1.0, -2.5);
pub const DUST_MAX: Vec3 = Vec3::new(2.5, 4.0, 2.5);

/// Drifting dust motes inside the room volume
#[derive(Debug, Clone)]
pub struct DustField {
    config: DustConfig,
    positions: Vec<Vec3>,
}

impl DustField {
    /// Scatter `config.count` motes uniformly through the volume
    pub fn new(config: &DustConfig, rng: &mut impl Rng) -> Self {
        let positions = (0..config.count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(DUST_MIN.x..DUST_MAX.x),
                    rng.gen_range(DUST_MIN.y..DUST_MAX.y),
                    rng.gen_range(DUST_MIN.z..DUST_MAX.z),
                )
            })
            .collect();
        Self {
            config: *config,
            positions,
        }
    }

    /// Advance one frame: jitter every mote and wrap it back into the volume
    pub fn step(&mut self, rng: &mut impl Rng) {
        let amplitude = self.config.drift_speed * 0.1;
        for p in &mut self.positions {
            let jitter = Vec3::new(
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
            );
            *p = wrap(*p + jitter * amplitude);
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn config(&self) -> &DustConfig {
        &self.config
    }
}

/// Move a point that left the volume to the opposite face, per axis
pub fn wrap(p: Vec3) -> Vec3 {
    let axis = |v: f32, min: f32, max: f32| {
        if v > max {
            min
        } else if v < min {
            max
        } else {
            v
        }
    };
    Vec3::new(
        axis(p.x, DUST_MIN.x, DUST_MAX.x),
        axis(p.y, DUST_MIN.y, DUST_MAX.y),
        axis(p.z, DUST_MIN.z, DUST_MAX.z),
    )
}

/// Evenly spaced points on a horizontal circle, rotating with time
pub fn orbit_positions(elapsed: f32, count: usize, radius: f32, speed: f32) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let angle = elapsed * speed + i as f32 / count as f32 * TAU;
            Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
        })
        .collect()
}

/// Arranges every scene attachment on a rotating circle
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductCarousel {
    pub config: CarouselConfig,
}

impl ProductCarousel {
    pub fn new(config: CarouselConfig) -> Self {
        Self { config }
    }

    /// Write this frame's positions into each attachment's transform
    pub fn apply(&self, scene: &mut Scene, elapsed: f32) {
        let instances = scene.instances_mut();
        let positions = orbit_positions(
            elapsed,
            instances.len(),
            self.config.radius,
            self.config.rotation_speed,
        );
        for (instance, position) in instances.iter_mut().zip(positions) {
            instance.transform = Mat4::from_translation(position);
        }
    }
}
