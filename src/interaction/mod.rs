//! Pointer picking against the live scene
//!
//! Picking is best-effort hover and click feedback. Bad input is logged and
//! reported as "nothing under the pointer" so a render loop never fails
//! because of it.

pub mod ray;

use crate::config::PickConfig;
use crate::scene::{Camera, InstanceId, InteractiveIndex, Scene};
use glam::{Vec2, Vec3};
use ray::Ray;

/// Pointer position in normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convert a client-space position to NDC, flipping Y so up is positive
    pub fn from_client(client_x: f32, client_y: f32, viewport: &Viewport) -> Self {
        Self {
            x: (client_x - viewport.left) / viewport.width * 2.0 - 1.0,
            y: -((client_y - viewport.top) / viewport.height) * 2.0 + 1.0,
        }
    }

    /// Finite and within [-1, 1] on both axes
    pub fn is_valid(&self) -> bool {
        let in_range = |v: f32| v.is_finite() && (-1.0..=1.0).contains(&v);
        in_range(self.x) && in_range(self.y)
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Screen rectangle the scene is drawn into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// The nearest named mesh under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    /// Attachment the mesh belongs to
    pub instance: InstanceId,
    /// Node index inside that attachment's model
    pub node: usize,
    pub name: String,
    /// Distance from the ray origin to the hit, in world units
    pub distance: f32,
    pub point: Vec3,
}

/// Ray picker with configurable reach and optional target allow-list
#[derive(Debug, Clone, Default)]
pub struct Picker {
    config: PickConfig,
    targets: Option<InteractiveIndex>,
}

impl Picker {
    pub fn new(config: PickConfig) -> Self {
        Self {
            config,
            targets: None,
        }
    }

    /// Only report meshes present in the interactive index
    pub fn with_targets(mut self, targets: InteractiveIndex) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn config(&self) -> &PickConfig {
        &self.config
    }

    /// Find the named mesh nearest along the pointer ray.
    ///
    /// Returns `None` for invalid input, an empty scene, or when no named
    /// mesh is hit within the configured distance.
    pub fn pick(
        &self,
        pointer: Pointer,
        scene: Option<&Scene>,
        camera: Option<&Camera>,
    ) -> Option<PickHit> {
        if !pointer.is_valid() {
            log::error!("Invalid pointer provided: {pointer:?}");
            return None;
        }
        let Some(scene) = scene else {
            log::error!("Invalid scene provided: no scene is attached");
            return None;
        };
        let Some(camera) = camera else {
            log::error!("Invalid camera provided: no camera is attached");
            return None;
        };
        if !camera.is_valid() {
            log::error!("Invalid camera provided: degenerate transform or projection");
            return None;
        }
        let Some(ray) = camera.ray_through(pointer.as_vec2()) else {
            log::error!("Could not build a pick ray for {pointer:?}");
            return None;
        };

        self.nearest_hit(&ray, scene)
    }

    fn nearest_hit(&self, ray: &Ray, scene: &Scene) -> Option<PickHit> {
        let max_distance = self.config.max_distance;
        let mut best: Option<PickHit> = None;

        for instance in scene.instances() {
            for (index, node, mesh) in instance.model.mesh_nodes() {
                let Some(name) = node.target_name() else {
                    continue;
                };
                if let Some(targets) = &self.targets {
                    if !targets.contains(name) {
                        continue;
                    }
                }

                let world = instance.transform * node.world;
                if world.determinant() == 0.0 {
                    continue;
                }
                let inverse = world.inverse();
                if !inverse.is_finite() {
                    continue;
                }
                let local_ray = ray.transformed(&inverse);
                let limit = best.as_ref().map_or(max_distance, |hit| hit.distance);

                for primitive in &mesh.primitives {
                    let Some(bounds) = primitive.bounds else {
                        continue;
                    };
                    match local_ray.intersect_aabb(&bounds) {
                        Some((entry, _)) if entry <= limit => {}
                        _ => continue,
                    }

                    for [a, b, c] in primitive.triangles_iter() {
                        let Some(t) = local_ray.intersect_triangle(a, b, c) else {
                            continue;
                        };
                        let closer = best.as_ref().map_or(true, |hit| t < hit.distance);
                        if t <= max_distance && closer {
                            best = Some(PickHit {
                                instance: instance.id,
                                node: index,
                                name: name.to_string(),
                                distance: t,
                                point: ray.at(t),
                            });
                        }
                    }
                }
            }
        }

        best
    }
}

/// Pick with the default configuration
pub fn pick(pointer: Pointer, scene: Option<&Scene>, camera: Option<&Camera>) -> Option<PickHit> {
    Picker::default().pick(pointer, scene, camera)
}

/// Hover transition reported by [`HoverTracker`]
#[derive(Debug, Clone, PartialEq)]
pub enum HoverEvent {
    Entered(PickHit),
    Changed { from: PickHit, to: PickHit },
    Left(PickHit),
}

/// Tracks the hovered target across frames and reports transitions only
#[derive(Debug, Default, Clone)]
pub struct HoverTracker {
    current: Option<PickHit>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&PickHit> {
        self.current.as_ref()
    }

    /// Feed this frame's pick result
    pub fn update(&mut self, hit: Option<PickHit>) -> Option<HoverEvent> {
        let same_target = |a: &PickHit, b: &PickHit| a.instance == b.instance && a.node == b.node;

        match (self.current.take(), hit) {
            (None, None) => None,
            (None, Some(hit)) => {
                self.current = Some(hit.clone());
                Some(HoverEvent::Entered(hit))
            }
            (Some(prev), None) => Some(HoverEvent::Left(prev)),
            (Some(prev), Some(hit)) if same_target(&prev, &hit) => {
                self.current = Some(hit);
                None
            }
            (Some(prev), Some(hit)) => {
                self.current = Some(hit.clone());
                Some(HoverEvent::Changed {
                    from: prev,
                    to: hit,
                })
            }
        }
    }
}
