//! Camera used to unproject pointer positions into world-space rays

use crate::interaction::ray::Ray;
use crate::model::{CameraDesc, Model};
use glam::{Mat4, Vec2, Vec3};

/// Camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        aspect: f32,
        near: f32,
        /// `None` for an infinite far plane
        far: Option<f32>,
    },
    Orthographic {
        /// Half width of the view volume
        xmag: f32,
        /// Half height of the view volume
        ymag: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Right-handed projection matrix with a [0, 1] depth range
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov_y,
                aspect,
                near,
                far: Some(far),
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Self::Perspective {
                fov_y,
                aspect,
                near,
                far: None,
            } => Mat4::perspective_infinite_rh(fov_y, aspect, near),
            Self::Orthographic {
                xmag,
                ymag,
                near,
                far,
            } => Mat4::orthographic_rh(-xmag, xmag, -ymag, ymag, near, far),
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            Self::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => {
                fov_y.is_finite()
                    && fov_y > 0.0
                    && fov_y < std::f32::consts::PI
                    && aspect.is_finite()
                    && aspect > 0.0
                    && near.is_finite()
                    && near > 0.0
                    && far.map_or(true, |f| f.is_finite() && f > near)
            }
            Self::Orthographic {
                xmag,
                ymag,
                near,
                far,
            } => {
                xmag.is_finite()
                    && ymag.is_finite()
                    && xmag != 0.0
                    && ymag != 0.0
                    && near.is_finite()
                    && far.is_finite()
                    && far > near
            }
        }
    }
}

/// A camera placed in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera-to-world matrix; the camera looks down its local -Z
    pub world: Mat4,
    pub projection: Projection,
}

impl Camera {
    pub fn new(world: Mat4, projection: Projection) -> Self {
        Self { world, projection }
    }

    /// Position a camera at `eye` looking at `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, projection: Projection) -> Self {
        Self {
            world: Mat4::look_at_rh(eye, target, up).inverse(),
            projection,
        }
    }

    /// Perspective camera with a Y-up orientation; `fov_y_degrees` is vertical
    pub fn perspective(eye: Vec3, target: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self::look_at(
            eye,
            target,
            Vec3::Y,
            Projection::Perspective {
                fov_y: fov_y_degrees.to_radians(),
                aspect,
                near: 0.1,
                far: Some(1000.0),
            },
        )
    }

    /// Build a camera from a camera node found in a loaded model.
    ///
    /// `viewport_aspect` is used when the model does not fix an aspect ratio.
    pub fn from_model(model: &Model, node: usize, viewport_aspect: f32) -> Option<Self> {
        let node = model.node(node)?;
        let projection = match node.camera? {
            CameraDesc::Perspective {
                yfov,
                aspect_ratio,
                znear,
                zfar,
            } => Projection::Perspective {
                fov_y: yfov,
                aspect: aspect_ratio.unwrap_or(viewport_aspect),
                near: znear,
                far: zfar,
            },
            CameraDesc::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => Projection::Orthographic {
                xmag,
                ymag,
                near: znear,
                far: zfar,
            },
        };
        Some(Self::new(node.world, projection))
    }

    /// First camera defined by the model, if any
    pub fn first_in_model(model: &Model, viewport_aspect: f32) -> Option<Self> {
        let (index, _, _) = model.cameras().next()?;
        Self::from_model(model, index, viewport_aspect)
    }

    pub fn position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    pub fn forward(&self) -> Vec3 {
        -self.world.z_axis.truncate().normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.world.inverse()
    }

    /// Update the aspect of a perspective projection after a viewport resize
    pub fn set_aspect(&mut self, new_aspect: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = new_aspect;
        }
    }

    /// Whether the camera can produce meaningful rays
    pub fn is_valid(&self) -> bool {
        self.world.is_finite()
            && self.world.determinant() != 0.0
            && self.world.inverse().is_finite()
            && self.projection.is_valid()
    }

    /// World-space ray through a point in normalized device coordinates.
    ///
    /// Perspective rays start at the eye; orthographic rays start on the
    /// near plane and run along the view direction.
    pub fn ray_through(&self, ndc: Vec2) -> Option<Ray> {
        let inverse = (self.projection.matrix() * self.view_matrix()).inverse();
        let ray = match self.projection {
            Projection::Perspective { .. } => {
                let origin = self.position();
                let through = inverse.project_point3(ndc.extend(0.5));
                Ray::new(origin, through - origin)
            }
            Projection::Orthographic { .. } => {
                let origin = inverse.project_point3(ndc.extend(0.0));
                Ray::new(origin, self.forward())
            }
        };

        let usable = ray.origin.is_finite()
            && ray.direction.is_finite()
            && ray.direction != Vec3::ZERO;
        usable.then_some(ray)
    }
}
