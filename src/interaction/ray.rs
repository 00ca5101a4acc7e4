//! Ray primitives for pointer picking

use glam::{Mat4, Vec3};

const EPSILON: f32 = 1e-7;

/// A ray with an origin and a direction
///
/// Rays built by the camera have unit-length directions, so the ray
/// parameter `t` is a world-space distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Map the ray through an affine matrix without renormalizing.
    ///
    /// Keeping the direction's scale means `t` values found against the
    /// mapped ray are valid parameters on the original one.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Double-sided Möller–Trumbore intersection.
    ///
    /// Returns the ray parameter of the hit, or `None` when the ray misses,
    /// runs parallel to the triangle, or the hit lies behind the origin.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }

    /// Slab test against a box. Returns the entry and exit parameters.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(f32, f32)> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if dir.abs() < EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let (mut t0, mut t1) = ((lo - origin) * inv, (hi - origin) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        (t_max >= 0.0).then_some((t_min, t_max))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a point set; `None` when empty
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().skip(1).fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: acc.min.min(*p),
                max: acc.max.max(*p),
            },
        ))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad_at_z(z: f32) -> [Vec3; 3] {
        [
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(0.0, 1.0, z),
        ]
    }

    #[test]
    fn test_triangle_hit_distance() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let [a, b, c] = unit_quad_at_z(-5.0);
        let t = ray.intersect_triangle(a, b, c).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_double_sided() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let [a, b, c] = unit_quad_at_z(-5.0);
        // Reversed winding still hits
        assert!(ray.intersect_triangle(a, c, b).is_some());
    }

    #[test]
    fn test_triangle_behind_origin() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let [a, b, c] = unit_quad_at_z(-5.0);
        assert!(ray.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn test_triangle_miss() {
        let ray = Ray::new(Vec3::new(5.0, 5.0, 0.0), Vec3::NEG_Z);
        let [a, b, c] = unit_quad_at_z(-5.0);
        assert!(ray.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn test_aabb_slab() {
        let aabb = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let (t0, t1) = ray.intersect_aabb(&aabb).unwrap();
        assert!((t0 - 4.0).abs() < 1e-5);
        assert!((t1 - 6.0).abs() < 1e-5);

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(away.intersect_aabb(&aabb).is_none());

        let parallel_outside = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(parallel_outside.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn test_transformed_ray_keeps_parameter() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let to_local = Mat4::from_scale(Vec3::splat(2.0)).inverse();
        let local = ray.transformed(&to_local);
        // Triangle at z = -2.5 in local space sits at z = -5 in world space
        let [a, b, c] = unit_quad_at_z(-2.5);
        let t = local.intersect_triangle(a, b, c).unwrap();
        assert!((t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(&[]).is_none());
        let aabb = Aabb::from_points(&[Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0)]).unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(aabb.contains(aabb.center()));
    }
}
