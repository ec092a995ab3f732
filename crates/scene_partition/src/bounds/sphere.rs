//! Bounding spheres

use super::aabb::AABB;
use super::plane::Plane;
use super::volume::RayIntersection;
use crate::foundation::math::Vec3;

/// A bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Box tightly enclosing the sphere
    pub fn to_aabb(&self) -> AABB {
        AABB::from_center_extents(self.center, Vec3::repeat(self.radius))
    }

    /// Check whether the sphere is not fully outside any of the planes
    pub fn is_in_frustum(&self, planes: &[Plane]) -> bool {
        planes
            .iter()
            .all(|plane| plane.distance_to_point(&self.center) >= -self.radius)
    }

    /// Check if the sphere covers a point in the XY plane, ignoring depth
    pub fn contains_point_2d(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Test ray intersection with this sphere
    ///
    /// Returns the entry distance and outward surface normal. A ray starting
    /// inside reports distance 0.
    pub fn intersect_ray(&self, origin: &Vec3, direction: &Vec3) -> Option<RayIntersection> {
        let a = direction.dot(direction);
        let oc = origin - self.center;
        let c = oc.dot(&oc) - self.radius * self.radius;

        if c < 0.0 {
            return Some(RayIntersection::inside(direction));
        }
        if a <= f32::EPSILON {
            return None;
        }

        let b = oc.dot(direction);
        if c == 0.0 {
            // Starting on the surface
            return (b <= 0.0).then(|| RayIntersection {
                distance: 0.0,
                normal: oc / self.radius,
            });
        }
        if b > 0.0 {
            return None; // Outside and pointing away
        }

        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let t = (-b - discriminant.sqrt()) / a;
        let hit_point = origin + direction * t;
        Some(RayIntersection {
            distance: t.max(0.0),
            normal: (hit_point - self.center) / self.radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_ray_hit() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let hit = sphere
            .intersect_ray(&Vec3::zeros(), &Vec3::new(0.0, 0.0, 1.0))
            .expect("ray should hit");

        assert_relative_eq!(hit.distance, 8.0);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_sphere_ray_unnormalized_direction() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 10.0), 2.0);
        let hit = sphere
            .intersect_ray(&Vec3::zeros(), &Vec3::new(0.0, 0.0, 2.0))
            .expect("ray should hit");
        assert_relative_eq!(hit.distance, 4.0);
    }

    #[test]
    fn test_sphere_ray_miss() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 10.0), 2.0);
        assert!(sphere.intersect_ray(&Vec3::new(5.0, 0.0, 0.0), &Vec3::new(0.0, 0.0, 1.0)).is_none());
        assert!(sphere.intersect_ray(&Vec3::zeros(), &Vec3::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn test_sphere_ray_surface_origin() {
        let sphere = BoundingSphere::new(Vec3::zeros(), 1.0);
        let hit = sphere
            .intersect_ray(&Vec3::new(0.0, 0.0, -1.0), &Vec3::new(0.0, 0.0, 1.0))
            .expect("surface counts as a hit");
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_sphere_frustum() {
        let sphere = BoundingSphere::new(Vec3::zeros(), 1.0);
        assert!(sphere.is_in_frustum(&[Plane::new(Vec3::new(1.0, 0.0, 0.0), 0.5).unwrap()]));
        assert!(!sphere.is_in_frustum(&[Plane::new(Vec3::new(1.0, 0.0, 0.0), -1.5).unwrap()]));
    }
}
