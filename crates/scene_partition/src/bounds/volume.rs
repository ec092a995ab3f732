//! Bounding volume selection and the unbounded sentinel

use super::aabb::AABB;
use super::plane::Plane;
use super::sphere::BoundingSphere;
use crate::foundation::math::{Mat4, Vec3};

/// Which kind of volume an entity builds from its local geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsType {
    /// Unbounded: always passes frustum and ray tests
    Null,
    /// Axis-aligned box around the geometry
    #[default]
    AxisAlignedBox,
    /// Sphere around the geometry
    Sphere,
}

/// Result of intersecting a ray with a bounding volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayIntersection {
    /// Entry distance in units of the ray direction, 0 when starting inside
    pub distance: f32,
    /// Surface normal at the entry point
    pub normal: Vec3,
}

impl RayIntersection {
    /// Intersection for a ray that starts inside the volume
    pub fn inside(direction: &Vec3) -> Self {
        Self {
            distance: 0.0,
            normal: -direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros),
        }
    }
}

/// A bounding volume owned by a partition node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundingVolume {
    /// Sentinel for deliberately unbounded geometry
    #[default]
    Null,
    /// Axis-aligned box
    Box(AABB),
    /// Sphere
    Sphere(BoundingSphere),
}

impl BoundingVolume {
    /// Is this the unbounded sentinel
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check the volume against a set of half-spaces expressed in the same space
    pub fn is_in_frustum(&self, planes: &[Plane]) -> bool {
        match self {
            Self::Null => true,
            Self::Box(aabb) => aabb.is_in_frustum(planes),
            Self::Sphere(sphere) => sphere.is_in_frustum(planes),
        }
    }

    /// Intersect a ray expressed in the same space as the volume
    pub fn ray_intersection(&self, origin: &Vec3, direction: &Vec3) -> Option<RayIntersection> {
        match self {
            Self::Null => Some(RayIntersection::inside(direction)),
            Self::Box(aabb) => aabb.intersect_ray(origin, direction),
            Self::Sphere(sphere) => sphere.intersect_ray(origin, direction),
        }
    }

    /// 2D point coverage in the volume's own space
    pub fn contains_point_2d(&self, x: f32, y: f32) -> bool {
        match self {
            Self::Null => true,
            Self::Box(aabb) => aabb.contains_point_2d(x, y),
            Self::Sphere(sphere) => sphere.contains_point_2d(x, y),
        }
    }

    /// World-space box enclosing the volume, `None` when unbounded
    pub fn world_aabb(&self, world_transform: &Mat4) -> Option<AABB> {
        match self {
            Self::Null => None,
            Self::Box(aabb) => Some(aabb.transformed(world_transform)),
            Self::Sphere(sphere) => Some(sphere.to_aabb().transformed(world_transform)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_bounds_always_pass() {
        let volume = BoundingVolume::Null;
        let outside = [Plane::new(Vec3::new(1.0, 0.0, 0.0), -1000.0).unwrap()];

        assert!(volume.is_in_frustum(&outside));
        let hit = volume
            .ray_intersection(&Vec3::new(1e6, 0.0, 0.0), &Vec3::new(0.0, 1.0, 0.0))
            .expect("null bounds always intersect");
        assert_eq!(hit.distance, 0.0);
        assert!(volume.world_aabb(&Mat4::identity()).is_none());
    }

    #[test]
    fn test_default_bounds_type_is_box() {
        assert_eq!(BoundsType::default(), BoundsType::AxisAlignedBox);
    }
}
