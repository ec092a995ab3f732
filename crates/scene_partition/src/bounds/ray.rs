//! Rays for picking

use crate::foundation::math::{utils, Mat4, Vec3};

/// A ray for ray casting and picking
///
/// The direction is kept as given. Transforming a ray into an entity's local
/// space can scale its direction, and entry distances are expressed in units
/// of that direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at parameter t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray: origin as a point, direction as a vector
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self {
            origin: utils::transform_position(matrix, &self.origin),
            direction: utils::transform_direction(matrix, &self.direction),
        }
    }
}
