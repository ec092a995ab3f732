//! Reusable per-entity pick result record

use crate::foundation::math::Vec3;

/// Result of the last successful ray test against an entity
///
/// The record is owned by the display object and overwritten by every pick
/// query that reaches the entity's bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickingCollision {
    /// Ray origin in the entity's local space
    pub ray_position: Vec3,
    /// Ray direction in the entity's local space
    pub ray_direction: Vec3,
    /// Ray origin in world space
    pub global_ray_position: Vec3,
    /// Ray direction in world space
    pub global_ray_direction: Vec3,
    /// Entry distance along the local ray
    pub ray_entry_distance: f32,
    /// The ray started inside (or on the surface of) the bounds
    pub ray_origin_is_inside_bounds: bool,
    /// Local-space surface normal at the entry point
    pub normal: Vec3,
}

impl PickingCollision {
    /// Entry point in local space
    pub fn local_position(&self) -> Vec3 {
        self.ray_position + self.ray_direction * self.ray_entry_distance
    }
}
