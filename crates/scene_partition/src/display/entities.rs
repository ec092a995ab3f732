//! Entity kinds a display object can represent
//!
//! Traversers match on [`EntityKind`] to route an accepted entity to the
//! right handling (renderable batch, light list, sky).

use crate::bounds::{BoundingSphere, AABB};
use crate::foundation::math::{utils, Mat4, Vec3};

/// A line segment primitive
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    /// Start position in local space
    pub start: Vec3,
    /// End position in local space
    pub end: Vec3,
    half_thickness: f32,
}

impl LineSegment {
    /// Create a line segment
    pub fn new(start: Vec3, end: Vec3, thickness: f32) -> Self {
        Self {
            start,
            end,
            half_thickness: thickness * 0.5,
        }
    }

    /// Full line thickness
    pub fn thickness(&self) -> f32 {
        self.half_thickness * 2.0
    }

    /// Set the full line thickness
    pub fn set_thickness(&mut self, thickness: f32) {
        self.half_thickness = thickness * 0.5;
    }

    /// Box spanned by the two end points
    pub fn box_bounds(&self) -> AABB {
        AABB::new(self.start.inf(&self.end), self.start.sup(&self.end))
    }

    /// Sphere centered on the midpoint reaching both end points
    pub fn sphere_bounds(&self) -> BoundingSphere {
        let half = (self.end - self.start) * 0.5;
        BoundingSphere::new(self.start + half, half.magnitude())
    }
}

/// A light shining uniformly along one direction
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// Local direction the light points along
    pub direction: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -1.0, 1.0))
    }
}

impl DirectionalLight {
    /// Create a light pointing along `direction`
    pub fn new(direction: Vec3) -> Self {
        Self { direction }
    }

    /// Normalized world-space direction under `scene_transform`
    pub fn scene_direction(&self, scene_transform: &Mat4) -> Vec3 {
        let direction = utils::transform_direction(scene_transform, &self.direction);
        direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
    }
}

/// What a display object is, as far as traversers care
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Generic mesh-like geometry with a local box
    Shape {
        /// Local-space extent of the geometry
        bounds: AABB,
    },
    /// Line segment primitive
    LineSegment(LineSegment),
    /// Directional light
    DirectionalLight(DirectionalLight),
    /// Sky drawn at infinity around the camera
    Skybox,
}

impl EntityKind {
    /// Short name used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shape { .. } => "shape",
            Self::LineSegment(_) => "line_segment",
            Self::DirectionalLight(_) => "directional_light",
            Self::Skybox => "skybox",
        }
    }

    /// Kinds drawn as geometry by a renderer
    pub fn is_renderable(&self) -> bool {
        matches!(self, Self::Shape { .. } | Self::LineSegment(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Transform};
    use approx::assert_relative_eq;

    #[test]
    fn test_line_segment_bounds() {
        let line = LineSegment::new(Vec3::new(2.0, -1.0, 0.0), Vec3::new(-2.0, 3.0, 4.0), 3.0);
        assert_relative_eq!(line.thickness(), 3.0);

        let aabb = line.box_bounds();
        assert_relative_eq!(aabb.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_relative_eq!(aabb.max, Vec3::new(2.0, 3.0, 4.0));

        let sphere = line.sphere_bounds();
        assert_relative_eq!(sphere.center, Vec3::new(0.0, 1.0, 2.0));
        assert_relative_eq!(sphere.radius, (4.0f32 + 4.0 + 4.0).sqrt());
    }

    #[test]
    fn test_light_scene_direction() {
        let light = DirectionalLight::new(Vec3::new(0.0, 0.0, 2.0));
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        let transform = Transform::from_position_rotation(Vec3::new(5.0, 5.0, 5.0), rotation);

        let direction = light.scene_direction(&transform.to_matrix());
        assert_relative_eq!(direction, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }
}
