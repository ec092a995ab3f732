//! Planes and view frustums

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Plane defined by normal and distance from origin
///
/// Points with a non-negative signed distance are on the inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized, pointing to the inside half-space)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create the plane `normal·p + distance = 0`
    ///
    /// Both terms are scaled by the normal's length, so a non-unit normal
    /// describes the same half-space as [`Plane::from_coefficients`]. Returns
    /// `None` for a zero normal.
    pub fn new(normal: Vec3, distance: f32) -> Option<Self> {
        Self::from_coefficients(Vec4::new(normal.x, normal.y, normal.z, distance))
    }

    /// Create a plane from the equation `ax + by + cz + d = 0`, normalized
    ///
    /// Returns `None` for a degenerate (zero-length) normal.
    pub fn from_coefficients(coefficients: Vec4) -> Option<Self> {
        let normal = Vec3::new(coefficients.x, coefficients.y, coefficients.z);
        let length = normal.magnitude();
        if length <= f32::EPSILON {
            return None;
        }
        Some(Self {
            normal: normal / length,
            distance: coefficients.w / length,
        })
    }
    
    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Set of inward-facing half-spaces used for visibility culling
#[derive(Debug, Clone, Default)]
pub struct Frustum {
    /// Culling planes; a volume is visible unless fully outside one of them
    pub planes: Vec<Plane>,
}

impl Frustum {
    /// Create a frustum from an arbitrary set of planes
    pub fn new(planes: Vec<Plane>) -> Self {
        Self { planes }
    }
    
    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for a clip space with depth in `[0, 1]`.
    /// Planes are ordered left, right, bottom, top, near, far. Degenerate
    /// rows (for example an infinite far plane) are skipped.
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { view_projection.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2]
            .into_iter()
            .filter_map(Plane::from_coefficients)
            .collect();

        Self { planes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();
        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;
        result
    }

    fn inside_all(frustum: &Frustum, point: Vec3) -> bool {
        frustum.planes.iter().all(|plane| plane.distance_to_point(&point) >= 0.0)
    }

    #[test]
    fn test_plane_new_scales_distance_with_normal() {
        let plane = Plane::new(Vec3::new(2.0, 0.0, 0.0), -4.0).unwrap();
        assert_eq!(Some(plane), Plane::from_coefficients(Vec4::new(2.0, 0.0, 0.0, -4.0)));
        assert_relative_eq!(plane.normal, Vec3::x());
        assert_relative_eq!(plane.distance, -2.0);

        // Boundary sits at x = 2 regardless of the normal's length
        assert_relative_eq!(plane.distance_to_point(&Vec3::new(2.0, 7.0, -3.0)), 0.0);
        assert!(plane.distance_to_point(&Vec3::new(3.0, 0.0, 0.0)) > 0.0);
        assert!(plane.distance_to_point(&Vec3::new(1.0, 0.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_zero_normal_is_rejected() {
        assert!(Plane::new(Vec3::zeros(), 1.0).is_none());
        assert!(Plane::from_coefficients(Vec4::new(0.0, 0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_frustum_from_perspective_matrix() {
        // Camera at the origin looking down +Z
        let frustum = Frustum::from_matrix(&perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0));
        assert_eq!(frustum.planes.len(), 6);

        assert!(inside_all(&frustum, Vec3::new(0.0, 0.0, 10.0)));
        assert!(!inside_all(&frustum, Vec3::new(0.0, 0.0, -10.0)));
        assert!(!inside_all(&frustum, Vec3::new(0.0, 0.0, 200.0)));
        assert!(!inside_all(&frustum, Vec3::new(50.0, 0.0, 10.0)));
    }
}
