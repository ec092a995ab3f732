//! Axis-aligned bounding boxes

use super::plane::Plane;
use super::volume::RayIntersection;
use crate::foundation::math::{utils, Mat4, Vec3};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
    
    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing every point, `None` for an empty iterator
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |aabb, point| Self {
            min: aabb.min.inf(&point),
            max: aabb.max.sup(&point),
        }))
    }
    
    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
    
    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min, self.max);
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ]
    }

    /// Check if the box covers a point in the XY plane, ignoring depth
    pub fn contains_point_2d(&self, x: f32, y: f32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        AABB::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Box enclosing this box after transformation by `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let corners = self.corners().map(|corner| utils::transform_position(matrix, &corner));
        // Eight corners, never empty
        AABB::from_points(corners).unwrap_or(*self)
    }

    /// Check whether the box is not fully outside any of the planes
    pub fn is_in_frustum(&self, planes: &[Plane]) -> bool {
        for plane in planes {
            // Corner furthest along the plane normal
            let mut p = self.min;
            if plane.normal.x >= 0.0 { p.x = self.max.x; }
            if plane.normal.y >= 0.0 { p.y = self.max.y; }
            if plane.normal.z >= 0.0 { p.z = self.max.z; }
            
            if plane.distance_to_point(&p) < 0.0 {
                return false;
            }
        }
        true
    }
    
    /// Test ray intersection with this AABB using the slab method
    ///
    /// Returns the entry distance and the normal of the entry face. A ray
    /// starting inside the box reports distance 0 and a normal facing back
    /// along the ray.
    pub fn intersect_ray(&self, origin: &Vec3, direction: &Vec3) -> Option<RayIntersection> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_axis = None;

        for axis in 0..3 {
            let (o, d) = (origin[axis], direction[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() <= f32::EPSILON {
                // Parallel to this slab, must already be inside it
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (near, far) = {
                let t1 = (lo - o) * inv;
                let t2 = (hi - o) * inv;
                if t1 <= t2 { (t1, t2) } else { (t2, t1) }
            };

            if near > t_enter {
                t_enter = near;
                enter_axis = Some(axis);
            }
            t_exit = t_exit.min(far);
        }

        if t_exit < t_enter || t_exit < 0.0 {
            return None;
        }

        match enter_axis {
            Some(axis) if t_enter >= 0.0 => {
                let mut normal = Vec3::zeros();
                normal[axis] = -direction[axis].signum();
                Some(RayIntersection { distance: t_enter, normal })
            }
            _ => Some(RayIntersection::inside(direction)),
        }
    }
}
