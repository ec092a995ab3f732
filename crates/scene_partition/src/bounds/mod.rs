//! Bounding volumes, planes and rays
//!
//! The partition tree only needs three capabilities from a bounding volume:
//! a half-space (frustum) test, a ray intersection that reports the entry
//! distance and surface normal, and an unbounded sentinel that passes both.

mod aabb;
mod plane;
mod ray;
mod sphere;
mod volume;

pub use aabb::AABB;
pub use plane::{Frustum, Plane};
pub use ray::Ray;
pub use sphere::BoundingSphere;
pub use volume::{BoundingVolume, BoundsType, RayIntersection};
