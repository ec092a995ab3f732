//! # Scene Partition
//!
//! Spatial partitioning for 3D scene graphs: a bounding-volume hierarchy with
//! lazy bounds invalidation, exact per-node entity counts, and a visitor
//! protocol shared by render collection and ray picking.
//!
//! ## Features
//!
//! - **Partition tree**: containers and entity leaves in a generational arena
//! - **Lazy bounds**: moved entities are queued and refit before the next traversal
//! - **Frustum culling**: whole subtrees are pruned by their fitted bounds
//! - **Ray picking**: local-space intersection with mask layers and per-entity collision records
//! - **Traversers**: plug in custom visitors next to the built-in collector and picker
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_partition::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = Scene::with_config(PartitionConfig::default())?;
//!     let cube = scene.add(DisplayObject::shape(
//!         "cube",
//!         AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0)),
//!     ))?;
//!
//!     let hits = scene.pick(Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z()));
//!     assert_eq!(hits[0].entity, cube);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod bounds;
pub mod display;
pub mod partition;
pub mod traverser;

mod scene;

pub use scene::Scene;

/// Common imports for partition users
pub mod prelude {
    pub use crate::{
        Scene,
        bounds::{BoundingVolume, BoundsType, Frustum, Plane, Ray, AABB},
        config::{Config, ConfigError, PartitionConfig},
        display::{DisplayObject, EntityKind, MaskLayers, PickingCollision},
        foundation::{
            collections::{DisplayKey, NodeKey},
            math::{Mat4, Quat, Transform, Vec3},
        },
        partition::{NodeRef, Partition, PartitionError},
        traverser::{PickHit, RenderCollection, Traverser},
    };
}
