//! Spatial partition tree
//!
//! A [`Partition`] owns a tree of [`PartitionNode`]s in a generational arena.
//! Container nodes aggregate the number of entities beneath them and fit
//! their bounds around their children; entity nodes wrap exactly one display
//! object. Traversal walks the tree top-down, skipping empty branches and
//! letting a [`crate::traverser::Traverser`] prune by frustum or ray.

mod entity_node;
mod error;
mod node;
mod tree;

pub use entity_node::{is_intersecting_masks, EntityNode};
pub use error::PartitionError;
pub use node::{NodeKind, NodeRef, PartitionNode};
pub use tree::Partition;
