//! Display objects owned by the scene
//!
//! A display object is the scene-side owner of an entity in the partition
//! tree. The partition reads its visibility, transform, bounds and masks,
//! and writes pick results into its picking collision record.

mod display_list;
mod display_object;
mod entities;
mod picking;

pub use display_list::DisplayList;
pub use display_object::{DisplayObject, MaskLayers};
pub use entities::{DirectionalLight, EntityKind, LineSegment};
pub use picking::PickingCollision;
