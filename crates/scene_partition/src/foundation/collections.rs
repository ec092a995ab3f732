//! Arena collections used by the scene and the partition tree
//!
//! Nodes and display objects live in generational slot maps so that a key
//! held after its slot has been released is detected instead of aliasing
//! whatever reused the slot.

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Handle to a node stored in a [`crate::partition::Partition`]
    pub struct NodeKey;

    /// Handle to a display object stored in a [`crate::display::DisplayList`]
    pub struct DisplayKey;
}

/// Arena of values addressed by a typed key
pub type Arena<K, T> = SlotMap<K, T>;
