//! Traverser protocol
//!
//! The partition tree drives a traverser through exactly two calls:
//! [`Traverser::enter_node`] decides whether a subtree is descended into and
//! [`Traverser::apply_entity`] hands over each accepted leaf. What "accepted"
//! means (inside a frustum, hit by a ray) is entirely up to the traverser.

mod collector;
mod picker;

pub use collector::{LightEntry, RenderCollection, RenderCollector};
pub use picker::{PickHit, RaycastPicker};

use crate::display::DisplayObject;
use crate::foundation::collections::DisplayKey;
use crate::partition::NodeRef;

/// Visitor driven by [`crate::partition::Partition::accept_traverser`]
pub trait Traverser {
    /// Called for every non-empty node reached; return false to prune it
    fn enter_node(&mut self, node: &NodeRef<'_>) -> bool;

    /// Called for every entity whose node was entered
    fn apply_entity(&mut self, key: DisplayKey, entity: &DisplayObject);
}

/// Counters gathered during one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes offered to `enter_node`
    pub nodes_entered: usize,
    /// Nodes for which `enter_node` returned false
    pub nodes_rejected: usize,
    /// Entities passed to `apply_entity`
    pub entities_applied: usize,
}

impl TraversalStats {
    pub(crate) fn record_enter(&mut self, accepted: bool) -> bool {
        self.nodes_entered += 1;
        if !accepted {
            self.nodes_rejected += 1;
        }
        accepted
    }
}
