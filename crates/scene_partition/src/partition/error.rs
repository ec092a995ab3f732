//! Partition errors

use crate::foundation::collections::{DisplayKey, NodeKey};

/// Structural errors raised by the partition tree
///
/// Every variant indicates a bookkeeping bug in the caller; none of them is
/// a normal query outcome.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// Removal of a node that is not a direct child
    #[error("node {child:?} is not a child of {parent:?}")]
    NodeNotFound {
        /// Node the removal was requested on
        parent: NodeKey,
        /// Node that was not found among its children
        child: NodeKey,
    },

    /// A disposed or cleared node was used
    #[error("node {0:?} was used after dispose")]
    UseAfterDispose(NodeKey),

    /// An entity node was asked to hold children
    #[error("node {0:?} is an entity node and cannot hold children")]
    NotAContainer(NodeKey),

    /// The display object is not in the display list
    #[error("display object {0:?} does not exist")]
    UnknownDisplayObject(DisplayKey),

    /// The display object already has an entity node
    #[error("display object {0:?} is already in the partition")]
    AlreadyRegistered(DisplayKey),

    /// The display object has no entity node
    #[error("display object {0:?} is not in the partition")]
    NotRegistered(DisplayKey),

    /// Attaching would make a node its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Requested parent, equal to or below `child`
        parent: NodeKey,
        /// Node that was being attached
        child: NodeKey,
    },

    /// The root node is owned by the partition itself
    #[error("the partition root cannot be disposed")]
    RootDisposal,
}
