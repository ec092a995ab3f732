//! Partition tree nodes

use super::entity_node::EntityNode;
use crate::bounds::{BoundingVolume, Plane, Ray, AABB};
use crate::config::PartitionConfig;
use crate::display::DisplayList;
use crate::foundation::collections::{DisplayKey, NodeKey};

/// What a node holds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Interior node grouping children
    Container,
    /// Leaf wrapping one display object
    Entity(EntityNode),
}

/// Single node in the partition hierarchy
///
/// Only the owning [`super::Partition`] mutates a node; the counters and
/// bounds below are read-only from outside.
#[derive(Debug, Clone)]
pub struct PartitionNode {
    pub(super) parent: Option<NodeKey>,
    pub(super) children: Vec<NodeKey>,
    pub(super) entity_count: usize,
    /// Local volume for entity nodes, fitted world volume for containers
    pub(super) bounds: BoundingVolume,
    /// World-space box, `None` when unbounded
    pub(super) world_bounds: Option<AABB>,
    pub(super) bounds_valid: bool,
    pub(super) queued: bool,
    pub(super) kind: NodeKind,
}

impl PartitionNode {
    /// Create a detached, empty container
    pub(super) fn new_container() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            entity_count: 0,
            bounds: BoundingVolume::Null,
            world_bounds: None,
            bounds_valid: true,
            queued: false,
            kind: NodeKind::Container,
        }
    }

    /// Create a detached entity node for `owner`
    pub(super) fn new_entity(owner: DisplayKey) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            entity_count: 1,
            bounds: BoundingVolume::Null,
            world_bounds: None,
            bounds_valid: false,
            queued: false,
            kind: NodeKind::Entity(EntityNode::new(owner)),
        }
    }

    /// Parent node, `None` for the root or a detached node
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in traversal order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Number of entities reachable beneath (and including) this node
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Cached bounding volume
    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    /// Cached world-space box, `None` when unbounded
    pub fn world_bounds(&self) -> Option<&AABB> {
        self.world_bounds.as_ref()
    }

    /// False while the owner changed since the bounds were last computed
    pub fn is_bounds_valid(&self) -> bool {
        self.bounds_valid
    }

    /// Node kind
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Entity payload for leaf nodes
    pub fn entity(&self) -> Option<&EntityNode> {
        match &self.kind {
            NodeKind::Entity(entity) => Some(entity),
            NodeKind::Container => None,
        }
    }

    /// Generic frustum test: passes unless the world box is fully outside a plane
    pub fn is_in_frustum(&self, planes: &[Plane]) -> bool {
        self.world_bounds
            .map_or(true, |aabb| aabb.is_in_frustum(planes))
    }

    /// Generic ray pre-check against the world box, passes when unbounded
    pub fn is_intersecting_ray(&self, ray: &Ray) -> bool {
        self.world_bounds
            .map_or(true, |aabb| aabb.intersect_ray(&ray.origin, &ray.direction).is_some())
    }
}

/// Borrowed view of a node handed to traversers
///
/// Bundles the node with the display objects and configuration it needs to
/// answer culling questions.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    key: NodeKey,
    node: &'a PartitionNode,
    objects: &'a DisplayList,
    config: &'a PartitionConfig,
}

impl<'a> NodeRef<'a> {
    pub(super) fn new(
        key: NodeKey,
        node: &'a PartitionNode,
        objects: &'a DisplayList,
        config: &'a PartitionConfig,
    ) -> Self {
        Self { key, node, objects, config }
    }

    /// Key of the node
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// The node itself
    pub fn node(&self) -> &'a PartitionNode {
        self.node
    }

    /// Number of entities beneath the node
    pub fn entity_count(&self) -> usize {
        self.node.entity_count
    }

    /// Is the node potentially visible inside the given half-spaces
    pub fn is_in_frustum(&self, planes: &[Plane]) -> bool {
        match &self.node.kind {
            NodeKind::Container => self.node.is_in_frustum(planes),
            NodeKind::Entity(entity) => entity.is_in_frustum(self.node, self.objects, planes, self.config),
        }
    }

    /// Does the ray reach the node
    ///
    /// For entity nodes a hit also overwrites the owner's picking collision.
    pub fn is_intersecting_ray(&self, ray: &Ray) -> bool {
        match &self.node.kind {
            NodeKind::Container => self.node.is_intersecting_ray(ray),
            NodeKind::Entity(entity) => entity.is_intersecting_ray(self.node, self.objects, ray, self.config),
        }
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.key)
            .field("entity_count", &self.node.entity_count)
            .finish()
    }
}
