//! Partition: owner of the node arena
//!
//! Structural operations keep `entity_count` exact on every ancestor.
//! Bounds are lazy: invalidation only queues a node, and the queue is
//! drained at the start of the next traversal (or by an explicit
//! [`Partition::update`]).

use log::{debug, trace, warn};

use super::error::PartitionError;
use super::node::{NodeKind, NodeRef, PartitionNode};
use crate::bounds::{BoundingVolume, AABB};
use crate::config::PartitionConfig;
use crate::display::DisplayList;
use crate::foundation::collections::{Arena, DisplayKey, NodeKey, SecondaryMap};
use crate::traverser::Traverser;

/// Spatial partition tree with lazy bounds and entity node reuse
#[derive(Debug)]
pub struct Partition {
    nodes: Arena<NodeKey, PartitionNode>,
    root: NodeKey,
    /// Entity node of every display object in the partition
    entity_nodes: SecondaryMap<DisplayKey, NodeKey>,
    /// Cleared, detached entity nodes ready for reuse
    pool: Vec<NodeKey>,
    /// Nodes whose bounds must be refreshed before the next traversal
    update_queue: Vec<NodeKey>,
    config: PartitionConfig,
}

impl Default for Partition {
    fn default() -> Self {
        Self::new(PartitionConfig::default())
    }
}

impl Partition {
    /// Create a partition holding only an empty root container
    pub fn new(config: PartitionConfig) -> Self {
        let mut nodes = Arena::with_key();
        let root = nodes.insert(PartitionNode::new_container());

        Self {
            nodes,
            root,
            entity_nodes: SecondaryMap::new(),
            pool: Vec::with_capacity(config.entity_pool_capacity),
            update_queue: Vec::new(),
            config,
        }
    }

    /// Root container
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Active configuration
    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Total number of entities attached beneath the root
    pub fn entity_count(&self) -> usize {
        self.nodes.get(self.root).map_or(0, PartitionNode::entity_count)
    }

    /// Number of live nodes in the arena, pooled ones included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of cleared entity nodes waiting for reuse
    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// Look up a node
    pub fn node(&self, key: NodeKey) -> Result<&PartitionNode, PartitionError> {
        self.nodes.get(key).ok_or(PartitionError::UseAfterDispose(key))
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut PartitionNode, PartitionError> {
        self.nodes.get_mut(key).ok_or(PartitionError::UseAfterDispose(key))
    }

    /// Entity node representing a display object
    pub fn entity_node(&self, object: DisplayKey) -> Option<NodeKey> {
        self.entity_nodes.get(object).copied()
    }

    /// Is there work queued for the next refresh
    pub fn needs_update(&self) -> bool {
        !self.update_queue.is_empty()
    }

    /// Create a detached container node
    pub fn create_container(&mut self) -> NodeKey {
        self.nodes.insert(PartitionNode::new_container())
    }

    /// Create a container and attach it under `parent`
    pub fn add_container(&mut self, parent: NodeKey) -> Result<NodeKey, PartitionError> {
        let container = self.create_container();
        if let Err(error) = self.add_child(parent, container) {
            self.nodes.remove(container);
            return Err(error);
        }
        Ok(container)
    }

    /// Append `child` to `parent` and add its entity count to every ancestor
    ///
    /// No duplicate detection: the caller must not attach a node twice.
    /// Attaching a node under itself or one of its descendants fails with
    /// [`PartitionError::CycleDetected`] and leaves the tree untouched.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), PartitionError> {
        if !matches!(self.node(parent)?.kind, NodeKind::Container) {
            return Err(PartitionError::NotAContainer(parent));
        }

        let mut ancestor = Some(parent);
        while let Some(key) = ancestor {
            if key == child {
                return Err(PartitionError::CycleDetected { parent, child });
            }
            ancestor = self.node(key)?.parent;
        }

        let child_node = self.node_mut(child)?;
        if let NodeKind::Entity(entity) = &child_node.kind {
            entity.require_owner(child)?;
        }
        debug_assert!(child_node.parent.is_none(), "node {:?} is already attached", child);
        child_node.parent = Some(parent);
        let count = child_node.entity_count;

        self.node_mut(parent)?.children.push(child);
        self.propagate_added(parent, count);
        self.invalidate_container(parent);

        trace!("Attached {:?} ({} entities) to {:?}", child, count, parent);
        Ok(())
    }

    /// Detach `child` from `parent` and subtract its entity count from every ancestor
    ///
    /// The last child takes the removed child's slot, so sibling order is
    /// not preserved.
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), PartitionError> {
        let parent_node = self.node_mut(parent)?;
        let index = parent_node
            .children
            .iter()
            .position(|&key| key == child)
            .ok_or(PartitionError::NodeNotFound { parent, child })?;
        parent_node.children.swap_remove(index);

        let count = match self.nodes.get_mut(child) {
            Some(child_node) => {
                child_node.parent = None;
                child_node.entity_count
            }
            None => return Err(PartitionError::UseAfterDispose(child)),
        };

        self.propagate_removed(parent, count);
        self.invalidate_container(parent);

        trace!("Detached {:?} ({} entities) from {:?}", child, count, parent);
        Ok(())
    }

    fn propagate_added(&mut self, start: NodeKey, count: usize) {
        let mut current = Some(start);
        while let Some(key) = current {
            let Some(node) = self.nodes.get_mut(key) else { break };
            node.entity_count += count;
            current = node.parent;
        }
    }

    fn propagate_removed(&mut self, start: NodeKey, count: usize) {
        let mut current = Some(start);
        while let Some(key) = current {
            let Some(node) = self.nodes.get_mut(key) else { break };
            debug_assert!(node.entity_count >= count, "entity count underflow on {:?}", key);
            node.entity_count = node.entity_count.saturating_sub(count);
            current = node.parent;
        }
    }

    /// Insert a display object as an entity node under `parent` (the root by default)
    pub fn insert_entity(
        &mut self,
        objects: &DisplayList,
        object: DisplayKey,
        parent: Option<NodeKey>,
    ) -> Result<NodeKey, PartitionError> {
        if !objects.contains(object) {
            return Err(PartitionError::UnknownDisplayObject(object));
        }
        if self.entity_nodes.contains_key(object) {
            return Err(PartitionError::AlreadyRegistered(object));
        }

        let key = self.acquire_entity_node(object);
        if let Err(error) = self.add_child(parent.unwrap_or(self.root), key) {
            self.release_entity_node(key);
            return Err(error);
        }

        self.entity_nodes.insert(object, key);
        self.mark_for_update(key);
        Ok(key)
    }

    /// Remove a display object's entity node from the tree and recycle it
    pub fn remove_entity(&mut self, object: DisplayKey) -> Result<(), PartitionError> {
        let key = self
            .entity_nodes
            .remove(object)
            .ok_or(PartitionError::NotRegistered(object))?;

        if let Some(parent) = self.node(key)?.parent {
            self.remove_child(parent, key)?;
        }
        self.release_entity_node(key);
        Ok(())
    }

    fn acquire_entity_node(&mut self, owner: DisplayKey) -> NodeKey {
        while let Some(key) = self.pool.pop() {
            if let Some(node) = self.nodes.get_mut(key) {
                if let NodeKind::Entity(entity) = &mut node.kind {
                    entity.reset(owner);
                    node.bounds_valid = false;
                    trace!("Reused pooled entity node {:?}", key);
                    return key;
                }
            }
        }
        self.nodes.insert(PartitionNode::new_entity(owner))
    }

    fn release_entity_node(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get_mut(key) else { return };
        if let NodeKind::Entity(entity) = &mut node.kind {
            entity.clear();
        }
        node.bounds = BoundingVolume::Null;
        node.world_bounds = None;
        node.bounds_valid = false;

        if self.pool.len() < self.config.entity_pool_capacity {
            self.pool.push(key);
        } else {
            self.nodes.remove(key);
        }
    }

    /// Release a node's parent and child links and free its slot
    ///
    /// Children are not disposed. They are detached with their counts intact
    /// and returned so the caller can reattach or dispose them.
    pub fn dispose_node(&mut self, key: NodeKey) -> Result<Vec<NodeKey>, PartitionError> {
        if key == self.root {
            return Err(PartitionError::RootDisposal);
        }
        if let Some(parent) = self.node(key)?.parent {
            self.remove_child(parent, key)?;
        }

        let node = self.nodes.remove(key).ok_or(PartitionError::UseAfterDispose(key))?;
        for &child in &node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
        }
        if let NodeKind::Entity(entity) = &node.kind {
            if let Some(owner) = entity.owner() {
                self.entity_nodes.remove(owner);
            }
        }
        self.pool.retain(|&pooled| pooled != key);

        debug!("Disposed {:?}, orphaned {} children", key, node.children.len());
        Ok(node.children)
    }

    /// Owner changed transform or geometry: invalidate its bounds and queue a refresh
    pub fn invalidate_entity(&mut self, object: DisplayKey) -> Result<(), PartitionError> {
        let key = self
            .entity_node(object)
            .ok_or(PartitionError::NotRegistered(object))?;
        self.on_invalidate_partition_bounds(key)
    }

    /// Invalidate a node's cached bounds and queue it for update
    pub fn on_invalidate_partition_bounds(&mut self, key: NodeKey) -> Result<(), PartitionError> {
        let node = self.node_mut(key)?;
        if let NodeKind::Entity(entity) = &node.kind {
            entity.require_owner(key)?;
        }
        node.bounds_valid = false;
        self.mark_for_update(key);
        Ok(())
    }

    /// Schedule a node for a bounds refresh before the next traversal
    pub fn mark_for_update(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            if !node.queued {
                node.queued = true;
                self.update_queue.push(key);
            }
        }
    }

    fn invalidate_container(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.bounds_valid = false;
        }
        self.mark_for_update(key);
    }

    /// Refresh every queued node and refit its ancestors
    pub fn update(&mut self, objects: &DisplayList) {
        if self.update_queue.is_empty() {
            return;
        }

        let queue = std::mem::take(&mut self.update_queue);
        let queued = queue.len();
        for key in queue {
            let Some(node) = self.nodes.get_mut(key) else { continue };
            node.queued = false;

            self.refresh_node(key, objects);

            let mut ancestor = self.nodes.get(key).and_then(PartitionNode::parent);
            while let Some(parent) = ancestor {
                self.fit_container(parent);
                ancestor = self.nodes.get(parent).and_then(PartitionNode::parent);
            }
        }

        debug!("Refreshed bounds of {} queued nodes", queued);
    }

    fn refresh_node(&mut self, key: NodeKey, objects: &DisplayList) {
        let owner = match self.nodes.get(key).map(|node| &node.kind) {
            Some(NodeKind::Entity(entity)) => entity.owner(),
            Some(NodeKind::Container) => {
                self.fit_container(key);
                return;
            }
            None => return,
        };

        // Cleared nodes stay queued until drained, nothing to compute
        let Some(owner) = owner else { return };
        let (bounds, world_bounds) = match objects.get(owner) {
            Some(object) => {
                let local = object.local_bounds();
                (local, local.world_aabb(&object.scene_transform()))
            }
            None => {
                warn!("Display object {:?} vanished before its bounds refresh", owner);
                (BoundingVolume::Null, None)
            }
        };

        if let Some(node) = self.nodes.get_mut(key) {
            node.bounds = bounds;
            node.world_bounds = world_bounds;
            node.bounds_valid = true;
        }
    }

    /// Fit a container's world box around its non-empty children
    fn fit_container(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get(key) else { return };
        if !matches!(node.kind, NodeKind::Container) {
            return;
        }

        let mut fitted: Option<AABB> = None;
        let mut unbounded = false;
        for child in node.children.iter().filter_map(|&child| self.nodes.get(child)) {
            if child.entity_count == 0 {
                continue;
            }
            match child.world_bounds {
                Some(aabb) => fitted = Some(fitted.map_or(aabb, |acc| acc.union(&aabb))),
                None => {
                    unbounded = true;
                    break;
                }
            }
        }

        let world_bounds = if unbounded { None } else { fitted };
        if let Some(node) = self.nodes.get_mut(key) {
            node.world_bounds = world_bounds;
            node.bounds = world_bounds.map_or(BoundingVolume::Null, BoundingVolume::Box);
            node.bounds_valid = true;
        }
    }

    /// Refresh pending bounds, then walk the tree from the root
    pub fn accept_traverser<T: Traverser + ?Sized>(&mut self, objects: &DisplayList, traverser: &mut T) {
        self.update(objects);
        self.visit(self.root, objects, traverser);
    }

    /// Walk the subtree at `key` without refreshing bounds first
    pub fn visit<T: Traverser + ?Sized>(&self, key: NodeKey, objects: &DisplayList, traverser: &mut T) {
        let Some(node) = self.nodes.get(key) else { return };
        if node.entity_count == 0 {
            return;
        }

        let view = NodeRef::new(key, node, objects, &self.config);
        if !traverser.enter_node(&view) {
            return;
        }

        match &node.kind {
            NodeKind::Entity(entity) => {
                let Some(owner) = entity.owner() else { return };
                if let Some(object) = objects.get(owner) {
                    traverser.apply_entity(owner, object);
                }
            }
            NodeKind::Container => {
                for &child in &node.children {
                    self.visit(child, objects, traverser);
                }
            }
        }
    }
}
