//! Scene: display objects plus their spatial partition
//!
//! The scene is the only place display objects are mutated, so every change
//! that can move an entity's bounds is forwarded to the partition's
//! invalidation hook right away.

use log::{debug, info};

use crate::bounds::{BoundsType, Frustum, Ray};
use crate::config::{ConfigError, PartitionConfig};
use crate::display::{DisplayList, DisplayObject, EntityKind, MaskLayers};
use crate::foundation::collections::{DisplayKey, NodeKey};
use crate::foundation::math::Transform;
use crate::partition::{Partition, PartitionError};
use crate::traverser::{PickHit, RaycastPicker, RenderCollection, RenderCollector, Traverser};

/// Display objects and the partition tree that indexes them
#[derive(Debug, Default)]
pub struct Scene {
    display_list: DisplayList,
    partition: Partition,
}

impl Scene {
    /// Create an empty scene with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene after validating `config`
    pub fn with_config(config: PartitionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "Creating scene (precise culling: {}, mask ray distance: {})",
            config.precise_entity_culling, config.mask_ray_distance
        );
        Ok(Self {
            display_list: DisplayList::new(),
            partition: Partition::new(config),
        })
    }

    /// All display objects
    pub fn display_list(&self) -> &DisplayList {
        &self.display_list
    }

    /// The partition tree
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Look up a display object
    pub fn get(&self, key: DisplayKey) -> Option<&DisplayObject> {
        self.display_list.get(key)
    }

    /// Number of display objects
    pub fn len(&self) -> usize {
        self.display_list.len()
    }

    /// No display objects
    pub fn is_empty(&self) -> bool {
        self.display_list.is_empty()
    }

    /// Add a display object under the partition root
    pub fn add(&mut self, object: DisplayObject) -> Result<DisplayKey, PartitionError> {
        self.insert(object, None)
    }

    /// Add a display object under a specific container
    pub fn add_to(&mut self, container: NodeKey, object: DisplayObject) -> Result<DisplayKey, PartitionError> {
        self.insert(object, Some(container))
    }

    fn insert(&mut self, object: DisplayObject, parent: Option<NodeKey>) -> Result<DisplayKey, PartitionError> {
        let kind = object.kind().label();
        let key = self.display_list.insert(object);
        if let Err(error) = self.partition.insert_entity(&self.display_list, key, parent) {
            self.display_list.remove(key);
            return Err(error);
        }
        debug!("Added {} {:?}", kind, key);
        Ok(key)
    }

    /// Create a grouping container under `parent`
    pub fn add_container(&mut self, parent: NodeKey) -> Result<NodeKey, PartitionError> {
        self.partition.add_container(parent)
    }

    /// Remove a display object from the partition and the scene
    pub fn remove(&mut self, key: DisplayKey) -> Result<DisplayObject, PartitionError> {
        self.partition.remove_entity(key)?;
        let object = self
            .display_list
            .remove(key)
            .ok_or(PartitionError::UnknownDisplayObject(key))?;
        debug!("Removed {} {:?}", object.kind().label(), key);
        Ok(object)
    }

    fn object_mut(&mut self, key: DisplayKey) -> Result<&mut DisplayObject, PartitionError> {
        self.display_list
            .get_mut(key)
            .ok_or(PartitionError::UnknownDisplayObject(key))
    }

    /// Show or hide an object; bounds are unaffected
    pub fn set_visible(&mut self, key: DisplayKey, visible: bool) -> Result<(), PartitionError> {
        self.object_mut(key)?.set_visible(visible);
        Ok(())
    }

    /// Move an object
    pub fn set_transform(&mut self, key: DisplayKey, transform: Transform) -> Result<(), PartitionError> {
        self.object_mut(key)?.set_transform(transform);
        self.partition.invalidate_entity(key)
    }

    /// Change which volume an object builds from its geometry
    pub fn set_bounds_type(&mut self, key: DisplayKey, bounds_type: BoundsType) -> Result<(), PartitionError> {
        self.object_mut(key)?.set_bounds_type(bounds_type);
        self.partition.invalidate_entity(key)
    }

    /// Edit an object's geometry in place
    pub fn update_kind<F>(&mut self, key: DisplayKey, edit: F) -> Result<(), PartitionError>
    where
        F: FnOnce(&mut EntityKind),
    {
        edit(self.object_mut(key)?.kind_mut());
        self.partition.invalidate_entity(key)
    }

    /// Replace an object's mask layers
    pub fn set_masks(&mut self, key: DisplayKey, masks: Option<MaskLayers>) -> Result<(), PartitionError> {
        self.object_mut(key)?.set_masks(masks);
        Ok(())
    }

    /// Run any traverser over the partition
    pub fn accept_traverser<T: Traverser + ?Sized>(&mut self, traverser: &mut T) {
        self.partition.accept_traverser(&self.display_list, traverser);
    }

    /// Collect everything potentially visible inside `frustum`
    pub fn collect(&mut self, frustum: &Frustum) -> RenderCollection {
        let mut collector = RenderCollector::new(frustum);
        self.accept_traverser(&mut collector);
        collector.finish()
    }

    /// Every entity hit by a world-space ray, nearest first
    pub fn pick(&mut self, ray: Ray) -> Vec<PickHit> {
        let mut picker = RaycastPicker::new(ray);
        self.accept_traverser(&mut picker);
        picker.finish()
    }
}
