//! Frustum-culled render collection

use log::debug;

use super::{TraversalStats, Traverser};
use crate::bounds::Frustum;
use crate::display::{DisplayObject, EntityKind};
use crate::foundation::collections::DisplayKey;
use crate::foundation::math::Vec3;
use crate::partition::NodeRef;

/// A directional light reached by the collector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEntry {
    /// The light's display object
    pub key: DisplayKey,
    /// Normalized world-space direction
    pub direction: Vec3,
}

/// Entities accepted by one render collection, bucketed by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderCollection {
    /// Shapes and line segments, in traversal order
    pub renderables: Vec<DisplayKey>,
    /// Directional lights with their world directions
    pub lights: Vec<LightEntry>,
    /// Skyboxes, drawn before everything else
    pub skyboxes: Vec<DisplayKey>,
    /// Traversal counters
    pub stats: TraversalStats,
}

impl RenderCollection {
    /// Total number of collected entities
    pub fn len(&self) -> usize {
        self.renderables.len() + self.lights.len() + self.skyboxes.len()
    }

    /// Nothing was collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Traverser that culls against a frustum and batches entities for rendering
#[derive(Debug)]
pub struct RenderCollector<'f> {
    frustum: &'f Frustum,
    collection: RenderCollection,
}

impl<'f> RenderCollector<'f> {
    /// Create a collector culling against `frustum`
    pub fn new(frustum: &'f Frustum) -> Self {
        Self {
            frustum,
            collection: RenderCollection::default(),
        }
    }

    /// Results gathered so far
    pub fn collection(&self) -> &RenderCollection {
        &self.collection
    }

    /// Consume the collector and return its results
    pub fn finish(self) -> RenderCollection {
        let stats = &self.collection.stats;
        debug!(
            "Render collection: {} renderables, {} lights, {} skyboxes ({} nodes entered, {} culled)",
            self.collection.renderables.len(),
            self.collection.lights.len(),
            self.collection.skyboxes.len(),
            stats.nodes_entered,
            stats.nodes_rejected
        );
        self.collection
    }
}

impl Traverser for RenderCollector<'_> {
    fn enter_node(&mut self, node: &NodeRef<'_>) -> bool {
        let accepted = node.is_in_frustum(&self.frustum.planes);
        self.collection.stats.record_enter(accepted)
    }

    fn apply_entity(&mut self, key: DisplayKey, entity: &DisplayObject) {
        self.collection.stats.entities_applied += 1;
        match entity.kind() {
            EntityKind::Shape { .. } | EntityKind::LineSegment(_) => self.collection.renderables.push(key),
            EntityKind::DirectionalLight(light) => self.collection.lights.push(LightEntry {
                key,
                direction: light.scene_direction(&entity.scene_transform()),
            }),
            EntityKind::Skybox => self.collection.skyboxes.push(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{Plane, AABB};
    use crate::display::DisplayList;
    use crate::foundation::math::Transform;
    use crate::partition::Partition;
    use approx::assert_relative_eq;

    fn unit_cube_at(x: f32) -> DisplayObject {
        DisplayObject::shape("cube", AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(0.5)))
            .with_transform(Transform::from_position(Vec3::new(x, 0.0, 0.0)))
    }

    /// Half-space x >= 0
    fn right_half() -> Frustum {
        Frustum::new(vec![Plane::new(Vec3::new(1.0, 0.0, 0.0), 0.0).unwrap()])
    }

    #[test]
    fn test_buckets_by_kind() {
        let mut objects = DisplayList::new();
        let mut partition = Partition::default();
        let keys = [
            objects.insert(unit_cube_at(1.0)),
            objects.insert(DisplayObject::line_segment("line", Vec3::zeros(), Vec3::x(), 1.0)),
            objects.insert(DisplayObject::directional_light("sun", Vec3::new(0.0, -2.0, 0.0))),
            objects.insert(DisplayObject::skybox("sky")),
        ];
        for key in keys {
            partition.insert_entity(&objects, key, None).unwrap();
        }

        let frustum = Frustum::default();
        let mut collector = RenderCollector::new(&frustum);
        partition.accept_traverser(&objects, &mut collector);
        let collection = collector.finish();

        assert_eq!(collection.renderables, vec![keys[0], keys[1]]);
        assert_eq!(collection.skyboxes, vec![keys[3]]);
        assert_eq!(collection.lights.len(), 1);
        assert_relative_eq!(collection.lights[0].direction, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(collection.stats.entities_applied, 4);
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn test_containers_cull_whole_groups() {
        let mut objects = DisplayList::new();
        let mut partition = Partition::default();
        let root = partition.root();
        let left = partition.add_container(root).unwrap();
        let right = partition.add_container(root).unwrap();

        for x in [-3.0, -5.0] {
            let key = objects.insert(unit_cube_at(x));
            partition.insert_entity(&objects, key, Some(left)).unwrap();
        }
        let visible = objects.insert(unit_cube_at(4.0));
        partition.insert_entity(&objects, visible, Some(right)).unwrap();

        let frustum = right_half();
        let mut collector = RenderCollector::new(&frustum);
        partition.accept_traverser(&objects, &mut collector);
        let collection = collector.finish();

        assert_eq!(collection.renderables, vec![visible]);
        assert_eq!(collection.stats.nodes_rejected, 1);
        assert_eq!(collection.stats.nodes_entered, 4);
    }

    #[test]
    fn test_visible_entity_passes_without_precise_culling() {
        let mut objects = DisplayList::new();
        let mut partition = Partition::default();
        let root = partition.root();
        let group = partition.add_container(root).unwrap();
        let inside = objects.insert(unit_cube_at(2.0));
        let outside = objects.insert(unit_cube_at(-2.0));
        partition.insert_entity(&objects, inside, Some(group)).unwrap();
        partition.insert_entity(&objects, outside, Some(group)).unwrap();

        // The container straddles the plane, and leaves only check visibility
        let frustum = right_half();
        let mut collector = RenderCollector::new(&frustum);
        partition.accept_traverser(&objects, &mut collector);
        assert_eq!(collector.collection().renderables, vec![inside, outside]);
    }

    #[test]
    fn test_precise_culling_tests_entity_bounds() {
        let mut objects = DisplayList::new();
        let config = crate::config::PartitionConfig::default().with_precise_entity_culling(true);
        let mut partition = Partition::new(config);
        let inside = objects.insert(unit_cube_at(2.0));
        let outside = objects.insert(unit_cube_at(-2.0));
        partition.insert_entity(&objects, inside, None).unwrap();
        partition.insert_entity(&objects, outside, None).unwrap();

        let frustum = right_half();
        let mut collector = RenderCollector::new(&frustum);
        partition.accept_traverser(&objects, &mut collector);
        assert_eq!(collector.finish().renderables, vec![inside]);
    }

    #[test]
    fn test_invisible_entities_are_skipped() {
        let mut objects = DisplayList::new();
        let mut partition = Partition::default();
        let hidden = objects.insert(unit_cube_at(1.0).with_visible(false));
        partition.insert_entity(&objects, hidden, None).unwrap();

        let frustum = Frustum::default();
        let mut collector = RenderCollector::new(&frustum);
        partition.accept_traverser(&objects, &mut collector);
        let collection = collector.finish();
        assert!(collection.is_empty());
        assert_eq!(collection.stats.nodes_rejected, 1);
    }
}
