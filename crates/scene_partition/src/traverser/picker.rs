//! Ray picking traverser

use log::debug;

use super::{TraversalStats, Traverser};
use crate::bounds::Ray;
use crate::display::{DisplayObject, PickingCollision};
use crate::foundation::collections::DisplayKey;
use crate::partition::NodeRef;

/// One entity hit by the pick ray
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    /// Entity that was hit
    pub entity: DisplayKey,
    /// Snapshot of the entity's picking collision at the time of the hit
    pub collision: PickingCollision,
}

/// Traverser collecting every entity a world-space ray reaches
#[derive(Debug)]
pub struct RaycastPicker {
    ray: Ray,
    hits: Vec<PickHit>,
    stats: TraversalStats,
}

impl RaycastPicker {
    /// Create a picker for a world-space ray
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            hits: Vec::new(),
            stats: TraversalStats::default(),
        }
    }

    /// Pick ray in world space
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Hits in traversal order
    pub fn hits(&self) -> &[PickHit] {
        &self.hits
    }

    /// Traversal counters
    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    /// Hits ordered by entry distance, nearest first
    pub fn sorted_hits(&self) -> Vec<PickHit> {
        let mut hits = self.hits.clone();
        hits.sort_by(|a, b| {
            a.collision
                .ray_entry_distance
                .total_cmp(&b.collision.ray_entry_distance)
        });
        hits
    }

    /// Nearest hit
    pub fn closest(&self) -> Option<&PickHit> {
        self.hits.iter().min_by(|a, b| {
            a.collision
                .ray_entry_distance
                .total_cmp(&b.collision.ray_entry_distance)
        })
    }

    /// Consume the picker and return the hits, nearest first
    pub fn finish(self) -> Vec<PickHit> {
        debug!(
            "Pick: {} hits ({} nodes entered, {} rejected)",
            self.hits.len(),
            self.stats.nodes_entered,
            self.stats.nodes_rejected
        );
        self.sorted_hits()
    }
}

impl Traverser for RaycastPicker {
    fn enter_node(&mut self, node: &NodeRef<'_>) -> bool {
        let accepted = node.is_intersecting_ray(&self.ray);
        self.stats.record_enter(accepted)
    }

    fn apply_entity(&mut self, key: DisplayKey, entity: &DisplayObject) {
        self.stats.entities_applied += 1;
        self.hits.push(PickHit {
            entity: key,
            collision: entity.picking_collision().clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::AABB;
    use crate::display::DisplayList;
    use crate::foundation::math::{Transform, Vec3};
    use crate::partition::Partition;
    use approx::assert_relative_eq;

    fn cube_at(z: f32) -> DisplayObject {
        DisplayObject::shape("cube", AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0)))
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, z)))
    }

    #[test]
    fn test_hits_sorted_by_distance() {
        let mut objects = DisplayList::new();
        let mut partition = Partition::default();
        let far = objects.insert(cube_at(20.0));
        let near = objects.insert(cube_at(5.0));
        let missed = objects.insert(cube_at(5.0).with_transform(Transform::from_position(Vec3::new(10.0, 0.0, 5.0))));
        for key in [far, near, missed] {
            partition.insert_entity(&objects, key, None).unwrap();
        }

        let mut picker = RaycastPicker::new(Ray::new(Vec3::zeros(), Vec3::z()));
        partition.accept_traverser(&objects, &mut picker);

        assert_eq!(picker.hits().len(), 2);
        assert_eq!(picker.closest().map(|hit| hit.entity), Some(near));

        let sorted = picker.finish();
        assert_eq!(sorted[0].entity, near);
        assert_eq!(sorted[1].entity, far);
        assert_relative_eq!(sorted[0].collision.ray_entry_distance, 4.0);
        assert_relative_eq!(sorted[1].collision.ray_entry_distance, 19.0);
        assert_relative_eq!(sorted[0].collision.normal, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_ray_starting_inside_reports_zero_distance() {
        let mut objects = DisplayList::new();
        let mut partition = Partition::default();
        let key = objects.insert(cube_at(0.0));
        partition.insert_entity(&objects, key, None).unwrap();

        let mut picker = RaycastPicker::new(Ray::new(Vec3::zeros(), Vec3::x()));
        partition.accept_traverser(&objects, &mut picker);

        let hit = picker.closest().unwrap();
        assert_eq!(hit.collision.ray_entry_distance, 0.0);
        assert!(hit.collision.ray_origin_is_inside_bounds);
    }

    #[test]
    fn test_no_hits_on_miss() {
        let mut objects = DisplayList::new();
        let mut partition = Partition::default();
        let key = objects.insert(cube_at(5.0));
        partition.insert_entity(&objects, key, None).unwrap();

        let mut picker = RaycastPicker::new(Ray::new(Vec3::zeros(), -Vec3::z()));
        partition.accept_traverser(&objects, &mut picker);

        assert!(picker.hits().is_empty());
        assert!(picker.closest().is_none());
        assert_eq!(picker.stats().nodes_rejected, 1);
    }
}
