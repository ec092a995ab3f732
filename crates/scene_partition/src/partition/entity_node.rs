//! Leaf nodes wrapping a single display object

use log::warn;

use super::node::PartitionNode;
use super::error::PartitionError;
use crate::bounds::{Plane, Ray};
use crate::config::PartitionConfig;
use crate::display::{DisplayList, DisplayObject, MaskLayers};
use crate::foundation::collections::{DisplayKey, NodeKey};

/// Leaf payload: the display object this node represents
///
/// The owner is cleared when the entity leaves the partition so the node can
/// be pooled; any use of a cleared node is a [`PartitionError::UseAfterDispose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNode {
    owner: Option<DisplayKey>,
}

impl EntityNode {
    pub(super) fn new(owner: DisplayKey) -> Self {
        Self { owner: Some(owner) }
    }

    /// Owning display object, `None` once cleared
    pub fn owner(&self) -> Option<DisplayKey> {
        self.owner
    }

    /// Owning display object, failing fast on a cleared node
    pub fn require_owner(&self, node: NodeKey) -> Result<DisplayKey, PartitionError> {
        self.owner.ok_or(PartitionError::UseAfterDispose(node))
    }

    pub(super) fn clear(&mut self) {
        self.owner = None;
    }

    pub(super) fn reset(&mut self, owner: DisplayKey) {
        self.owner = Some(owner);
    }

    fn owner_object<'a>(&self, objects: &'a DisplayList) -> Option<&'a DisplayObject> {
        let object = self.owner.and_then(|key| objects.get(key));
        if object.is_none() {
            warn!("Entity node owner {:?} is missing from the display list", self.owner);
        }
        object
    }

    /// Visibility test
    ///
    /// A visible owner is accepted without testing its bounds unless
    /// `precise_entity_culling` is set; containers above do the culling.
    pub fn is_in_frustum(
        &self,
        node: &PartitionNode,
        objects: &DisplayList,
        planes: &[Plane],
        config: &PartitionConfig,
    ) -> bool {
        let Some(owner) = self.owner_object(objects) else {
            return false;
        };
        if !owner.is_visible() {
            return false;
        }

        !config.precise_entity_culling || node.is_in_frustum(planes)
    }

    /// Ray test in the owner's local space
    ///
    /// On a hit the owner's picking collision is overwritten with the local
    /// and world rays, the entry distance and the surface normal.
    pub fn is_intersecting_ray(
        &self,
        node: &PartitionNode,
        objects: &DisplayList,
        ray: &Ray,
        config: &PartitionConfig,
    ) -> bool {
        let Some(owner) = self.owner_object(objects) else {
            return false;
        };
        if !owner.is_visible()
            || !is_intersecting_masks(objects, ray, owner.assigned_masks(), config.mask_ray_distance)
        {
            return false;
        }

        let Some(inverse) = owner.inverse_scene_transform() else {
            return false;
        };
        let local_ray = ray.transform(&inverse);

        let Some(hit) = node.bounds.ray_intersection(&local_ray.origin, &local_ray.direction) else {
            return false;
        };
        if hit.distance < 0.0 {
            return false;
        }

        owner.record_pick(&local_ray, ray, hit.distance, hit.normal);
        true
    }
}

/// Mask test for a pick ray
///
/// The far point `origin + direction * distance` is projected onto the XY
/// plane and must hit at least one masker in every layer. A missing mask
/// list passes; a layer without a hit fails immediately.
pub fn is_intersecting_masks(
    objects: &DisplayList,
    ray: &Ray,
    masks: Option<&MaskLayers>,
    distance: f32,
) -> bool {
    let Some(layers) = masks else {
        return true;
    };

    let sample = ray.point_at(distance);
    layers.iter().all(|layer| {
        layer.iter().any(|&masker| match objects.get(masker) {
            Some(object) => object.hit_test_point(sample.x, sample.y),
            None => {
                warn!("Mask layer references missing display object {:?}", masker);
                false
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::AABB;
    use crate::foundation::math::{utils, Transform, Vec3};
    use crate::partition::Partition;
    use approx::assert_relative_eq;

    fn slab(x_min: f32, x_max: f32) -> DisplayObject {
        DisplayObject::shape("masker", AABB::new(Vec3::new(x_min, -1.0, -1.0), Vec3::new(x_max, 1.0, 1.0)))
    }

    /// Ray whose far point projects onto (x, 0)
    fn sample(x: f32) -> Ray {
        Ray::new(Vec3::new(x, 0.0, 0.0), Vec3::z())
    }

    fn ray_test(partition: &Partition, objects: &DisplayList, object: DisplayKey, ray: &Ray) -> bool {
        let key = partition.entity_node(object).unwrap();
        let node = partition.node(key).unwrap();
        node.entity()
            .unwrap()
            .is_intersecting_ray(node, objects, ray, partition.config())
    }

    fn frustum_test(partition: &Partition, objects: &DisplayList, object: DisplayKey, planes: &[Plane]) -> bool {
        let key = partition.entity_node(object).unwrap();
        let node = partition.node(key).unwrap();
        node.entity()
            .unwrap()
            .is_in_frustum(node, objects, planes, partition.config())
    }

    #[test]
    fn test_mask_layers_and_across_or_within() {
        let mut objects = DisplayList::new();
        let a = objects.insert(slab(0.0, 1.0));
        let b = objects.insert(slab(2.0, 3.0));
        let c = objects.insert(slab(0.0, 2.5));
        let layers: MaskLayers = vec![vec![a, b], vec![c]];

        let passes = |x: f32| is_intersecting_masks(&objects, &sample(x), Some(&layers), 1000.0);
        assert!(passes(0.5)); // A and C
        assert!(passes(2.2)); // B and C
        assert!(!passes(2.8)); // B without C
        assert!(!passes(1.5)); // C without A or B
        assert!(!passes(-4.0));
    }

    #[test]
    fn test_mask_edge_cases() {
        let mut objects = DisplayList::new();
        let a = objects.insert(slab(0.0, 1.0));
        let ray = sample(0.5);

        assert!(is_intersecting_masks(&objects, &ray, None, 1000.0));
        assert!(is_intersecting_masks(&objects, &ray, Some(&Vec::new()), 1000.0));
        assert!(!is_intersecting_masks(&objects, &ray, Some(&vec![vec![a], vec![]]), 1000.0));

        let removed = objects.insert(slab(0.0, 1.0));
        objects.remove(removed);
        assert!(!is_intersecting_masks(&objects, &ray, Some(&vec![vec![removed]]), 1000.0));
    }

    #[test]
    fn test_mask_sample_uses_far_point() {
        let mut objects = DisplayList::new();
        let a = objects.insert(slab(0.0, 1.0));
        let layers = vec![vec![a]];

        // Tilted ray: origin over the masker, far point well past it
        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.01, 0.0, 1.0));
        assert!(!is_intersecting_masks(&objects, &ray, Some(&layers), 1000.0));
        assert!(is_intersecting_masks(&objects, &ray, Some(&layers), 10.0));
    }

    #[test]
    fn test_masked_entity_rejects_ray() {
        let mut objects = DisplayList::new();
        let masker = objects.insert(slab(-1.0, 1.0));
        let target = objects.insert(
            DisplayObject::shape("target", AABB::from_center_extents(Vec3::new(4.0, 0.0, 5.0), Vec3::repeat(1.0)))
                .with_masks(vec![vec![masker]]),
        );
        let mut partition = Partition::default();
        partition.insert_entity(&objects, target, None).unwrap();
        partition.update(&objects);

        assert!(ray_test(&partition, &objects, target, &Ray::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(-0.004, 0.0, 1.0))));
        assert!(!ray_test(&partition, &objects, target, &Ray::new(Vec3::new(4.0, 0.0, 0.0), Vec3::z())));
    }

    #[test]
    fn test_invisible_owner_fails_ray_and_frustum() {
        let mut objects = DisplayList::new();
        let key = objects.insert(slab(-1.0, 1.0).with_visible(false));
        let mut partition = Partition::default();
        partition.insert_entity(&objects, key, None).unwrap();
        partition.update(&objects);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z());
        assert!(!ray_test(&partition, &objects, key, &ray));
        assert!(!frustum_test(&partition, &objects, key, &[]));
    }

    #[test]
    fn test_local_space_ray_matches_world_box() {
        let mut objects = DisplayList::new();
        let transform = Transform::from_position_scale(Vec3::new(3.0, -2.0, 7.0), Vec3::new(2.0, 0.5, 4.0));
        let key = objects.insert(
            DisplayObject::shape("scaled", AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0)))
                .with_transform(transform.clone()),
        );
        let mut partition = Partition::default();
        partition.insert_entity(&objects, key, None).unwrap();
        partition.update(&objects);
        let world = *partition.node(partition.entity_node(key).unwrap()).unwrap().world_bounds().unwrap();

        let rays = [
            Ray::new(Vec3::new(3.0, -2.0, -10.0), Vec3::z()),
            Ray::new(Vec3::new(-10.0, -2.0, 7.0), Vec3::new(1.0, 0.0, 0.0)),
            Ray::new(Vec3::new(-10.0, -10.0, 0.0), Vec3::new(1.0, 0.6, 0.5)),
            Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::z()),
            Ray::new(Vec3::new(3.0, -2.0, 20.0), Vec3::z()),
        ];
        for ray in &rays {
            let expected = world.intersect_ray(&ray.origin, &ray.direction);
            assert_eq!(ray_test(&partition, &objects, key, ray), expected.is_some(), "{:?}", ray);
            if let Some(hit) = expected {
                let collision = objects.get(key).unwrap().picking_collision().clone();
                assert_relative_eq!(collision.ray_entry_distance, hit.distance, epsilon = 1e-4);
                assert_eq!(collision.global_ray_position, ray.origin);
                assert_relative_eq!(
                    utils::transform_position(&transform.to_matrix(), &collision.local_position()),
                    ray.point_at(hit.distance),
                    epsilon = 1e-3
                );
            }
        }
    }

    #[test]
    fn test_ray_origin_on_surface_counts_as_inside() {
        let mut objects = DisplayList::new();
        let key = objects.insert(slab(-1.0, 1.0));
        let mut partition = Partition::default();
        partition.insert_entity(&objects, key, None).unwrap();
        partition.update(&objects);

        assert!(ray_test(&partition, &objects, key, &Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::x())));
        let collision = objects.get(key).unwrap().picking_collision().clone();
        assert_eq!(collision.ray_entry_distance, 0.0);
        assert!(collision.ray_origin_is_inside_bounds);
        assert_eq!(collision.normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_from_outside_is_not_inside() {
        let mut objects = DisplayList::new();
        let key = objects.insert(slab(-1.0, 1.0));
        let mut partition = Partition::default();
        partition.insert_entity(&objects, key, None).unwrap();
        partition.update(&objects);

        assert!(ray_test(&partition, &objects, key, &Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::x())));
        let collision = objects.get(key).unwrap().picking_collision().clone();
        assert_relative_eq!(collision.ray_entry_distance, 4.0);
        assert!(!collision.ray_origin_is_inside_bounds);

        // Pointing away is a miss and leaves the record untouched
        assert!(!ray_test(&partition, &objects, key, &Ray::new(Vec3::new(-5.0, 0.0, 0.0), -Vec3::x())));
        assert_relative_eq!(objects.get(key).unwrap().picking_collision().ray_entry_distance, 4.0);
    }

    #[test]
    fn test_visible_entity_skips_plane_test_by_default() {
        let mut objects = DisplayList::new();
        let key = objects.insert(slab(-1.0, 1.0));
        let behind = [Plane::new(Vec3::x(), -50.0).unwrap()];

        let mut partition = Partition::default();
        partition.insert_entity(&objects, key, None).unwrap();
        partition.update(&objects);
        assert!(frustum_test(&partition, &objects, key, &behind));

        let precise = PartitionConfig::default().with_precise_entity_culling(true);
        let mut partition = Partition::new(precise);
        partition.insert_entity(&objects, key, None).unwrap();
        partition.update(&objects);
        assert!(!frustum_test(&partition, &objects, key, &behind));
        assert!(frustum_test(&partition, &objects, key, &[Plane::new(Vec3::x(), 50.0).unwrap()]));
    }
}
