//! Display object: the scene-side owner of a partition entity

use std::cell::{Ref, RefCell};

use super::entities::{DirectionalLight, EntityKind, LineSegment};
use super::picking::PickingCollision;
use crate::bounds::{BoundingSphere, BoundingVolume, BoundsType, Ray, AABB};
use crate::foundation::collections::DisplayKey;
use crate::foundation::math::{Mat4, Point3, Transform, Vec3};

/// Mask layers assigned to a display object
///
/// A pick ray passes when it hits at least one masker in every layer.
pub type MaskLayers = Vec<Vec<DisplayKey>>;

/// A display object placed in the scene
#[derive(Debug)]
pub struct DisplayObject {
    name: String,
    visible: bool,
    transform: Transform,
    bounds_type: BoundsType,
    kind: EntityKind,
    masks: Option<MaskLayers>,
    picking_collision: RefCell<PickingCollision>,
}

impl DisplayObject {
    /// Create a display object of the given kind with its default bounds type
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        let bounds_type = match kind {
            EntityKind::DirectionalLight(_) | EntityKind::Skybox => BoundsType::Null,
            EntityKind::Shape { .. } | EntityKind::LineSegment(_) => BoundsType::AxisAlignedBox,
        };

        Self {
            name: name.into(),
            visible: true,
            transform: Transform::identity(),
            bounds_type,
            kind,
            masks: None,
            picking_collision: RefCell::new(PickingCollision::default()),
        }
    }

    /// Shape with a local-space box
    pub fn shape(name: impl Into<String>, bounds: AABB) -> Self {
        Self::new(name, EntityKind::Shape { bounds })
    }

    /// Line segment between two local-space points
    pub fn line_segment(name: impl Into<String>, start: Vec3, end: Vec3, thickness: f32) -> Self {
        Self::new(name, EntityKind::LineSegment(LineSegment::new(start, end, thickness)))
    }

    /// Directional light pointing along `direction`
    pub fn directional_light(name: impl Into<String>, direction: Vec3) -> Self {
        Self::new(name, EntityKind::DirectionalLight(DirectionalLight::new(direction)))
    }

    /// Skybox
    pub fn skybox(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Skybox)
    }

    /// Builder-style transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder-style bounds type
    pub fn with_bounds_type(mut self, bounds_type: BoundsType) -> Self {
        self.bounds_type = bounds_type;
        self
    }

    /// Builder-style visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder-style mask layers
    pub fn with_masks(mut self, masks: MaskLayers) -> Self {
        self.masks = Some(masks);
        self
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current visibility flag
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Local-to-world transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Volume kind built from the geometry
    pub fn bounds_type(&self) -> BoundsType {
        self.bounds_type
    }

    /// Entity kind
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Assigned mask layers, `None` when unmasked
    pub fn assigned_masks(&self) -> Option<&MaskLayers> {
        self.masks.as_ref()
    }

    /// World transform matrix
    pub fn scene_transform(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// Inverse world transform, `None` for a degenerate (zero-scale) transform
    pub fn inverse_scene_transform(&self) -> Option<Mat4> {
        self.transform.inverse_matrix()
    }

    /// The last pick result written for this object
    pub fn picking_collision(&self) -> Ref<'_, PickingCollision> {
        self.picking_collision.borrow()
    }

    /// Local-space bounding volume built from the geometry and bounds type
    pub fn local_bounds(&self) -> BoundingVolume {
        let (aabb, sphere) = match &self.kind {
            EntityKind::Skybox => return BoundingVolume::Null,
            EntityKind::Shape { bounds } => (*bounds, sphere_around(bounds)),
            EntityKind::LineSegment(line) => (line.box_bounds(), line.sphere_bounds()),
            EntityKind::DirectionalLight(_) => {
                let point = AABB::new(Vec3::zeros(), Vec3::zeros());
                (point, BoundingSphere::new(Vec3::zeros(), 0.0))
            }
        };

        match self.bounds_type {
            BoundsType::Null => BoundingVolume::Null,
            BoundsType::AxisAlignedBox => BoundingVolume::Box(aabb),
            BoundsType::Sphere => BoundingVolume::Sphere(sphere),
        }
    }

    /// Test a 2D stage point against the object's local bounds
    ///
    /// The point is moved into local space with the inverse transform and
    /// checked against the bounds in the XY plane.
    pub fn hit_test_point(&self, x: f32, y: f32) -> bool {
        let Some(inverse) = self.inverse_scene_transform() else {
            return false;
        };
        let local = inverse.transform_point(&Point3::new(x, y, 0.0));
        self.local_bounds().contains_point_2d(local.x, local.y)
    }

    /// Overwrite the picking collision record with a new hit
    pub(crate) fn record_pick(&self, local_ray: &Ray, global_ray: &Ray, distance: f32, normal: Vec3) {
        let mut collision = self.picking_collision.borrow_mut();
        collision.ray_position = local_ray.origin;
        collision.ray_direction = local_ray.direction;
        collision.global_ray_position = global_ray.origin;
        collision.global_ray_direction = global_ray.direction;
        collision.ray_entry_distance = distance;
        collision.ray_origin_is_inside_bounds = distance == 0.0;
        collision.normal = normal;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub(crate) fn set_bounds_type(&mut self, bounds_type: BoundsType) {
        self.bounds_type = bounds_type;
    }

    pub(crate) fn set_masks(&mut self, masks: Option<MaskLayers>) {
        self.masks = masks;
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }
}

fn sphere_around(aabb: &AABB) -> BoundingSphere {
    BoundingSphere::new(aabb.center(), aabb.extents().magnitude())
}
