//! Partition demo
//!
//! Scatters shapes and line segments through grouped containers, adds a
//! light and a skybox, then runs a render collection from a camera and a
//! pick through the middle of the view.
//!
//! Usage: `partition_demo [config.toml|config.ron]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_partition::foundation::logging;
use scene_partition::foundation::math::Point3;
use scene_partition::prelude::*;

// Scene layout
const NUM_GROUPS: usize = 8;
const SHAPES_PER_GROUP: usize = 12;
const LINES_PER_GROUP: usize = 3;
const GROUP_SPREAD: f32 = 60.0;
const SHAPE_SPREAD: f32 = 6.0;
const RNG_SEED: u64 = 0x5eed;

// Camera
const CAMERA_POSITION: [f32; 3] = [0.0, 10.0, -80.0];
const FOV_Y_DEGREES: f32 = 60.0;
const ASPECT: f32 = 16.0 / 9.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 250.0;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("partition: {0}")]
    Partition(#[from] PartitionError),
}

/// Left-handed perspective projection with depth in [0, 1]
fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let tan_half_fovy = (fov_y * 0.5).tan();
    let mut result = Mat4::zeros();
    result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
    result[(1, 1)] = 1.0 / tan_half_fovy;
    result[(2, 2)] = far / (far - near);
    result[(2, 3)] = -(near * far) / (far - near);
    result[(3, 2)] = 1.0;
    result
}

fn load_config(path: Option<&str>) -> Result<PartitionConfig, DemoError> {
    match path {
        Some(path) => Ok(PartitionConfig::load_from_file(path)?),
        None => Ok(PartitionConfig::default()),
    }
}

fn build_scene(scene: &mut Scene, rng: &mut StdRng) -> Result<(), DemoError> {
    let root = scene.partition().root();

    for group_index in 0..NUM_GROUPS {
        let group = scene.add_container(root)?;
        let center = Vec3::new(
            rng.gen_range(-GROUP_SPREAD..GROUP_SPREAD),
            rng.gen_range(-GROUP_SPREAD * 0.25..GROUP_SPREAD * 0.25),
            rng.gen_range(-GROUP_SPREAD..GROUP_SPREAD),
        );

        for shape_index in 0..SHAPES_PER_GROUP {
            let offset = Vec3::new(
                rng.gen_range(-SHAPE_SPREAD..SHAPE_SPREAD),
                rng.gen_range(-SHAPE_SPREAD..SHAPE_SPREAD),
                rng.gen_range(-SHAPE_SPREAD..SHAPE_SPREAD),
            );
            let half_size = rng.gen_range(0.3..1.5);
            let rotation = Quat::from_axis_angle(&Vec3::y_axis(), rng.gen_range(0.0..std::f32::consts::TAU));
            let bounds_type = if rng.gen_bool(0.3) { BoundsType::Sphere } else { BoundsType::AxisAlignedBox };

            let shape = DisplayObject::shape(
                format!("shape_{}_{}", group_index, shape_index),
                AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(half_size)),
            )
            .with_bounds_type(bounds_type)
            .with_transform(Transform::from_position_rotation(center + offset, rotation));
            scene.add_to(group, shape)?;
        }

        for line_index in 0..LINES_PER_GROUP {
            let end = Vec3::new(
                rng.gen_range(-SHAPE_SPREAD..SHAPE_SPREAD),
                rng.gen_range(-SHAPE_SPREAD..SHAPE_SPREAD),
                rng.gen_range(-SHAPE_SPREAD..SHAPE_SPREAD),
            );
            let line = DisplayObject::line_segment(format!("line_{}_{}", group_index, line_index), Vec3::zeros(), end, 0.05)
                .with_transform(Transform::from_position(center));
            scene.add_to(group, line)?;
        }
    }

    scene.add(DisplayObject::directional_light("sun", Vec3::new(0.3, -1.0, 0.5)))?;
    scene.add(DisplayObject::skybox("sky"))?;

    log::info!(
        "Built scene: {} display objects, {} partition nodes",
        scene.len(),
        scene.partition().node_count()
    );
    Ok(())
}

fn run() -> Result<(), DemoError> {
    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref())?;
    logging::init(&config.log_level);
    match &config_path {
        Some(path) => log::info!("Loaded configuration from {}", path),
        None => log::info!("Using default configuration"),
    }

    let mut scene = Scene::with_config(config)?;
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    build_scene(&mut scene, &mut rng)?;

    let eye = Point3::from(Vec3::from(CAMERA_POSITION));
    let view = Mat4::look_at_lh(&eye, &Point3::origin(), &Vec3::y());
    let projection = perspective(FOV_Y_DEGREES.to_radians(), ASPECT, NEAR, FAR);
    let frustum = Frustum::from_matrix(&(projection * view));

    let collection = scene.collect(&frustum);
    log::info!(
        "Collected {} renderables, {} lights, {} skyboxes",
        collection.renderables.len(),
        collection.lights.len(),
        collection.skyboxes.len()
    );
    log::info!(
        "Traversal entered {} nodes, culled {}",
        collection.stats.nodes_entered,
        collection.stats.nodes_rejected
    );
    for light in &collection.lights {
        log::info!("Light {:?} shines along {:?}", light.key, light.direction);
    }

    let ray = Ray::new(eye.coords, (Point3::origin() - eye).normalize());
    let hits = scene.pick(ray);
    log::info!("Pick through view center: {} hits", hits.len());
    for hit in hits.iter().take(5) {
        let name = scene.get(hit.entity).map_or("<removed>", DisplayObject::name);
        log::info!(
            "  {} at distance {:.2} (inside: {}, normal {:?})",
            name,
            hit.collision.ray_entry_distance,
            hit.collision.ray_origin_is_inside_bounds,
            hit.collision.normal
        );
    }

    // Move the nearest geometry out of the way and pick again
    if let Some(nearest) = hits
        .iter()
        .find(|hit| scene.get(hit.entity).is_some_and(|object| object.kind().is_renderable()))
    {
        let entity = nearest.entity;
        scene.set_transform(entity, Transform::from_position(Vec3::new(0.0, 1000.0, 0.0)))?;
        let after = scene.pick(ray);
        log::info!("After moving the nearest hit away: {} hits", after.len());
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        log::error!("Partition demo failed: {}", error);
        eprintln!("Partition demo failed: {}", error);
        std::process::exit(1);
    }
}
