//! Test utilities for setu-map integration tests.
//!
//! Synthetic trajectories, observations and orchestrator constructors.

#![allow(dead_code)]

use nalgebra::Vector3;
use setu_map::mapping::MappingConfig;
use setu_map::sync::SyncChannel;
use setu_map::{
    FrameId, OccupancyConfig, OccupancyGlobalMap, OccupancyVolume, PointCloud, Pose3D,
    SubmapMapping, TsdfConfig, TsdfGlobalMap, TsdfVolume,
};

/// Occupancy orchestrator used by most scenarios.
pub type OccupancyMapping<C> = SubmapMapping<OccupancyVolume, OccupancyGlobalMap, C>;

/// Dense TSDF orchestrator.
pub type TsdfMapping<C> = SubmapMapping<TsdfVolume, TsdfGlobalMap, C>;

/// Enable `RUST_LOG` output for a test run.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Straight-line trajectory along +x.
pub fn straight_trajectory(n: usize, spacing: f64) -> Vec<Pose3D> {
    (0..n)
        .map(|i| Pose3D::from_translation(i as f64 * spacing, 0.0, 0.0))
        .collect()
}

/// A square wall patch `distance` meters ahead of the sensor.
pub fn wall_patch(distance: f64, half_width: f64, spacing: f64) -> PointCloud {
    let steps = (half_width / spacing).round() as i32;
    let mut points = Vec::new();
    for i in -steps..=steps {
        for j in -steps..=steps {
            points.push(Vector3::new(
                distance,
                i as f64 * spacing + 0.001,
                j as f64 * spacing + 0.001,
            ));
        }
    }
    PointCloud::new(points)
}

/// A single point, handy when exact voxel counts matter.
pub fn single_point(x: f64) -> PointCloud {
    PointCloud::new(vec![Vector3::new(x, 0.01, 0.01)])
}

/// Occupancy orchestrator with default volume settings.
pub fn occupancy_mapping<C: SyncChannel>(config: MappingConfig, channel: C) -> OccupancyMapping<C> {
    let global = OccupancyGlobalMap::new(config.max_submaps);
    SubmapMapping::new(
        config,
        OccupancyVolume::new(OccupancyConfig::default()),
        global,
        channel,
    )
    .expect("valid mapping config")
}

/// TSDF orchestrator with default volume settings.
pub fn tsdf_mapping<C: SyncChannel>(config: MappingConfig, channel: C) -> TsdfMapping<C> {
    let global = TsdfGlobalMap::new(config.max_submaps);
    SubmapMapping::new(config, TsdfVolume::new(TsdfConfig::default()), global, channel)
        .expect("valid mapping config")
}

/// Feed one keyframe per pose (frame ids from 0) and return the frames
/// that started a submap.
pub fn run_frames<V, G, C>(
    mapping: &mut SubmapMapping<V, G, C>,
    poses: &[Pose3D],
    cloud: &PointCloud,
) -> Vec<u64>
where
    V: setu_map::Volume,
    G: setu_map::GlobalMap<Snapshot = V::Snapshot>,
    C: SyncChannel,
{
    let mut created = Vec::new();
    for (i, pose) in poses.iter().enumerate() {
        let result = mapping
            .process_frame(FrameId(i as u64), *pose, cloud, true)
            .expect("frame processed");
        if result.new_submap {
            created.push(i as u64);
        }
    }
    created
}
