//! Two agents mapping the same corridor and sharing submaps.
//!
//! Agent A walks the corridor and broadcasts finalized submaps. Agent B
//! ingests them, then A's back end issues a correction that B applies
//! without echoing it back.
//!
//! ```text
//! RUST_LOG=debug cargo run --example two_agents
//! ```

use std::collections::BTreeMap;

use nalgebra::Vector3;
use setu_map::sync::channel_pair;
use setu_map::{
    FrameId, FusionStrategy, GlobalMap, MapView, PointCloud, Pose3D, SetuConfig, SubmapMapping,
};

fn corridor_wall(points_per_side: i32) -> PointCloud {
    let mut points = Vec::new();
    for i in -points_per_side..=points_per_side {
        for k in 0..10 {
            let x = i as f64 * 0.05;
            let z = k as f64 * 0.1;
            points.push(Vector3::new(x, 1.0, z));
            points.push(Vector3::new(x, -1.0, z));
        }
    }
    PointCloud::new(points)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = SetuConfig::load_default()?;
    config.mapping.keyframe_step = 10;
    config.mapping.strategy = FusionStrategy::Occupancy;

    let (sink_a, source_a) = channel_pair();
    let (sink_b, source_b) = channel_pair();
    let mut agent_a = SubmapMapping::occupancy(&config, sink_a)?;
    let mut agent_b = SubmapMapping::occupancy(&config, sink_b)?;

    let wall = corridor_wall(10);
    for i in 0..45u64 {
        let pose = Pose3D::from_translation(i as f64 * 0.1, 0.0, 0.0);
        agent_a.process_frame(FrameId(i), pose, &wall, true)?;
    }

    for message in source_a.drain() {
        agent_b.on_remote_message(&message)?;
    }
    log::info!(
        "Agent B holds {} fused submaps from A",
        agent_b.global_map().fused_count()
    );

    // Loop closure on A: frame 10 was 5cm off to the side
    let mut batch = BTreeMap::new();
    batch.insert(FrameId(10), Pose3D::from_translation(1.0, 0.05, 0.0));
    let result = agent_a.set_frame_poses(&batch)?;
    log::info!("A moved {:?}, broadcast={}", result.moved, result.broadcast);

    for message in source_a.drain() {
        agent_b.on_remote_message(&message)?;
    }
    log::info!("B echoed {} messages back to A", source_b.pending());

    let points = agent_b.export_points(MapView::Global);
    log::info!("Agent B global map: {} surface points", points.len());
    log::info!("Agent A stats: {:?}", agent_a.stats());

    Ok(())
}
