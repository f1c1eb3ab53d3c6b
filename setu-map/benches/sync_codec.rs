//! Benchmark submap payload encoding and decoding.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nalgebra::Vector3;
use setu_map::core::{FrameId, PointCloud, Pose3D};
use setu_map::sync::{SubmapPayload, SyncCodec};
use setu_map::volume::{TsdfConfig, TsdfSnapshot, TsdfVolume, Volume};

/// Integrate a wall patch to get a realistic TSDF snapshot.
fn wall_snapshot(half_width: f64) -> TsdfSnapshot {
    let mut volume = TsdfVolume::new(TsdfConfig::default());
    let spacing = 0.02;
    let steps = (half_width / spacing) as i32;
    let mut points = Vec::new();
    for i in -steps..=steps {
        for j in -steps..=steps {
            points.push(Vector3::new(1.5, i as f64 * spacing, j as f64 * spacing));
        }
    }
    volume
        .integrate(&Pose3D::identity(), &PointCloud::new(points))
        .expect("integrate");
    volume.export()
}

fn bench_encode_levels(c: &mut Criterion) {
    let payload = SubmapPayload {
        volume: wall_snapshot(0.5),
        frame_id: FrameId(100),
        pose: Pose3D::from_translation(1.0, 2.0, 0.0),
    };

    let mut group = c.benchmark_group("encode_submap");
    for level in [0, 1, 6, 9] {
        let Ok(codec) = SyncCodec::new(level) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(level), &payload, |b, p| {
            b.iter(|| black_box(codec.encode_submap(p)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let codec = SyncCodec::default();
    let payload = SubmapPayload {
        volume: wall_snapshot(0.5),
        frame_id: FrameId(100),
        pose: Pose3D::identity(),
    };
    let Ok(encoded) = codec.encode_submap(&payload) else {
        return;
    };

    c.bench_function("decode_submap", |b| {
        b.iter(|| {
            let decoded: Result<SubmapPayload<TsdfSnapshot>, _> =
                codec.decode_submap(black_box(&encoded.bytes));
            black_box(decoded)
        })
    });
}

criterion_group!(benches, bench_encode_levels, bench_decode);
criterion_main!(benches);
