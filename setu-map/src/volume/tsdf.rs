//! Dense volumetric fusion with a truncated signed distance field.
//!
//! Each ray updates the voxels within `truncation` of its endpoint with a
//! normalized signed distance, positive in front of the surface:
//!
//! ```text
//! sensor ●─────────────[+1 … +0.3  0  −0.3 … −1]
//!                       ◀── trunc ──▶│◀── trunc ──▶
//!                                  surface
//! ```
//!
//! Values are fused by weighted running average, capped at `max_weight`.

use std::collections::HashMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::voxel::VoxelKey;
use super::{Result, Volume, VolumeError, VoxelSnapshot, check_observation, check_ray_limits};
use crate::core::{PointCloud, Pose3D};

/// Dense TSDF volume options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TsdfConfig {
    /// Voxel edge length (meters).
    /// Default: 0.05
    pub voxel_scale: f64,

    /// Truncation distance (meters).
    /// Default: 0.15 (3 voxels)
    pub truncation: f64,

    /// Rays shorter than this are ignored (meters).
    /// Default: 0.3
    pub min_ray_length: f64,

    /// Rays longer than this are ignored (meters).
    /// Default: 3.0
    pub max_ray_length: f64,

    /// Weight cap for the running average.
    /// Default: 64
    pub max_weight: f32,

    /// Fuse per-point colour when the observation carries it.
    /// Default: false
    pub texture_enabled: bool,
}

impl Default for TsdfConfig {
    fn default() -> Self {
        Self {
            voxel_scale: 0.05,
            truncation: 0.15,
            min_ray_length: 0.3,
            max_ray_length: 3.0,
            max_weight: 64.0,
            texture_enabled: false,
        }
    }
}

impl TsdfConfig {
    /// Check voxel size, ray range, truncation and weight cap.
    pub fn validate(&self) -> Result<()> {
        check_ray_limits(self.voxel_scale, self.min_ray_length, self.max_ray_length)?;
        if !(self.truncation.is_finite() && self.truncation > 0.0) {
            return Err(VolumeError::InvalidConfig(format!(
                "truncation {} must be positive",
                self.truncation
            )));
        }
        if self.max_weight.is_nan() || self.max_weight < 1.0 {
            return Err(VolumeError::InvalidConfig(format!(
                "max_weight {} must be at least 1",
                self.max_weight
            )));
        }
        Ok(())
    }

    /// Normalized distance below which a voxel counts as surface.
    #[inline]
    pub fn surface_threshold(&self) -> f32 {
        ((self.voxel_scale / self.truncation) as f32).min(1.0)
    }
}

/// One TSDF cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TsdfVoxel {
    /// Normalized signed distance in [-1, 1].
    pub sdf: f32,
    /// Accumulated weight.
    pub weight: f32,
    /// Fused colour.
    pub color: [u8; 3],
}

impl TsdfVoxel {
    fn fuse(&mut self, sdf: f32, color: Option<[u8; 3]>, max_weight: f32) {
        let w = self.weight;
        self.sdf = (self.sdf * w + sdf) / (w + 1.0);
        if let Some(c) = color {
            for (channel, sample) in self.color.iter_mut().zip(c) {
                *channel = ((*channel as f32 * w + sample as f32) / (w + 1.0)).round() as u8;
            }
        }
        self.weight = (w + 1.0).min(max_weight);
    }
}

/// Exported TSDF submap, voxels sorted by key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TsdfSnapshot {
    /// Voxel edge length (meters).
    pub voxel_scale: f64,
    /// Surface threshold on normalized distance.
    pub surface_threshold: f32,
    /// Voxels in the submap-local frame.
    pub voxels: Vec<(VoxelKey, TsdfVoxel)>,
}

impl VoxelSnapshot for TsdfSnapshot {
    fn surface_points(&self) -> Vec<Vector3<f64>> {
        self.voxels
            .iter()
            .filter(|(_, v)| v.weight > 0.0 && v.sdf.abs() < self.surface_threshold)
            .map(|(k, _)| k.center(self.voxel_scale))
            .collect()
    }

    fn voxel_count(&self) -> usize {
        self.voxels.len()
    }
}

/// Sparse-hashed TSDF volume.
#[derive(Clone, Debug, Default)]
pub struct TsdfVolume {
    config: TsdfConfig,
    voxels: HashMap<VoxelKey, TsdfVoxel>,
}

impl TsdfVolume {
    /// Create an empty volume.
    pub fn new(config: TsdfConfig) -> Self {
        Self {
            config,
            voxels: HashMap::new(),
        }
    }

    /// Volume options.
    pub fn config(&self) -> &TsdfConfig {
        &self.config
    }

    /// Number of allocated voxels.
    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }

    /// Voxel at a key.
    pub fn voxel(&self, key: &VoxelKey) -> Option<&TsdfVoxel> {
        self.voxels.get(key)
    }
}

impl Volume for TsdfVolume {
    type Snapshot = TsdfSnapshot;

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    fn integrate(&mut self, sensor_pose: &Pose3D, observation: &PointCloud) -> Result<usize> {
        check_observation(observation)?;

        let scale = self.config.voxel_scale;
        let trunc = self.config.truncation;
        let step = scale * 0.5;
        let origin = sensor_pose.translation;
        let mut updated = 0;

        for (i, point) in observation.points.iter().enumerate() {
            let range = point.norm();
            if range < self.config.min_ray_length || range > self.config.max_ray_length {
                continue;
            }

            let direction = sensor_pose.rotation * point / range;
            let color = if self.config.texture_enabled {
                observation.color(i)
            } else {
                None
            };

            let start = (range - trunc).max(0.0);
            let end = range + trunc;
            let mut last_key = None;
            let mut t = start;
            while t <= end {
                let key = VoxelKey::from_point(&(origin + direction * t), scale);
                if last_key != Some(key) {
                    let sdf = ((range - t) / trunc).clamp(-1.0, 1.0) as f32;
                    self.voxels
                        .entry(key)
                        .or_default()
                        .fuse(sdf, color, self.config.max_weight);
                    updated += 1;
                    last_key = Some(key);
                }
                t += step;
            }
        }

        Ok(updated)
    }

    fn export(&self) -> TsdfSnapshot {
        let mut voxels: Vec<_> = self.voxels.iter().map(|(k, v)| (*k, *v)).collect();
        voxels.sort_unstable_by_key(|(k, _)| *k);

        TsdfSnapshot {
            voxel_scale: self.config.voxel_scale,
            surface_threshold: self.config.surface_threshold(),
            voxels,
        }
    }

    fn clear(&mut self) {
        self.voxels.clear();
    }

    fn surface_points(&self) -> Vec<Vector3<f64>> {
        let threshold = self.config.surface_threshold();
        let mut keys: Vec<_> = self
            .voxels
            .iter()
            .filter(|(_, v)| v.weight > 0.0 && v.sdf.abs() < threshold)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_unstable();
        keys.iter()
            .map(|k| k.center(self.config.voxel_scale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeError;

    fn wall_cloud() -> PointCloud {
        // 1m ahead, a small 5×5 patch
        let mut points = Vec::new();
        for i in -2..=2 {
            for j in -2..=2 {
                points.push(Vector3::new(1.0, i as f64 * 0.05, j as f64 * 0.05));
            }
        }
        PointCloud::new(points)
    }

    #[test]
    fn test_integrate_creates_surface_near_wall() {
        let mut volume = TsdfVolume::new(TsdfConfig::default());
        let updated = volume
            .integrate(&Pose3D::identity(), &wall_cloud())
            .unwrap();

        assert!(updated > 0);
        let surface = volume.surface_points();
        assert!(!surface.is_empty());
        for p in &surface {
            assert!((p.x - 1.0).abs() <= 0.1, "surface voxel at x={}", p.x);
        }
    }

    #[test]
    fn test_range_limits() {
        let config = TsdfConfig::default();
        let mut volume = TsdfVolume::new(config);

        let cloud = PointCloud::new(vec![Vector3::new(0.1, 0.0, 0.0), Vector3::new(5.0, 0.0, 0.0)]);
        let updated = volume.integrate(&Pose3D::identity(), &cloud).unwrap();

        assert_eq!(updated, 0);
        assert_eq!(volume.voxel_count(), 0);
    }

    #[test]
    fn test_export_is_deterministic() {
        let mut a = TsdfVolume::new(TsdfConfig::default());
        let mut b = TsdfVolume::new(TsdfConfig::default());
        a.integrate(&Pose3D::identity(), &wall_cloud()).unwrap();
        b.integrate(&Pose3D::identity(), &wall_cloud()).unwrap();

        let bytes_a = bincode::serialize(&a.export()).unwrap();
        let bytes_b = bincode::serialize(&b.export()).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn test_clear() {
        let mut volume = TsdfVolume::new(TsdfConfig::default());
        volume.integrate(&Pose3D::identity(), &wall_cloud()).unwrap();
        volume.clear();

        assert_eq!(volume.voxel_count(), 0);
        assert!(volume.export().voxels.is_empty());
    }

    #[test]
    fn test_color_fusion() {
        let config = TsdfConfig {
            texture_enabled: true,
            ..Default::default()
        };
        let mut volume = TsdfVolume::new(config);
        let cloud = PointCloud::with_colors(vec![Vector3::new(1.0, 0.0, 0.0)], vec![[200, 100, 0]]);
        volume.integrate(&Pose3D::identity(), &cloud).unwrap();

        let key = VoxelKey::from_point(&Vector3::new(1.0, 0.0, 0.0), 0.05);
        let voxel = volume.voxel(&key).unwrap();
        assert_eq!(voxel.color, [200, 100, 0]);
    }

    #[test]
    fn test_config_validation() {
        assert!(TsdfConfig::default().validate().is_ok());

        let zero_scale = TsdfConfig {
            voxel_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            TsdfVolume::new(zero_scale).validate(),
            Err(VolumeError::InvalidConfig(_))
        ));

        let no_truncation = TsdfConfig {
            truncation: 0.0,
            ..Default::default()
        };
        assert!(no_truncation.validate().is_err());

        let inverted = TsdfConfig {
            min_ray_length: 4.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_rejects_mismatched_colors() {
        let mut volume = TsdfVolume::new(TsdfConfig::default());
        let cloud = PointCloud::with_colors(vec![Vector3::new(1.0, 0.0, 0.0)], vec![]);

        let err = volume.integrate(&Pose3D::identity(), &cloud).unwrap_err();
        assert!(matches!(err, VolumeError::InvalidObservation(_)));
    }
}
