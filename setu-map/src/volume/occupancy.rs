//! Sparse occupancy fusion with integer log-odds.
//!
//! Every ray marks the voxels it crosses as free (`l_miss`) and its endpoint
//! as occupied (`l_hit`). Rays beyond `max_ray_length` are clipped and only
//! clear free space. Values are clamped to `[l_min, l_max]`.
//!
//! Log-odds are stored ×100 as `i16`:
//!
//! ```text
//! P = exp(L/100) / (1 + exp(L/100))
//! ```

use std::collections::HashMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::voxel::{VoxelKey, keys_along_ray};
use super::{Result, Volume, VolumeError, VoxelSnapshot, check_observation, check_ray_limits};
use crate::core::{PointCloud, Pose3D};

/// Sparse occupancy volume options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyConfig {
    /// Voxel edge length (meters).
    /// Default: 0.05
    pub voxel_scale: f64,

    /// Rays shorter than this are ignored (meters).
    /// Default: 0.3
    pub min_ray_length: f64,

    /// Rays are clipped to this length (meters).
    /// Default: 3.0
    pub max_ray_length: f64,

    /// Log-odds increment for an endpoint.
    /// Default: 85 (P≈0.7)
    pub l_hit: i16,

    /// Log-odds decrement for a crossed voxel.
    /// Default: -40 (P≈0.4)
    pub l_miss: i16,

    /// Threshold for reporting a voxel as occupied.
    /// Default: 50
    pub l_occupied_threshold: i16,

    /// Minimum log-odds value (clamping).
    pub l_min: i16,

    /// Maximum log-odds value (clamping).
    pub l_max: i16,
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            voxel_scale: 0.05,
            min_ray_length: 0.3,
            max_ray_length: 3.0,
            l_hit: 85,
            l_miss: -40,
            l_occupied_threshold: 50,
            l_min: -200,
            l_max: 350,
        }
    }
}

impl OccupancyConfig {
    /// Check voxel size, ray range and clamping bounds.
    pub fn validate(&self) -> Result<()> {
        check_ray_limits(self.voxel_scale, self.min_ray_length, self.max_ray_length)?;
        if self.l_min >= self.l_max {
            return Err(VolumeError::InvalidConfig(format!(
                "l_min {} must be below l_max {}",
                self.l_min, self.l_max
            )));
        }
        Ok(())
    }

    /// Convert log-odds to probability.
    pub fn log_odds_to_probability(log_odds: i16) -> f32 {
        let l = log_odds as f32 / 100.0;
        let exp_l = l.exp();
        exp_l / (1.0 + exp_l)
    }

    #[inline]
    fn apply(&self, current: i16, delta: i16) -> i16 {
        current.saturating_add(delta).clamp(self.l_min, self.l_max)
    }
}

/// Exported occupancy submap, voxels sorted by key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    /// Voxel edge length (meters).
    pub voxel_scale: f64,
    /// Threshold for occupied voxels.
    pub l_occupied_threshold: i16,
    /// Log-odds per voxel in the submap-local frame.
    pub voxels: Vec<(VoxelKey, i16)>,
}

impl VoxelSnapshot for OccupancySnapshot {
    fn surface_points(&self) -> Vec<Vector3<f64>> {
        self.voxels
            .iter()
            .filter(|(_, l)| *l > self.l_occupied_threshold)
            .map(|(k, _)| k.center(self.voxel_scale))
            .collect()
    }

    fn voxel_count(&self) -> usize {
        self.voxels.len()
    }
}

/// Hash-based sparse occupancy volume.
#[derive(Clone, Debug, Default)]
pub struct OccupancyVolume {
    config: OccupancyConfig,
    voxels: HashMap<VoxelKey, i16>,
}

impl OccupancyVolume {
    /// Create an empty volume.
    pub fn new(config: OccupancyConfig) -> Self {
        Self {
            config,
            voxels: HashMap::new(),
        }
    }

    /// Volume options.
    pub fn config(&self) -> &OccupancyConfig {
        &self.config
    }

    /// Log-odds at a key (0 = unknown).
    pub fn log_odds(&self, key: &VoxelKey) -> i16 {
        self.voxels.get(key).copied().unwrap_or(0)
    }

    /// Number of observed voxels.
    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }

    fn update(&mut self, key: VoxelKey, delta: i16) {
        let entry = self.voxels.entry(key).or_insert(0);
        *entry = self.config.apply(*entry, delta);
    }
}

impl Volume for OccupancyVolume {
    type Snapshot = OccupancySnapshot;

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    fn integrate(&mut self, sensor_pose: &Pose3D, observation: &PointCloud) -> Result<usize> {
        check_observation(observation)?;

        let scale = self.config.voxel_scale;
        let origin = sensor_pose.translation;
        let mut updated = 0;

        for point in &observation.points {
            let range = point.norm();
            if range < self.config.min_ray_length {
                continue;
            }

            let clipped = range > self.config.max_ray_length;
            let local = if clipped {
                point * (self.config.max_ray_length / range)
            } else {
                *point
            };
            let end = sensor_pose.transform_point(&local);

            for key in keys_along_ray(&origin, &end, scale) {
                self.update(key, self.config.l_miss);
                updated += 1;
            }
            if !clipped {
                self.update(VoxelKey::from_point(&end, scale), self.config.l_hit);
                updated += 1;
            }
        }

        Ok(updated)
    }

    fn export(&self) -> OccupancySnapshot {
        let mut voxels: Vec<_> = self.voxels.iter().map(|(k, l)| (*k, *l)).collect();
        voxels.sort_unstable_by_key(|(k, _)| *k);

        OccupancySnapshot {
            voxel_scale: self.config.voxel_scale,
            l_occupied_threshold: self.config.l_occupied_threshold,
            voxels,
        }
    }

    fn clear(&mut self) {
        self.voxels.clear();
    }

    fn surface_points(&self) -> Vec<Vector3<f64>> {
        let mut keys: Vec<_> = self
            .voxels
            .iter()
            .filter(|(_, l)| **l > self.config.l_occupied_threshold)
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

    #[test]
    fn test_hit_and_miss() {
        let mut volume = OccupancyVolume::new(OccupancyConfig::default());
        let end = Vector3::new(1.01, 0.01, 0.01);
        let cloud = PointCloud::new(vec![end]);

        volume.integrate(&Pose3D::identity(), &cloud).unwrap();

        let hit = VoxelKey::from_point(&end, 0.05);
        assert_eq!(volume.log_odds(&hit), 85);
        assert_eq!(volume.log_odds(&VoxelKey::new(5, 0, 0)), -40);
        assert_eq!(volume.surface_points().len(), 1);
    }

    #[test]
    fn test_clipped_ray_only_clears() {
        let mut volume = OccupancyVolume::new(OccupancyConfig::default());
        let cloud = PointCloud::new(vec![Vector3::new(10.0, 0.01, 0.01)]);

        volume.integrate(&Pose3D::identity(), &cloud).unwrap();

        assert!(volume.voxel_count() > 0);
        assert!(volume.surface_points().is_empty());
    }

    #[test]
    fn test_clamping() {
        let mut volume = OccupancyVolume::new(OccupancyConfig::default());
        let cloud = PointCloud::new(vec![Vector3::new(1.01, 0.01, 0.01)]);
        for _ in 0..20 {
            volume.integrate(&Pose3D::identity(), &cloud).unwrap();
        }

        let hit = VoxelKey::from_point(&Vector3::new(1.01, 0.01, 0.01), 0.05);
        assert_eq!(volume.log_odds(&hit), 350);
        assert_eq!(volume.log_odds(&VoxelKey::new(5, 0, 0)), -200);
    }

    #[test]
    fn test_config_validation() {
        assert!(OccupancyVolume::default().validate().is_ok());

        let zero_scale = OccupancyConfig {
            voxel_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            OccupancyVolume::new(zero_scale).validate(),
            Err(crate::volume::VolumeError::InvalidConfig(_))
        ));

        let inverted_clamp = OccupancyConfig {
            l_min: 100,
            l_max: 100,
            ..Default::default()
        };
        assert!(inverted_clamp.validate().is_err());
    }

    #[test]
    fn test_probability_conversion() {
        assert!((OccupancyConfig::log_odds_to_probability(0) - 0.5).abs() < 1e-6);
        assert!(OccupancyConfig::log_odds_to_probability(85) > 0.69);
    }

    #[test]
    fn test_pose_applied() {
        let mut volume = OccupancyVolume::new(OccupancyConfig::default());
        let pose = Pose3D::from_translation(2.0, 0.0, 0.0);
        let cloud = PointCloud::new(vec![Vector3::new(1.01, 0.01, 0.01)]);

        volume.integrate(&pose, &cloud).unwrap();

        let surface = volume.surface_points();
        assert_eq!(surface.len(), 1);
        assert!((surface[0].x - 3.025).abs() < 1e-9);
    }
}
