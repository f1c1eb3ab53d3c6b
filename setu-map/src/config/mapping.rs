//! Mapping configuration section.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::core::Pose3D;

use super::defaults;

/// Fusion strategy backing submaps and the global map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    /// Truncated signed distance field
    #[default]
    DenseTsdf,
    /// Log-odds occupancy
    Occupancy,
}

impl std::fmt::Display for FusionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FusionStrategy::DenseTsdf => write!(f, "dense_tsdf"),
            FusionStrategy::Occupancy => write!(f, "occupancy"),
        }
    }
}

/// Sensor mounting relative to the body frame
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrinsicSettings {
    /// Offset [x, y, z] (meters)
    #[serde(default)]
    pub translation: [f64; 3],

    /// Orientation [roll, pitch, yaw] (radians)
    #[serde(default)]
    pub rpy: [f64; 3],
}

impl ExtrinsicSettings {
    /// Body-to-sensor transform.
    pub fn to_pose(&self) -> Pose3D {
        let [x, y, z] = self.translation;
        let [roll, pitch, yaw] = self.rpy;
        Pose3D::from_rpy(roll, pitch, yaw, Vector3::new(x, y, z))
    }
}

/// Mapping settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MappingSection {
    /// Keyframe cadence for new submaps
    #[serde(default = "defaults::keyframe_step")]
    pub keyframe_step: u32,

    /// Fusion strategy
    #[serde(default)]
    pub strategy: FusionStrategy,

    /// Sensor extrinsic
    #[serde(default)]
    pub sensor_extrinsic: ExtrinsicSettings,

    /// Submap capacity (local and remote)
    #[serde(default = "defaults::max_submaps")]
    pub max_submaps: usize,
}

impl Default for MappingSection {
    fn default() -> Self {
        Self {
            keyframe_step: 20,
            strategy: FusionStrategy::DenseTsdf,
            sensor_extrinsic: ExtrinsicSettings::default(),
            max_submaps: 1000,
        }
    }
}
