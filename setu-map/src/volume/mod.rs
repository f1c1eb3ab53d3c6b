//! Volume fusion contracts and the two reference fusion strategies.
//!
//! The orchestrator never talks to a concrete fusion engine. It drives:
//!
//! - a [`Volume`]: the active submap's mutable fusion buffer, expressed in
//!   the submap-local frame
//! - a [`GlobalMap`]: the accumulation of finished submaps, each kept in its
//!   own local frame together with a placement in the global frame
//!
//! ```text
//!   observation ──integrate──▶ Volume (local) ──export──▶ Snapshot
//!                                                            │
//!                                     fuse(id, snapshot, pose)▼
//!                          GlobalMap: { id → (placement, snapshot) }
//!                                     place(id, pose) moves only the placement
//! ```
//!
//! Two strategies are provided:
//!
//! | Strategy | Volume | Snapshot | Global map |
//! |----------|--------|----------|------------|
//! | Dense volumetric | [`TsdfVolume`] | [`TsdfSnapshot`] | [`TsdfGlobalMap`] |
//! | Sparse occupancy | [`OccupancyVolume`] | [`OccupancySnapshot`] | [`OccupancyGlobalMap`] |

mod global;
mod occupancy;
mod tsdf;
mod voxel;

use std::path::Path;

use nalgebra::Vector3;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::FusionStrategy;
use crate::core::{PointCloud, Pose3D};
use crate::io::PersistError;
use crate::submap::SubmapId;

pub use global::LayeredGlobalMap;
pub use occupancy::{OccupancyConfig, OccupancySnapshot, OccupancyVolume};
pub use tsdf::{TsdfConfig, TsdfSnapshot, TsdfVolume, TsdfVoxel};
pub use voxel::{VoxelKey, keys_along_ray};

/// Global map for the dense volumetric strategy.
pub type TsdfGlobalMap = LayeredGlobalMap<TsdfSnapshot>;

/// Global map for the sparse occupancy strategy.
pub type OccupancyGlobalMap = LayeredGlobalMap<OccupancySnapshot>;

/// Fusion engine failure.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// No more submaps can be allocated.
    #[error("Submap capacity exceeded: at most {capacity} submaps")]
    CapacityExceeded {
        /// Configured maximum
        capacity: usize,
    },

    /// Observation cannot be integrated.
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    /// Volume options the fusion loop cannot run with.
    #[error("Invalid volume config: {0}")]
    InvalidConfig(String),

    /// Configuration selects a different strategy than the one being built.
    #[error("Strategy mismatch: config selects {configured}, building {requested}")]
    StrategyMismatch {
        /// Strategy named in the configuration
        configured: FusionStrategy,
        /// Strategy of the volume being built
        requested: FusionStrategy,
    },
}

/// Result type alias for fusion engine operations.
pub type Result<T> = std::result::Result<T, VolumeError>;

/// Immutable export of a finished submap.
///
/// Snapshots travel over the wire, so they must serialize. Exports of the
/// same content must serialize to identical bytes.
pub trait VoxelSnapshot: Clone + Serialize + DeserializeOwned {
    /// Surface (or occupied) voxel centres in the submap-local frame.
    fn surface_points(&self) -> Vec<Vector3<f64>>;

    /// Number of stored voxels.
    fn voxel_count(&self) -> usize;
}

/// Mutable fusion buffer of the active submap.
pub trait Volume {
    /// Export type produced by [`Volume::export`].
    type Snapshot: VoxelSnapshot;

    /// Reject options that would stall or overflow integration.
    fn validate(&self) -> Result<()>;

    /// Integrate an observation taken at `sensor_pose` (sensor → submap-local).
    ///
    /// Returns the number of voxels updated.
    fn integrate(&mut self, sensor_pose: &Pose3D, observation: &PointCloud) -> Result<usize>;

    /// Export the current content.
    fn export(&self) -> Self::Snapshot;

    /// Drop all content.
    fn clear(&mut self);

    /// Surface voxel centres in the submap-local frame.
    fn surface_points(&self) -> Vec<Vector3<f64>>;
}

/// Accumulating map of finished submaps.
pub trait GlobalMap {
    /// Snapshot type absorbed by [`GlobalMap::fuse`].
    type Snapshot: VoxelSnapshot;

    /// Set (or move) the placement of a submap. Never touches voxel content.
    fn place(&mut self, submap_id: SubmapId, pose: &Pose3D);

    /// Absorb a submap's content at the given placement.
    fn fuse(&mut self, submap_id: SubmapId, snapshot: &Self::Snapshot, pose: &Pose3D)
    -> Result<()>;

    /// Current placement of a submap.
    fn placement(&self, submap_id: SubmapId) -> Option<&Pose3D>;

    /// Fused content of a submap, in its local frame.
    fn submap_content(&self, submap_id: SubmapId) -> Option<&Self::Snapshot>;

    /// Number of fused submaps.
    fn fused_count(&self) -> usize;

    /// Surface points of every fused submap in the global frame.
    fn world_points(&self) -> Vec<Vector3<f64>>;

    /// Persist the map.
    fn save(&self, path: &Path) -> std::result::Result<(), PersistError>;

    /// Restore a map written by [`GlobalMap::save`].
    fn load(path: &Path) -> std::result::Result<Self, PersistError>
    where
        Self: Sized;
}

/// Validate an observation before integration.
pub(crate) fn check_observation(observation: &PointCloud) -> Result<()> {
    if !observation.colors_consistent() {
        return Err(VolumeError::InvalidObservation(format!(
            "{} points but {} colours",
            observation.len(),
            observation.colors.as_ref().map_or(0, Vec::len)
        )));
    }
    if observation.points.iter().any(|p| !p.iter().all(|v| v.is_finite())) {
        return Err(VolumeError::InvalidObservation(
            "non-finite point coordinate".to_string(),
        ));
    }
    Ok(())
}

/// Shared voxel size and ray range checks.
pub(crate) fn check_ray_limits(voxel_scale: f64, min_ray: f64, max_ray: f64) -> Result<()> {
    if !(voxel_scale.is_finite() && voxel_scale > 0.0) {
        return Err(VolumeError::InvalidConfig(format!(
            "voxel_scale {voxel_scale} must be positive"
        )));
    }
    if !max_ray.is_finite() || min_ray.is_nan() || min_ray < 0.0 || min_ray >= max_ray {
        return Err(VolumeError::InvalidConfig(format!(
            "min_ray_length {min_ray} must be in [0, max_ray_length {max_ray})"
        )));
    }
    Ok(())
}
