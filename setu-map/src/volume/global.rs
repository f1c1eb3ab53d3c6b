//! Global map as a stack of placed submap layers.
//!
//! Each fused submap keeps its content in its own local frame. Moving a
//! submap after a pose-graph correction only rewrites its placement; the
//! world view is composed on demand:
//!
//! ```text
//! world_points = ⋃  placement(id) · surface_points(content(id))
//!                id
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{GlobalMap, Result, VolumeError, VoxelSnapshot};
use crate::core::Pose3D;
use crate::io::{PersistError, read_with_header, write_with_header};
use crate::submap::SubmapId;

/// A single submap's contribution to the global map.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Layer<S> {
    placement: Pose3D,
    content: Option<S>,
}

/// Global map for any snapshot type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayeredGlobalMap<S> {
    layers: BTreeMap<SubmapId, Layer<S>>,
    max_submaps: usize,
}

impl<S: VoxelSnapshot> LayeredGlobalMap<S> {
    /// Create an empty map holding at most `max_submaps` fused submaps.
    pub fn new(max_submaps: usize) -> Self {
        Self {
            layers: BTreeMap::new(),
            max_submaps,
        }
    }

    /// Capacity in fused submaps.
    pub fn max_submaps(&self) -> usize {
        self.max_submaps
    }

    /// Ids of fused submaps in ascending order.
    pub fn fused_ids(&self) -> impl Iterator<Item = SubmapId> + '_ {
        self.layers
            .iter()
            .filter(|(_, layer)| layer.content.is_some())
            .map(|(id, _)| *id)
    }

    /// Total voxels across fused submaps.
    pub fn voxel_count(&self) -> usize {
        self.layers
            .values()
            .filter_map(|layer| layer.content.as_ref())
            .map(VoxelSnapshot::voxel_count)
            .sum()
    }
}

impl<S: VoxelSnapshot> Default for LayeredGlobalMap<S> {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl<S: VoxelSnapshot> GlobalMap for LayeredGlobalMap<S> {
    type Snapshot = S;

    fn place(&mut self, submap_id: SubmapId, pose: &Pose3D) {
        self.layers
            .entry(submap_id)
            .and_modify(|layer| layer.placement = *pose)
            .or_insert(Layer {
                placement: *pose,
                content: None,
            });
    }

    fn fuse(&mut self, submap_id: SubmapId, snapshot: &S, pose: &Pose3D) -> Result<()> {
        let already_fused = self
            .layers
            .get(&submap_id)
            .is_some_and(|layer| layer.content.is_some());
        if !already_fused && self.fused_count() >= self.max_submaps {
            return Err(VolumeError::CapacityExceeded {
                capacity: self.max_submaps,
            });
        }
        if already_fused {
            log::warn!("{} fused twice, replacing content", submap_id);
        }

        self.layers.insert(
            submap_id,
            Layer {
                placement: *pose,
                content: Some(snapshot.clone()),
            },
        );
        Ok(())
    }

    fn placement(&self, submap_id: SubmapId) -> Option<&Pose3D> {
        self.layers.get(&submap_id).map(|layer| &layer.placement)
    }

    fn submap_content(&self, submap_id: SubmapId) -> Option<&S> {
        self.layers
            .get(&submap_id)
            .and_then(|layer| layer.content.as_ref())
    }

    fn fused_count(&self) -> usize {
        self.layers
            .values()
            .filter(|layer| layer.content.is_some())
            .count()
    }

    fn world_points(&self) -> Vec<Vector3<f64>> {
        self.layers
            .values()
            .filter_map(|layer| {
                layer
                    .content
                    .as_ref()
                    .map(|content| (layer.placement, content))
            })
            .flat_map(|(placement, content)| {
                content
                    .surface_points()
                    .into_iter()
                    .map(move |p| placement.transform_point(&p))
            })
            .collect()
    }

    fn save(&self, path: &Path) -> std::result::Result<(), PersistError> {
        write_with_header(path, self)?;
        log::info!(
            "Saved global map with {} submaps to {}",
            self.fused_count(),
            path.display()
        );
        Ok(())
    }

    fn load(path: &Path) -> std::result::Result<Self, PersistError> {
        read_with_header(path)
    }
}
