//! Submap collection: the single active volume plus bookkeeping for all
//! finalized submaps.

use std::collections::BTreeMap;

use nalgebra::Vector3;

use super::types::{SubmapId, SubmapInfo, SubmapOrigin, SubmapState};
use crate::core::{FrameId, PointCloud, Pose3D};
use crate::volume::{Result, Volume, VolumeError, VoxelSnapshot};

/// Export of a submap at finalization time.
#[derive(Clone, Debug)]
pub struct FinalizedSubmap<S> {
    /// Id of the finalized submap.
    pub id: SubmapId,
    /// Frame that created it.
    pub frame_id: FrameId,
    /// Placement at finalization time.
    pub base_pose: Pose3D,
    /// Voxel content in the submap-local frame.
    pub snapshot: S,
}

/// Owns the active volume and hands out exports on finalize.
///
/// The active submap is held apart from the finalized ones, so there is
/// exactly one active submap at any time.
pub struct SubmapCollection<V: Volume> {
    /// Fusion buffer of the active submap.
    volume: V,

    /// The active submap.
    active: SubmapInfo,

    /// Finalized submaps (local and remote).
    finalized: BTreeMap<SubmapId, SubmapInfo>,

    /// Next submap ID to assign.
    next_id: u32,

    /// Maximum number of submaps, active included.
    max_submaps: usize,
}

impl<V: Volume> SubmapCollection<V> {
    /// Create a collection whose first active submap is id 0.
    pub fn new(volume: V, max_submaps: usize) -> Self {
        Self {
            volume,
            active: SubmapInfo {
                id: SubmapId::new(0),
                frame_id: None,
                base_pose: Pose3D::identity(),
                state: SubmapState::Active,
                origin: SubmapOrigin::Local,
                voxel_count: 0,
            },
            finalized: BTreeMap::new(),
            next_id: 1,
            max_submaps,
        }
    }

    /// Id of the active submap.
    #[inline]
    pub fn current_id(&self) -> SubmapId {
        self.active.id
    }

    /// The active submap.
    pub fn active(&self) -> &SubmapInfo {
        &self.active
    }

    /// The active fusion buffer.
    pub fn volume(&self) -> &V {
        &self.volume
    }

    /// Look up any submap.
    pub fn info(&self, id: SubmapId) -> Option<&SubmapInfo> {
        if id == self.active.id {
            Some(&self.active)
        } else {
            self.finalized.get(&id)
        }
    }

    /// Finalized submaps in id order.
    pub fn finalized(&self) -> impl Iterator<Item = &SubmapInfo> {
        self.finalized.values()
    }

    /// All submaps, finalized first (id order), then the active one.
    pub fn iter(&self) -> impl Iterator<Item = &SubmapInfo> {
        self.finalized.values().chain(std::iter::once(&self.active))
    }

    /// Total submaps, active included.
    pub fn submap_count(&self) -> usize {
        self.finalized.len() + 1
    }

    /// Number of finalized submaps.
    pub fn finalized_count(&self) -> usize {
        self.finalized.len()
    }

    /// Configured capacity.
    pub fn max_submaps(&self) -> usize {
        self.max_submaps
    }

    /// Bind the active submap to its creating frame and placement.
    pub fn activate(&mut self, frame_id: FrameId, base_pose: Pose3D) {
        self.active.frame_id = Some(frame_id);
        self.active.base_pose = base_pose;
    }

    /// Move a submap's placement. Returns `false` for unknown ids.
    pub fn set_base_pose(&mut self, id: SubmapId, pose: Pose3D) -> bool {
        if id == self.active.id {
            self.active.base_pose = pose;
            return true;
        }
        match self.finalized.get_mut(&id) {
            Some(info) => {
                info.base_pose = pose;
                true
            }
            None => false,
        }
    }

    /// Integrate an observation taken at a global-frame sensor pose.
    pub fn integrate(&mut self, sensor_pose: &Pose3D, observation: &PointCloud) -> Result<usize> {
        let local = self.active.base_pose.inverse().compose(sensor_pose);
        self.volume.integrate(&local, observation)
    }

    /// Export the active volume without finalizing it.
    pub fn export(&self) -> V::Snapshot {
        self.volume.export()
    }

    /// Drop the active volume's content.
    pub fn clear(&mut self) {
        self.volume.clear();
    }

    /// Finalize the active submap and start the next one.
    ///
    /// The new active submap is bound to `frame_id` at `base_pose`. While
    /// the initial submap is still unbound it is activated in place and
    /// nothing is finalized. Fails without side effects when capacity is
    /// exhausted.
    pub fn switch_to_next_submap(
        &mut self,
        frame_id: FrameId,
        base_pose: Pose3D,
    ) -> Result<Option<FinalizedSubmap<V::Snapshot>>> {
        let Some(created_by) = self.active.frame_id else {
            self.activate(frame_id, base_pose);
            return Ok(None);
        };
        self.ensure_capacity()?;

        let snapshot = self.volume.export();
        self.volume.clear();

        let next = SubmapInfo {
            id: self.allocate_id(),
            frame_id: Some(frame_id),
            base_pose,
            state: SubmapState::Active,
            origin: SubmapOrigin::Local,
            voxel_count: 0,
        };
        let mut done = std::mem::replace(&mut self.active, next);
        done.state = SubmapState::Finalized;
        done.voxel_count = snapshot.voxel_count();

        let finalized = FinalizedSubmap {
            id: done.id,
            frame_id: created_by,
            base_pose: done.base_pose,
            snapshot,
        };
        self.finalized.insert(done.id, done);

        Ok(Some(finalized))
    }

    /// Register a submap received from a peer. No local integration happens.
    pub fn ingest_remote(
        &mut self,
        frame_id: FrameId,
        base_pose: Pose3D,
        snapshot: &V::Snapshot,
    ) -> Result<SubmapId> {
        self.ensure_capacity()?;

        let id = self.allocate_id();
        self.finalized.insert(
            id,
            SubmapInfo {
                id,
                frame_id: Some(frame_id),
                base_pose,
                state: SubmapState::Finalized,
                origin: SubmapOrigin::Remote,
                voxel_count: snapshot.voxel_count(),
            },
        );
        Ok(id)
    }

    /// Surface points of the active submap in the global frame.
    pub fn active_world_points(&self) -> Vec<Vector3<f64>> {
        let base = self.active.base_pose;
        self.volume
            .surface_points()
            .iter()
            .map(|p| base.transform_point(p))
            .collect()
    }

    fn ensure_capacity(&self) -> Result<()> {
        if self.submap_count() >= self.max_submaps {
            return Err(VolumeError::CapacityExceeded {
                capacity: self.max_submaps,
            });
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> SubmapId {
        let id = SubmapId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{OccupancyConfig, OccupancyVolume};

    fn collection(max: usize) -> SubmapCollection<OccupancyVolume> {
        SubmapCollection::new(OccupancyVolume::new(OccupancyConfig::default()), max)
    }

    fn cloud() -> PointCloud {
        PointCloud::new(vec![Vector3::new(1.01, 0.01, 0.01)])
    }

    #[test]
    fn test_starts_with_one_active() {
        let c = collection(10);
        assert_eq!(c.current_id(), SubmapId::new(0));
        assert_eq!(c.submap_count(), 1);
        assert_eq!(c.finalized_count(), 0);
        assert!(c.active().is_active());
    }

    #[test]
    fn test_switch_finalizes_and_resets() {
        let mut c = collection(10);
        c.activate(FrameId(0), Pose3D::identity());
        c.integrate(&Pose3D::identity(), &cloud()).unwrap();

        let done = c
            .switch_to_next_submap(FrameId(20), Pose3D::from_translation(1.0, 0.0, 0.0))
            .unwrap()
            .unwrap();

        assert_eq!(done.id, SubmapId::new(0));
        assert_eq!(done.frame_id, FrameId(0));
        assert!(done.snapshot.voxel_count() > 0);

        assert_eq!(c.current_id(), SubmapId::new(1));
        assert_eq!(c.active().frame_id, Some(FrameId(20)));
        assert!(c.export().voxels.is_empty());
        assert!(c.info(SubmapId::new(0)).unwrap().is_finalized());
        assert_eq!(c.iter().filter(|s| s.is_active()).count(), 1);
    }

    #[test]
    fn test_first_switch_activates_in_place() {
        let mut c = collection(1);
        let pose = Pose3D::from_translation(2.0, 0.0, 0.0);

        // Capacity 1 is enough: nothing is allocated
        let done = c.switch_to_next_submap(FrameId(4), pose).unwrap();

        assert!(done.is_none());
        assert_eq!(c.current_id(), SubmapId::new(0));
        assert_eq!(c.active().frame_id, Some(FrameId(4)));
        assert_eq!(c.active().base_pose, pose);
        assert_eq!(c.finalized_count(), 0);
    }

    #[test]
    fn test_integrate_in_local_frame() {
        let mut c = collection(10);
        c.activate(FrameId(0), Pose3D::from_translation(5.0, 0.0, 0.0));

        // Sensor at the submap origin: voxels land 1m ahead in the local frame
        c.integrate(&Pose3D::from_translation(5.0, 0.0, 0.0), &cloud())
            .unwrap();

        let local = c.volume().surface_points();
        assert_eq!(local.len(), 1);
        assert!((local[0].x - 1.025).abs() < 1e-9);

        let world = c.active_world_points();
        assert!((world[0].x - 6.025).abs() < 1e-9);
    }

    #[test]
    fn test_remote_ingestion_keeps_active() {
        let mut c = collection(10);
        let snapshot = c.export();

        let id = c
            .ingest_remote(FrameId(7), Pose3D::from_translation(1.0, 2.0, 3.0), &snapshot)
            .unwrap();

        assert_eq!(id, SubmapId::new(1));
        assert_eq!(c.current_id(), SubmapId::new(0));
        let info = c.info(id).unwrap();
        assert_eq!(info.origin, SubmapOrigin::Remote);
        assert!(info.is_finalized());

        // Next local submap continues after the remote id
        c.activate(FrameId(0), Pose3D::identity());
        let done = c
            .switch_to_next_submap(FrameId(1), Pose3D::identity())
            .unwrap()
            .unwrap();
        assert_eq!(done.id, SubmapId::new(0));
        assert_eq!(c.current_id(), SubmapId::new(2));
    }

    #[test]
    fn test_capacity_exceeded_has_no_side_effects() {
        let mut c = collection(2);
        c.activate(FrameId(0), Pose3D::identity());
        c.switch_to_next_submap(FrameId(1), Pose3D::identity())
            .unwrap();

        let err = c
            .switch_to_next_submap(FrameId(2), Pose3D::identity())
            .unwrap_err();

        assert!(matches!(err, VolumeError::CapacityExceeded { capacity: 2 }));
        assert_eq!(c.current_id(), SubmapId::new(1));
        assert_eq!(c.submap_count(), 2);
    }

    #[test]
    fn test_set_base_pose() {
        let mut c = collection(10);
        c.activate(FrameId(0), Pose3D::identity());
        c.switch_to_next_submap(FrameId(1), Pose3D::identity())
            .unwrap();

        let pose = Pose3D::from_translation(0.0, 0.0, 9.0);
        assert!(c.set_base_pose(SubmapId::new(0), pose));
        assert!(c.set_base_pose(SubmapId::new(1), pose));
        assert!(!c.set_base_pose(SubmapId::new(5), pose));
        assert_eq!(c.info(SubmapId::new(0)).unwrap().base_pose, pose);
    }
}
