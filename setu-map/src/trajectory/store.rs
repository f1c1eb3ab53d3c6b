//! Trajectory tables and drift compensation.

use std::collections::BTreeMap;

use crate::core::{FrameId, Pose3D};

/// Re-express a raw pose in the corrected frame of an anchor.
///
/// `anchor_raw` and `anchor_corrected` are the raw and corrected poses of the
/// same frame. The raw motion since the anchor is applied on top of the
/// anchor's corrected placement.
pub fn compensate_drift(raw: &Pose3D, anchor_raw: &Pose3D, anchor_corrected: &Pose3D) -> Pose3D {
    let delta = anchor_corrected.rotation * anchor_raw.rotation.transpose();
    Pose3D::new(
        delta * raw.rotation,
        delta * (raw.translation - anchor_raw.translation) + anchor_corrected.translation,
    )
}

/// Raw and corrected poses per frame, plus the drift-compensation anchor.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryStore {
    /// Raw tracker poses. Never overwritten.
    ego_motion: BTreeMap<FrameId, Pose3D>,

    /// Pose-graph-corrected poses. Overwritten by newer corrections.
    pgo: BTreeMap<FrameId, Pose3D>,

    /// Newest frame with both a raw and a corrected pose.
    anchor: Option<FrameId>,
}

impl TrajectoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw pose of a frame.
    pub fn ego_motion(&self, frame_id: FrameId) -> Option<&Pose3D> {
        self.ego_motion.get(&frame_id)
    }

    /// Corrected pose of a frame.
    pub fn corrected(&self, frame_id: FrameId) -> Option<&Pose3D> {
        self.pgo.get(&frame_id)
    }

    /// Current anchor frame.
    pub fn anchor(&self) -> Option<FrameId> {
        self.anchor
    }

    /// Number of raw poses.
    pub fn ego_motion_len(&self) -> usize {
        self.ego_motion.len()
    }

    /// Number of corrected poses.
    pub fn corrected_len(&self) -> usize {
        self.pgo.len()
    }

    /// Iterate corrected poses in frame order.
    pub fn corrected_poses(&self) -> impl Iterator<Item = (FrameId, &Pose3D)> {
        self.pgo.iter().map(|(id, pose)| (*id, pose))
    }

    fn is_newer_than_anchor(&self, frame_id: FrameId) -> bool {
        self.anchor.is_none_or(|anchor| frame_id > anchor)
    }

    /// Record a raw pose.
    ///
    /// Returns `false` if the frame already had a raw pose; the stored value
    /// is kept. If the frame already carries a correction and is newer than
    /// the anchor, the anchor moves to it.
    pub fn record_ego_motion(&mut self, frame_id: FrameId, pose: Pose3D) -> bool {
        if self.ego_motion.contains_key(&frame_id) {
            log::debug!("Ignoring duplicate raw pose for {}", frame_id);
            return false;
        }
        self.ego_motion.insert(frame_id, pose);

        if self.pgo.contains_key(&frame_id) && self.is_newer_than_anchor(frame_id) {
            log::trace!("Anchor promoted to {} on late raw pose", frame_id);
            self.anchor = Some(frame_id);
        }
        true
    }

    /// Best available corrected pose for a raw pose, without recording it.
    ///
    /// Without an anchor the raw pose is returned unchanged.
    pub fn correct(&self, raw: &Pose3D) -> Pose3D {
        let Some(anchor) = self.anchor else {
            return *raw;
        };
        match (self.ego_motion.get(&anchor), self.pgo.get(&anchor)) {
            (Some(anchor_raw), Some(anchor_corrected)) => {
                compensate_drift(raw, anchor_raw, anchor_corrected)
            }
            _ => *raw,
        }
    }

    /// Record the raw pose of a frame and return its corrected pose.
    pub fn compensate(&mut self, frame_id: FrameId, raw: Pose3D) -> Pose3D {
        self.record_ego_motion(frame_id, raw);
        self.correct(&raw)
    }

    /// Store a corrected pose without touching the anchor.
    pub fn set_corrected(&mut self, frame_id: FrameId, pose: Pose3D) {
        self.pgo.insert(frame_id, pose);
    }

    /// Accept one external correction.
    ///
    /// Returns `true` if the anchor advanced to this frame. The anchor only
    /// advances when the frame is newer than the current anchor and its raw
    /// pose is known.
    pub fn apply_correction(&mut self, frame_id: FrameId, pose: Pose3D) -> bool {
        self.pgo.insert(frame_id, pose);

        if self.is_newer_than_anchor(frame_id) && self.ego_motion.contains_key(&frame_id) {
            log::trace!("Anchor advanced to {}", frame_id);
            self.anchor = Some(frame_id);
            return true;
        }
        false
    }

    /// Drop raw and corrected entries older than `frame_id`.
    ///
    /// The anchor's entries are always kept. Returns the number of entries
    /// removed across both tables.
    pub fn prune_before(&mut self, frame_id: FrameId) -> usize {
        let before = self.ego_motion.len() + self.pgo.len();
        let anchor = self.anchor;
        let keep = |id: &FrameId| *id >= frame_id || Some(*id) == anchor;

        self.ego_motion.retain(|id, _| keep(id));
        self.pgo.retain(|id, _| keep(id));

        before - (self.ego_motion.len() + self.pgo.len())
    }
}
