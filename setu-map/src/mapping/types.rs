//! Orchestrator inputs and outputs.

use crate::core::{FrameId, Pose3D};
use crate::submap::SubmapId;

/// Where a correction batch came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrectionOrigin {
    /// Local pose-graph back end. Accepted corrections are re-broadcast.
    Local,
    /// A peer. Never re-broadcast.
    Remote,
}

/// Which part of the map to export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MapView {
    /// The active submap only.
    Local,
    /// All fused submaps plus the active one.
    #[default]
    Global,
}

/// Outcome of processing one frame.
#[derive(Clone, Debug)]
pub struct FrameResult {
    /// Processed frame.
    pub frame_id: FrameId,
    /// Drift-compensated body pose.
    pub corrected_pose: Pose3D,
    /// Submap the observation went into.
    pub submap_id: SubmapId,
    /// Whether this frame started a new submap.
    pub new_submap: bool,
    /// Voxel updates reported by the volume.
    pub voxels_updated: usize,
}

/// Outcome of applying a correction batch.
#[derive(Clone, Debug, Default)]
pub struct CorrectionResult {
    /// Entries written to the corrected trajectory.
    pub applied: usize,
    /// Submaps whose placement moved.
    pub moved: Vec<SubmapId>,
    /// Anchor frame after the batch, if it advanced.
    pub anchor: Option<FrameId>,
    /// Whether the batch was re-broadcast to peers.
    pub broadcast: bool,
}

/// Running counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingStats {
    /// Frames processed.
    pub frames_processed: u64,
    /// Submaps created locally (the first activation included).
    pub submaps_created: u64,
    /// Submaps ingested from peers.
    pub remote_submaps: u64,
    /// Correction entries applied (local and remote).
    pub corrections_applied: u64,
    /// Messages handed to the sync channel.
    pub messages_sent: u64,
    /// Serialized bytes before compression.
    pub bytes_raw: u64,
    /// Bytes handed to the sync channel.
    pub bytes_sent: u64,
}
