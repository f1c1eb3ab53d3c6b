//! Core submap data types.

use serde::{Deserialize, Serialize};

use crate::core::{FrameId, Pose3D};

/// Unique identifier for a submap, assigned in increasing order from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmapId(pub u32);

impl SubmapId {
    /// Create a new submap ID.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SubmapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Submap({})", self.0)
    }
}

/// State of a submap in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmapState {
    /// Receiving observations. Only one submap can be Active at a time.
    Active,

    /// Voxel content frozen. Placement can still be corrected.
    Finalized,
}

/// Where a submap's content came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmapOrigin {
    /// Built from local observations.
    Local,
    /// Received from a peer.
    Remote,
}

/// Bookkeeping for one submap.
#[derive(Clone, Debug)]
pub struct SubmapInfo {
    /// Unique identifier.
    pub id: SubmapId,

    /// Frame whose observation created the submap.
    /// `None` until the first frame activates submap 0.
    pub frame_id: Option<FrameId>,

    /// Placement of the submap-local frame in the global frame.
    pub base_pose: Pose3D,

    /// Lifecycle state.
    pub state: SubmapState,

    /// Local or remote.
    pub origin: SubmapOrigin,

    /// Voxels in the export (0 while active).
    pub voxel_count: usize,
}

impl SubmapInfo {
    /// Is this submap receiving observations?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == SubmapState::Active
    }

    /// Is this submap finalized?
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.state == SubmapState::Finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submap_id() {
        let id = SubmapId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(format!("{}", id), "Submap(42)");
        assert!(SubmapId::new(1) < SubmapId::new(2));
    }

    #[test]
    fn test_info_state() {
        let info = SubmapInfo {
            id: SubmapId::new(0),
            frame_id: None,
            base_pose: Pose3D::identity(),
            state: SubmapState::Active,
            origin: SubmapOrigin::Local,
            voxel_count: 0,
        };
        assert!(info.is_active());
        assert!(!info.is_finalized());
    }
}
