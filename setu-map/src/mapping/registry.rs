//! Frame to submap routing table.

use std::collections::BTreeMap;

use crate::core::FrameId;
use crate::submap::SubmapId;

/// Which submap each creating frame produced.
///
/// Incoming corrections are routed through this table to find the submap
/// whose placement they move.
#[derive(Clone, Debug, Default)]
pub struct SubmapRegistry {
    entries: BTreeMap<FrameId, SubmapId>,
}

impl SubmapRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `frame_id` created `submap_id`.
    ///
    /// Returns the submap previously registered for this frame.
    pub fn register(&mut self, frame_id: FrameId, submap_id: SubmapId) -> Option<SubmapId> {
        let previous = self.entries.insert(frame_id, submap_id);
        if let Some(old) = previous
            && old != submap_id
        {
            log::warn!("{} re-registered: {} -> {}", frame_id, old, submap_id);
        }
        previous
    }

    /// Submap created by a frame.
    pub fn get(&self, frame_id: FrameId) -> Option<SubmapId> {
        self.entries.get(&frame_id).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in frame order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, SubmapId)> + '_ {
        self.entries.iter().map(|(f, s)| (*f, *s))
    }
}
