//! Runtime configuration for the mapping orchestrator.

use std::path::PathBuf;

use crate::core::Pose3D;

/// Periodic global map saving.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoSaveConfig {
    /// Destination file.
    pub path: PathBuf,
    /// Save when a created submap id is a multiple of this.
    pub every: u32,
}

/// Orchestrator settings.
#[derive(Clone, Debug)]
pub struct MappingConfig {
    /// Keyframe cadence for new submaps.
    /// Default: 20
    pub keyframe_step: u32,

    /// Body-to-sensor transform applied before integration.
    /// Default: identity
    pub extrinsic: Pose3D,

    /// Submap capacity across local and remote submaps.
    /// Default: 1000
    pub max_submaps: usize,

    /// Broadcast finalized submaps and local corrections. Has no effect
    /// with a channel that reports itself disconnected.
    /// Default: true
    pub sync_enabled: bool,

    /// zlib level for outbound payloads.
    /// Default: 1
    pub compression_level: u32,

    /// Autosave settings.
    /// Default: None
    pub autosave: Option<AutoSaveConfig>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            keyframe_step: 20,
            extrinsic: Pose3D::identity(),
            max_submaps: 1000,
            sync_enabled: true,
            compression_level: 1,
            autosave: None,
        }
    }
}

impl MappingConfig {
    /// Set the keyframe step.
    pub fn with_keyframe_step(mut self, step: u32) -> Self {
        self.keyframe_step = step;
        self
    }

    /// Enable or disable peer sync.
    pub fn with_sync(mut self, enabled: bool) -> Self {
        self.sync_enabled = enabled;
        self
    }

    /// Set the sensor extrinsic.
    pub fn with_extrinsic(mut self, extrinsic: Pose3D) -> Self {
        self.extrinsic = extrinsic;
        self
    }
}
