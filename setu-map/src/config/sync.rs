//! Sync configuration section.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Peer synchronization settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncSection {
    /// Broadcast finalized submaps and corrections
    #[serde(default = "defaults::sync_enabled")]
    pub enabled: bool,

    /// zlib level (0-9)
    #[serde(default = "defaults::compression_level")]
    pub compression_level: u32,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            enabled: true,
            compression_level: 1,
        }
    }
}
