//! Volume configuration section.

use serde::{Deserialize, Serialize};

use crate::volume::{OccupancyConfig, TsdfConfig};

/// Per-strategy volume options
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VolumeSection {
    /// Dense TSDF options
    #[serde(default)]
    pub tsdf: TsdfConfig,

    /// Occupancy options
    #[serde(default)]
    pub occupancy: OccupancyConfig,
}
