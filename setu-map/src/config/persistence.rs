//! Persistence configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::mapping::AutoSaveConfig;

use super::defaults;

/// Persistence settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceSection {
    /// Global map file path
    #[serde(default = "defaults::output_path")]
    pub output_path: String,

    /// Save every N created submaps (0=disabled)
    #[serde(default)]
    pub autosave_every_submaps: u32,
}

impl Default for PersistenceSection {
    fn default() -> Self {
        Self {
            output_path: "./output/global_map.setu".to_string(),
            autosave_every_submaps: 0,
        }
    }
}

impl PersistenceSection {
    /// Autosave settings, if enabled
    pub fn to_autosave_config(&self) -> Option<AutoSaveConfig> {
        (self.autosave_every_submaps > 0).then(|| AutoSaveConfig {
            path: PathBuf::from(&self.output_path),
            every: self.autosave_every_submaps,
        })
    }
}
