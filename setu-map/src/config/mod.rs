//! Unified configuration loading for setu-map.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use setu_map::config::SetuConfig;
//!
//! // Load from default path (configs/setu.yaml)
//! let config = SetuConfig::load_default()?;
//!
//! // Convert to runtime configs
//! let mapping_config = config.to_mapping_config();
//! let tsdf_config = config.tsdf_config();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`MappingSection`] | Keyframe cadence, fusion strategy, sensor extrinsic, capacity |
//! | [`VolumeSection`] | TSDF and occupancy volume options |
//! | [`SyncSection`] | Peer sync enable and compression level |
//! | [`PersistenceSection`] | Global map path and autosave cadence |
//!
//! ## Example YAML
//!
//! ```yaml
//! mapping:
//!   keyframe_step: 20
//!   strategy: dense_tsdf      # or occupancy
//!   sensor_extrinsic:
//!     translation: [0.0, 0.0, 0.3]
//!     rpy: [0.0, 0.0, 0.0]
//!
//! volume:
//!   tsdf:
//!     voxel_scale: 0.05
//!     truncation: 0.15
//!
//! sync:
//!   enabled: true
//!   compression_level: 1
//!
//! persistence:
//!   output_path: ./output/global_map.setu
//!   autosave_every_submaps: 10
//! ```

mod defaults;
mod error;
mod mapping;
mod persistence;
mod setu;
mod sync;
mod volume;

// Re-export main types
pub use error::ConfigLoadError;
pub use setu::SetuConfig;

// Re-export section types
pub use mapping::{ExtrinsicSettings, FusionStrategy, MappingSection};
pub use persistence::PersistenceSection;
pub use sync::SyncSection;
pub use volume::VolumeSection;
