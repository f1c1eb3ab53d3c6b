//! Submap mapping orchestration.
//!
//! | Module | Role |
//! |--------|------|
//! | `policy` | Keyframe cadence for new submaps |
//! | `registry` | Creating frame → submap routing |
//! | `orchestrator` | [`SubmapMapping`]: lifecycle, corrections, fusion, sync |
//!
//! ## Example
//!
//! ```rust,ignore
//! use setu_map::config::SetuConfig;
//! use setu_map::mapping::SubmapMapping;
//! use setu_map::sync::NullChannel;
//!
//! let config = SetuConfig::load_default()?;
//! let mut mapping = SubmapMapping::tsdf(&config, NullChannel)?;
//!
//! for (frame_id, pose, cloud, keyframe) in frames {
//!     let result = mapping.process_frame(frame_id, pose, &cloud, keyframe)?;
//!     if result.new_submap {
//!         println!("now writing into {}", result.submap_id);
//!     }
//! }
//!
//! // Pose-graph output for earlier frames
//! mapping.set_frame_poses(&corrections)?;
//! mapping.save_map(Path::new("global_map.setu"))?;
//! ```

mod config;
mod error;
mod orchestrator;
mod policy;
mod registry;
mod types;

pub use config::{AutoSaveConfig, MappingConfig};
pub use error::{MappingError, Result};
pub use orchestrator::{PostFusionHook, SubmapMapping};
pub use policy::{BoundaryPolicy, should_create_submap};
pub use registry::SubmapRegistry;
pub use types::{CorrectionOrigin, CorrectionResult, FrameResult, MapView, MappingStats};
