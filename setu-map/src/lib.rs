//! # setu-map
//!
//! Submap management backend for online dense 3D mapping.
//!
//! ## Overview
//!
//! setu-map splits a continuous stream of tracked sensor frames into
//! independently built submaps, keeps every submap anchored in a shared
//! global frame as pose-graph corrections arrive, fuses finished submaps
//! into a global map, and exchanges submaps and trajectories with peer
//! agents over a compressed channel.
//!
//! Three pose views are kept consistent:
//!
//! - **Ego-motion** - raw tracker poses, never overwritten
//! - **Corrected** - pose-graph output, drives submap placement
//! - **Fused** - where each submap's content sits in the global map
//!
//! ## Features
//!
//! - **Boundary policy**: keyframe cadence for submap creation
//! - **Drift compensation**: raw motion re-expressed relative to the newest corrected anchor
//! - **Re-placement**: corrections move submaps without touching voxels
//! - **Two fusion strategies**: dense TSDF and sparse log-odds occupancy
//! - **Peer sync**: bincode + zlib payloads over any [`sync::SyncChannel`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use setu_map::{FusionStrategy, SetuConfig, SubmapMapping, FrameId, PointCloud, Pose3D};
//! use setu_map::sync::NullChannel;
//!
//! let mut config = SetuConfig::default();
//! config.mapping.strategy = FusionStrategy::Occupancy;
//! let mut mapping = SubmapMapping::occupancy(&config, NullChannel)?;
//!
//! let result = mapping.process_frame(FrameId(0), Pose3D::identity(), &cloud, true)?;
//! println!("frame went into {}", result.submap_id);
//! ```
//!
//! ## Coordinate System
//!
//! Right-handed 3D frames. A [`Pose3D`] maps points from its child frame
//! into its parent frame: `p_parent = R · p_child + t`. Submap content is
//! stored in the submap-local frame; its placement maps local to global.

#![warn(missing_docs)]

// Core types
pub mod core;

// Unified configuration
pub mod config;

// Fusion strategies and the global map
pub mod volume;

// Submap lifecycle bookkeeping
pub mod submap;

// Raw and corrected trajectories
pub mod trajectory;

// Wire codec and channels
pub mod sync;

// Orchestration
pub mod mapping;

// Persistence (save/load)
pub mod io;

// Re-export commonly used types
pub use crate::core::{FrameId, PointCloud, Pose3D};

pub use config::{ConfigLoadError, FusionStrategy, SetuConfig};
pub use mapping::{
    CorrectionOrigin, CorrectionResult, FrameResult, MapView, MappingConfig, MappingError,
    MappingStats, SubmapMapping,
};
pub use submap::{SubmapId, SubmapInfo, SubmapState};
pub use trajectory::TrajectoryStore;
pub use volume::{
    GlobalMap, LayeredGlobalMap, OccupancyConfig, OccupancyGlobalMap, OccupancyVolume,
    TsdfConfig, TsdfGlobalMap, TsdfVolume, Volume, VoxelSnapshot,
};
