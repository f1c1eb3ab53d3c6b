//! Submap lifecycle.
//!
//! Exactly one submap is active at a time. Finalizing hands back an immutable
//! export of the active volume, marks it finalized and starts a fresh active
//! submap with the next id. Remote submaps are registered directly as
//! finalized without any local integration.
//!
//! ```text
//!  id:   0           1           2 (remote)    3
//!      ┌──────────┐┌──────────┐┌──────────┐┌──────────┐
//!      │Finalized ││Finalized ││Finalized ││ Active   │◀── observations
//!      └──────────┘└──────────┘└──────────┘└──────────┘
//! ```
//!
//! A finalized submap's voxel content never changes; its base pose may still
//! move when a pose-graph correction arrives.

mod collection;
mod types;

pub use collection::{FinalizedSubmap, SubmapCollection};
pub use types::{SubmapId, SubmapInfo, SubmapOrigin, SubmapState};
