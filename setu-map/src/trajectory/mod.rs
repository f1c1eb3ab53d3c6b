//! Raw and pose-graph-corrected trajectories.
//!
//! Two parallel tables map frame ids to poses:
//!
//! - **ego motion**: raw tracker output, append-only
//! - **pgo**: corrections from an external pose-graph solver, overwritable
//!
//! The most recent frame present in both tables is the *anchor*. New raw
//! poses are re-expressed in the corrected frame through the anchor:
//!
//! ```text
//! R = Rp · Reᵀ · Ra
//! T = Rp · Reᵀ · (Ta − Te) + Tp
//! ```

mod store;

pub use store::{TrajectoryStore, compensate_drift};
