//! Core types shared by every stage of the mapping backend.
//!
//! All poses are rigid transforms in a right-handed 3D frame. A pose maps
//! points from its local frame into the parent frame:
//!
//! ```text
//! p_parent = R · p_local + t
//! ```
//!
//! ## Type Categories
//!
//! - [`Pose3D`]: rotation matrix plus translation, immutable value type
//! - [`FrameId`]: identifier of a sensor frame delivered by the tracker
//! - [`PointCloud`]: one sensor observation in the sensor frame

mod frame;
mod pose;
mod sensors;

pub use frame::FrameId;
pub use pose::Pose3D;
pub use sensors::PointCloud;
