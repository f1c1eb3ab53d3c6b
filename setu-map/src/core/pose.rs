//! Rigid 3D pose.

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid transform: 3×3 orthonormal rotation plus translation.
///
/// Orthonormality of `rotation` is assumed, never re-validated. The inverse
/// therefore uses the transpose.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use setu_map::core::Pose3D;
///
/// let a = Pose3D::from_translation(1.0, 0.0, 0.0);
/// let b = Pose3D::from_rpy(0.0, 0.0, std::f64::consts::FRAC_PI_2, Vector3::zeros());
///
/// // Move 1m forward, then turn left: a point 1m ahead lands at (1, 1, 0)
/// let p = a.compose(&b).transform_point(&Vector3::new(1.0, 0.0, 0.0));
/// assert!((p - Vector3::new(1.0, 1.0, 0.0)).norm() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose3D {
    /// Rotation from local frame to parent frame.
    pub rotation: Matrix3<f64>,

    /// Origin of the local frame expressed in the parent frame.
    pub translation: Vector3<f64>,
}

impl Default for Pose3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose3D {
    /// Create a pose from rotation and translation.
    #[inline]
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    #[inline]
    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Pure translation.
    #[inline]
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Matrix3::identity(), Vector3::new(x, y, z))
    }

    /// Rotation from roll/pitch/yaw (radians, applied X then Y then Z).
    pub fn from_rpy(roll: f64, pitch: f64, yaw: f64, translation: Vector3<f64>) -> Self {
        let rotation = Rotation3::from_euler_angles(roll, pitch, yaw).into_inner();
        Self::new(rotation, translation)
    }

    /// Compose two poses: `self ∘ other`.
    ///
    /// If `other` maps B→A and `self` maps A→W, the result maps B→W.
    #[inline]
    pub fn compose(&self, other: &Pose3D) -> Pose3D {
        Pose3D {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Inverse transform.
    #[inline]
    pub fn inverse(&self) -> Pose3D {
        let rt = self.rotation.transpose();
        Pose3D {
            rotation: rt,
            translation: -(rt * self.translation),
        }
    }

    /// Transform a point from the local frame into the parent frame.
    #[inline]
    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }

    /// Transform a point from the parent frame into the local frame.
    #[inline]
    pub fn inverse_transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * (point - self.translation)
    }

    /// Euclidean distance between the two origins.
    #[inline]
    pub fn distance(&self, other: &Pose3D) -> f64 {
        (self.translation - other.translation).norm()
    }

    /// Approximate equality on every matrix and vector entry.
    pub fn approx_eq(&self, other: &Pose3D, epsilon: f64) -> bool {
        (self.rotation - other.rotation).amax() <= epsilon
            && (self.translation - other.translation).amax() <= epsilon
    }
}
