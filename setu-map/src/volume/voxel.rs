//! Integer voxel addressing and ray stepping.
//!
//! Rays are traced by continuous stepping at half-voxel increments, keeping
//! each visited voxel once:
//!
//! ```text
//! origin ●──●──●──●──●──● end
//!        [v0 ][ v1 ][ v2]      end voxel reported separately
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Integer voxel index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoxelKey {
    /// X index
    pub x: i32,
    /// Y index
    pub y: i32,
    /// Z index
    pub z: i32,
}

impl VoxelKey {
    /// Create a key from indices.
    #[inline]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Voxel containing a point.
    #[inline]
    pub fn from_point(point: &Vector3<f64>, voxel_scale: f64) -> Self {
        Self {
            x: (point.x / voxel_scale).floor() as i32,
            y: (point.y / voxel_scale).floor() as i32,
            z: (point.z / voxel_scale).floor() as i32,
        }
    }

    /// Centre of the voxel.
    #[inline]
    pub fn center(&self, voxel_scale: f64) -> Vector3<f64> {
        Vector3::new(
            (self.x as f64 + 0.5) * voxel_scale,
            (self.y as f64 + 0.5) * voxel_scale,
            (self.z as f64 + 0.5) * voxel_scale,
        )
    }
}

/// Voxels crossed by the segment `origin → end`, excluding the end voxel.
pub fn keys_along_ray(origin: &Vector3<f64>, end: &Vector3<f64>, voxel_scale: f64) -> Vec<VoxelKey> {
    let end_key = VoxelKey::from_point(end, voxel_scale);
    let delta = end - origin;
    let length = delta.norm();
    if length <= f64::EPSILON {
        return Vec::new();
    }

    let step = voxel_scale * 0.5;
    let steps = (length / step).ceil() as usize;
    let mut keys: Vec<VoxelKey> = Vec::with_capacity(steps);

    for i in 0..steps {
        let t = (i as f64 * step) / length;
        let key = VoxelKey::from_point(&(origin + delta * t), voxel_scale);
        if key == end_key {
            continue;
        }
        if keys.last() != Some(&key) {
            keys.push(key);
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_point() {
        let key = VoxelKey::from_point(&Vector3::new(0.12, -0.01, 0.0), 0.05);
        assert_eq!(key, VoxelKey::new(2, -1, 0));
    }

    #[test]
    fn test_center_inside_voxel() {
        let key = VoxelKey::new(3, -2, 1);
        let center = key.center(0.1);
        assert_eq!(VoxelKey::from_point(&center, 0.1), key);
    }

    #[test]
    fn test_ray_excludes_end() {
        let origin = Vector3::new(0.01, 0.01, 0.01);
        let end = Vector3::new(1.01, 0.01, 0.01);
        let keys = keys_along_ray(&origin, &end, 0.1);

        assert_eq!(keys.first(), Some(&VoxelKey::new(0, 0, 0)));
        assert!(!keys.contains(&VoxelKey::from_point(&end, 0.1)));
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn test_zero_length_ray() {
        let p = Vector3::new(1.0, 1.0, 1.0);
        assert!(keys_along_ray(&p, &p, 0.1).is_empty());
    }
}
