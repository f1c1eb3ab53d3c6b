//! Sensor observation types.

use nalgebra::Vector3;

/// A point cloud observation expressed in the sensor frame.
///
/// Colours are optional; when present there is exactly one per point.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    /// Points in the sensor frame (meters).
    pub points: Vec<Vector3<f64>>,

    /// Optional per-point RGB colour.
    pub colors: Option<Vec<[u8; 3]>>,
}

impl PointCloud {
    /// Create an uncoloured point cloud.
    pub fn new(points: Vec<Vector3<f64>>) -> Self {
        Self {
            points,
            colors: None,
        }
    }

    /// Create a coloured point cloud.
    pub fn with_colors(points: Vec<Vector3<f64>>, colors: Vec<[u8; 3]>) -> Self {
        Self {
            points,
            colors: Some(colors),
        }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the cloud holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if colours are present and match the point count.
    pub fn colors_consistent(&self) -> bool {
        self.colors
            .as_ref()
            .is_none_or(|colors| colors.len() == self.points.len())
    }

    /// Colour of the i-th point, if the cloud is coloured.
    #[inline]
    pub fn color(&self, i: usize) -> Option<[u8; 3]> {
        self.colors.as_ref().and_then(|c| c.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_consistency() {
        let cloud = PointCloud::new(vec![Vector3::zeros(); 3]);
        assert!(cloud.colors_consistent());
        assert_eq!(cloud.color(0), None);

        let cloud = PointCloud::with_colors(vec![Vector3::zeros(); 2], vec![[1, 2, 3]]);
        assert!(!cloud.colors_consistent());

        let cloud = PointCloud::with_colors(vec![Vector3::zeros()], vec![[9, 8, 7]]);
        assert!(cloud.colors_consistent());
        assert_eq!(cloud.color(0), Some([9, 8, 7]));
    }
}
