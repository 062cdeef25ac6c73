use crate::geometry::{Triangle, WorldMatrix, WorldPoint, WorldVector};

use super::Transform;

/// Affine map from object local coordinates to world coordinates.
/// Scales first, then rotates, then translates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexMapper {
    linear: WorldMatrix,
    translation: WorldVector,
}

impl Default for VertexMapper {
    fn default() -> Self {
        VertexMapper {
            linear: WorldMatrix::identity(),
            translation: WorldVector::zeros(),
        }
    }
}

impl VertexMapper {
    pub fn new(transform: &Transform) -> VertexMapper {
        VertexMapper {
            linear: transform.rotation * WorldMatrix::from_diagonal(&transform.scale),
            translation: transform.position.coords,
        }
    }

    pub fn map(&self, point: &WorldPoint) -> WorldPoint {
        WorldPoint::from(self.linear * point.coords + self.translation)
    }

    pub fn map_triangle(&self, triangle: &Triangle<WorldPoint>) -> Triangle<WorldPoint> {
        triangle.map(|p| self.map(p))
    }
}
