use crate::geometry::{WorldMatrix, WorldPoint, WorldVector};

/// Position, scale, rotation, flip and visibility of a node.
///
/// Used both for the local transform (relative to the parent node)
/// and for the cached absolute transform (relative to the world).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: WorldPoint,
    /// Per axis scale factors
    pub scale: WorldVector,
    pub rotation: WorldMatrix,
    pub flipped: bool,
    pub visible: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: WorldPoint::origin(),
            scale: WorldVector::repeat(1.0),
            rotation: WorldMatrix::identity(),
            flipped: false,
            visible: true,
        }
    }
}

impl Transform {
    /// Absolute transform of a child whose parent has `self` as its absolute transform.
    ///
    /// The child's position offset is rotated into the parent's frame, scale is combined
    /// per axis, flip is XOR and visibility is AND of the two.
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * local.position.coords,
            scale: self.scale.component_mul(&local.scale),
            rotation: self.rotation * local.rotation,
            flipped: self.flipped != local.flipped,
            visible: self.visible && local.visible,
        }
    }
}
