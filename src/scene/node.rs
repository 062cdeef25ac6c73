use std::ops::BitOr;

use nalgebra::Rotation3;

use crate::geometry::{FloatType, WorldMatrix, WorldPoint, WorldVector};

use super::{ObjectIdx, SceneGraph, Transform};

index_vec::define_index_type! {
    pub struct NodeIdx = u32;
}

/// Two independent dirty bits of a transform node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    pub const CLEAN: DirtyFlags = DirtyFlags(0);
    /// The node's own absolute transform is stale.
    pub const OWN: DirtyFlags = DirtyFlags(1);
    /// Something below this node needs updating.
    pub const CHILDREN: DirtyFlags = DirtyFlags(2);

    pub fn contains(self, other: DirtyFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: DirtyFlags) {
        self.0 |= other.0;
    }

    pub fn is_clean(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DirtyFlags {
    type Output = DirtyFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        DirtyFlags(self.0 | rhs.0)
    }
}

/// Element of the scene tree.
///
/// Holds a local transform relative to its parent and the absolute transform
/// computed from it during the last update.
/// Parent, children and attached objects are stored as handles into the owning [`SceneGraph`].
#[derive(Clone, Debug)]
pub struct TransformNode {
    pub(super) name: String,
    pub(super) local: Transform,
    pub(super) absolute: Transform,
    pub(super) dirty: DirtyFlags,
    pub(super) parent: Option<NodeIdx>,
    pub(super) children: Vec<NodeIdx>,
    pub(super) objects: Vec<ObjectIdx>,
}

impl TransformNode {
    pub(super) fn new(name: String) -> TransformNode {
        TransformNode {
            name,
            local: Transform::default(),
            absolute: Transform::default(),
            dirty: DirtyFlags::OWN,
            parent: None,
            children: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local(&self) -> &Transform {
        &self.local
    }

    /// Absolute transform as of the last update of this node.
    pub fn absolute(&self) -> &Transform {
        &self.absolute
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIdx] {
        &self.children
    }

    pub fn objects(&self) -> &[ObjectIdx] {
        &self.objects
    }
}

/// Mutable access to the local transform of a node.
///
/// Every mutation marks the node and its subtree for update, the new values
/// become visible in absolute transforms after [`SceneGraph::update`].
pub struct NodeMut<'a> {
    pub(super) graph: &'a mut SceneGraph,
    pub(super) idx: NodeIdx,
}

impl NodeMut<'_> {
    pub fn idx(&self) -> NodeIdx {
        self.idx
    }

    pub fn local(&self) -> &Transform {
        &self.graph.nodes[self.idx]
            .as_ref()
            .unwrap_or_else(|| unreachable!("NodeMut always points to a live node"))
            .local
    }

    fn modify(&mut self, f: impl FnOnce(&mut Transform)) -> &mut Self {
        let node = self.graph.nodes[self.idx]
            .as_mut()
            .unwrap_or_else(|| unreachable!("NodeMut always points to a live node"));
        f(&mut node.local);
        self.graph.mark_transform_changed(self.idx);
        self
    }

    pub fn set_position(&mut self, position: WorldPoint) -> &mut Self {
        self.modify(|t| t.position = position)
    }

    pub fn translate(&mut self, offset: WorldVector) -> &mut Self {
        self.modify(|t| t.position += offset)
    }

    pub fn set_scale(&mut self, scale: WorldVector) -> &mut Self {
        self.modify(|t| t.scale = scale)
    }

    /// Multiplies the current scale per axis.
    pub fn scale(&mut self, factors: WorldVector) -> &mut Self {
        self.modify(|t| t.scale.component_mul_assign(&factors))
    }

    pub fn set_rotation(&mut self, rotation: WorldMatrix) -> &mut Self {
        self.modify(|t| t.rotation = rotation)
    }

    /// Applies `rotation` after the current rotation, in the node's local frame.
    pub fn rotate(&mut self, rotation: WorldMatrix) -> &mut Self {
        self.modify(|t| t.rotation *= rotation)
    }

    pub fn rotate_x(&mut self, angle: FloatType) -> &mut Self {
        self.rotate(axis_rotation(WorldVector::x_axis(), angle))
    }

    pub fn rotate_y(&mut self, angle: FloatType) -> &mut Self {
        self.rotate(axis_rotation(WorldVector::y_axis(), angle))
    }

    pub fn rotate_z(&mut self, angle: FloatType) -> &mut Self {
        self.rotate(axis_rotation(WorldVector::z_axis(), angle))
    }

    pub fn set_flipped(&mut self, flipped: bool) -> &mut Self {
        self.modify(|t| t.flipped = flipped)
    }

    pub fn flip(&mut self) -> &mut Self {
        self.modify(|t| t.flipped = !t.flipped)
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.modify(|t| t.visible = visible)
    }
}

fn axis_rotation(axis: nalgebra::Unit<WorldVector>, angle: FloatType) -> WorldMatrix {
    Rotation3::from_axis_angle(&axis, angle).into_inner()
}
