use crate::camera::Camera;
use crate::geometry::{FloatType, HitRecord, Ray, Triangle, WorldPoint};

use super::{Mesh, NodeIdx, Transform};

index_vec::define_index_type! {
    pub struct ObjectIdx = u32;
}

/// Object that can be attached to a transform node.
pub trait Attachable {
    /// Node this object is currently attached to.
    fn node(&self) -> Option<NodeIdx>;

    /// Called when the object gets attached, with the node's current absolute transform.
    fn on_attached(&mut self, node: NodeIdx, transform: &Transform);

    fn on_detached(&mut self);

    /// Called from the update pass after the node's absolute transform was recomputed.
    fn on_node_updated(&mut self, transform: &Transform);
}

/// Object that rays can hit.
pub trait Renderable {
    /// Nearest hit of the ray that is at least `min_distance` along it.
    fn intersect(&self, ray: &Ray, min_distance: FloatType) -> Option<HitRecord>;

    /// World space triangles of the object, as of the last update.
    fn primitives(&self) -> &[Triangle<WorldPoint>];
}

/// Everything that can live in the scene graph.
/// Whether an object is renderable is decided by its variant.
#[derive(Clone, Debug)]
pub enum SceneObject {
    Camera(Camera),
    Mesh(Mesh),
}

impl SceneObject {
    pub fn is_renderable(&self) -> bool {
        self.as_renderable().is_some()
    }

    pub fn as_renderable(&self) -> Option<&dyn Renderable> {
        match self {
            SceneObject::Camera(_) => None,
            SceneObject::Mesh(mesh) => Some(mesh),
        }
    }

    pub fn as_camera(&self) -> Option<&Camera> {
        match self {
            SceneObject::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match self {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    fn as_attachable(&self) -> &dyn Attachable {
        match self {
            SceneObject::Camera(camera) => camera,
            SceneObject::Mesh(mesh) => mesh,
        }
    }

    fn as_attachable_mut(&mut self) -> &mut dyn Attachable {
        match self {
            SceneObject::Camera(camera) => camera,
            SceneObject::Mesh(mesh) => mesh,
        }
    }
}

impl Attachable for SceneObject {
    fn node(&self) -> Option<NodeIdx> {
        self.as_attachable().node()
    }

    fn on_attached(&mut self, node: NodeIdx, transform: &Transform) {
        self.as_attachable_mut().on_attached(node, transform)
    }

    fn on_detached(&mut self) {
        self.as_attachable_mut().on_detached()
    }

    fn on_node_updated(&mut self, transform: &Transform) {
        self.as_attachable_mut().on_node_updated(transform)
    }
}

impl From<Camera> for SceneObject {
    fn from(value: Camera) -> Self {
        SceneObject::Camera(value)
    }
}

impl From<Mesh> for SceneObject {
    fn from(value: Mesh) -> Self {
        SceneObject::Mesh(value)
    }
}
