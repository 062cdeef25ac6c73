mod graph;
mod mesh;
mod node;
mod object;
pub(crate) mod observer;
mod transform;
mod vertex_mapper;

pub use graph::{SceneError, SceneGraph};
pub use mesh::Mesh;
pub use node::{DirtyFlags, NodeIdx, NodeMut, TransformNode};
pub use object::{Attachable, ObjectIdx, Renderable, SceneObject};
pub use observer::{SceneObserver, SharedObserver, SubscriberId};
pub(crate) use observer::WeakObserver;
pub use transform::Transform;
pub use vertex_mapper::VertexMapper;
