use std::sync::{Arc, Mutex, Weak};

use super::ObjectIdx;

index_vec::define_index_type! {
    pub struct SubscriberId = u32;
}

/// Receives notifications about objects entering and leaving the scene graph.
///
/// Events are delivered synchronously from inside the attach / detach call that caused them,
/// in the order of the calls.
pub trait SceneObserver: Send {
    fn object_added(&mut self, object: ObjectIdx, renderable: bool);
    fn object_removed(&mut self, object: ObjectIdx, renderable: bool);
}

pub type SharedObserver = Arc<Mutex<dyn SceneObserver>>;
pub(crate) type WeakObserver = Weak<Mutex<dyn SceneObserver>>;
