use std::sync::{Arc, PoisonError};

use index_vec::IndexVec;
use indexmap::IndexMap;
use thiserror::Error;

use crate::camera::Camera;

use super::{
    Attachable, DirtyFlags, Mesh, NodeIdx, NodeMut, ObjectIdx, Renderable, SceneObject,
    SceneObserver, SharedObserver, SubscriberId, TransformNode, WeakObserver,
};

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeIdx),

    #[error("Unknown object {0:?}")]
    UnknownObject(ObjectIdx),

    #[error("Node {0:?} already has a parent")]
    NodeAlreadyAttached(NodeIdx),

    #[error("Object {object:?} is already attached to node {node:?}")]
    ObjectAlreadyAttached { object: ObjectIdx, node: NodeIdx },

    #[error("The root node cannot be attached or removed")]
    RootNotAttachable,

    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { parent: NodeIdx, child: NodeIdx },

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeIdx, child: NodeIdx },

    #[error("Object {object:?} is not attached to node {node:?}")]
    ObjectNotAttached { object: ObjectIdx, node: NodeIdx },

    #[error("Node {0:?} is still attached to a parent")]
    NodeStillAttached(NodeIdx),
}

/// Tree of transform nodes with objects attached to them.
///
/// The graph owns all nodes and objects, links between them are handles.
/// Nodes reachable from the root are "in the graph", subscribers get notified
/// whenever an object enters or leaves that part of the tree.
///
/// Mutations only mark nodes as dirty, absolute transforms and object caches
/// are recomputed by [`SceneGraph::update`].
pub struct SceneGraph {
    pub(super) nodes: IndexVec<NodeIdx, Option<TransformNode>>,
    objects: IndexVec<ObjectIdx, Option<SceneObject>>,
    root: NodeIdx,

    /// Observers are held weakly, entries of dropped observers are pruned on the next event
    subscribers: IndexMap<SubscriberId, WeakObserver>,
    next_subscriber: SubscriberId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> SceneGraph {
        let mut nodes = IndexVec::new();
        let root = nodes.push(Some(TransformNode::new("root".into())));
        SceneGraph {
            nodes,
            objects: IndexVec::new(),
            root,
            subscribers: IndexMap::new(),
            next_subscriber: SubscriberId::new(0),
        }
    }

    pub fn root(&self) -> NodeIdx {
        self.root
    }

    /// Creates a new node, not attached to anything.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeIdx {
        self.nodes.push(Some(TransformNode::new(name.into())))
    }

    /// Destroys a node without a parent.
    /// Its children become detached roots of their own subtrees and its objects get detached.
    pub fn remove_node(&mut self, idx: NodeIdx) -> Result<(), SceneError> {
        if idx == self.root {
            return Err(SceneError::RootNotAttachable);
        }
        if self.node(idx)?.parent.is_some() {
            return Err(SceneError::NodeStillAttached(idx));
        }

        let node = self.nodes[idx]
            .take()
            .unwrap_or_else(|| unreachable!("Checked above"));
        for child in node.children {
            self.node_entry_mut(child).parent = None;
            self.mark_own_down(child);
        }
        for object in node.objects {
            self.object_entry_mut(object).on_detached();
        }

        log::debug!("Removed node {idx:?} ({})", node.name);
        Ok(())
    }

    pub fn node(&self, idx: NodeIdx) -> Result<&TransformNode, SceneError> {
        self.nodes
            .get(idx)
            .and_then(Option::as_ref)
            .ok_or(SceneError::UnknownNode(idx))
    }

    /// Returns a handle for changing the local transform of the node.
    pub fn node_mut(&mut self, idx: NodeIdx) -> Result<NodeMut<'_>, SceneError> {
        self.node(idx)?;
        Ok(NodeMut { graph: self, idx })
    }

    /// Iterates over all live nodes, attached or not.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIdx, &TransformNode)> {
        self.nodes
            .iter_enumerated()
            .filter_map(|(idx, node)| Some((idx, node.as_ref()?)))
    }

    /// Adds an object to the graph storage, not attached to any node.
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> ObjectIdx {
        self.objects.push(Some(object.into()))
    }

    /// Removes an object from the graph storage, detaching it first if necessary.
    pub fn remove_object(&mut self, idx: ObjectIdx) -> Result<SceneObject, SceneError> {
        if let Some(node) = self.object(idx)?.node() {
            self.detach_object(node, idx)?;
        }
        self.objects[idx].take().ok_or(SceneError::UnknownObject(idx))
    }

    pub fn object(&self, idx: ObjectIdx) -> Result<&SceneObject, SceneError> {
        self.objects
            .get(idx)
            .and_then(Option::as_ref)
            .ok_or(SceneError::UnknownObject(idx))
    }

    /// Mutable access to an object.
    /// Changing which node the object is attached to has to go through the graph.
    pub fn object_mut(&mut self, idx: ObjectIdx) -> Result<&mut SceneObject, SceneError> {
        self.objects
            .get_mut(idx)
            .and_then(Option::as_mut)
            .ok_or(SceneError::UnknownObject(idx))
    }

    pub fn camera(&self, idx: ObjectIdx) -> Option<&Camera> {
        self.object(idx).ok()?.as_camera()
    }

    pub fn mesh(&self, idx: ObjectIdx) -> Option<&Mesh> {
        self.object(idx).ok()?.as_mesh()
    }

    pub fn renderable(&self, idx: ObjectIdx) -> Option<&dyn Renderable> {
        self.object(idx).ok()?.as_renderable()
    }

    /// Returns true if the node is reachable from the root.
    pub fn is_in_graph(&self, idx: NodeIdx) -> bool {
        let mut current = Some(idx);
        while let Some(n) = current {
            if n == self.root {
                return true;
            }
            current = self.nodes.get(n).and_then(Option::as_ref).and_then(|node| node.parent);
        }
        false
    }

    pub fn attach_node(&mut self, parent: NodeIdx, child: NodeIdx) -> Result<(), SceneError> {
        self.node(parent)?;
        if self.node(child)?.parent.is_some() {
            return Err(SceneError::NodeAlreadyAttached(child));
        }
        if child == self.root {
            return Err(SceneError::RootNotAttachable);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }

        self.node_entry_mut(child).parent = Some(parent);
        self.node_entry_mut(parent).children.push(child);
        self.mark_own_down(child);
        self.mark_children_up(parent);

        log::debug!("Attached node {child:?} to {parent:?}");

        if self.is_in_graph(parent) {
            for (object, renderable) in self.subtree_objects(child) {
                self.notify(|observer| observer.object_added(object, renderable));
            }
        }
        Ok(())
    }

    pub fn detach_node(&mut self, parent: NodeIdx, child: NodeIdx) -> Result<(), SceneError> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild { parent, child });
        }

        if self.is_in_graph(parent) {
            for (object, renderable) in self.subtree_objects(child) {
                self.notify(|observer| observer.object_removed(object, renderable));
            }
        }

        self.node_entry_mut(parent).children.retain(|c| *c != child);
        self.node_entry_mut(child).parent = None;
        self.mark_own_down(child);
        self.mark_children_up(parent);

        log::debug!("Detached node {child:?} from {parent:?}");
        Ok(())
    }

    pub fn attach_object(&mut self, node: NodeIdx, object: ObjectIdx) -> Result<(), SceneError> {
        let transform = *self.node(node)?.absolute();
        let entry = self.object_mut(object)?;
        if let Some(attached_to) = entry.node() {
            return Err(SceneError::ObjectAlreadyAttached {
                object,
                node: attached_to,
            });
        }

        entry.on_attached(node, &transform);
        let renderable = entry.is_renderable();
        self.node_entry_mut(node).objects.push(object);
        self.mark_children_up(node);

        log::debug!("Attached object {object:?} to node {node:?}");

        if self.is_in_graph(node) {
            self.notify(|observer| observer.object_added(object, renderable));
        }
        Ok(())
    }

    pub fn detach_object(&mut self, node: NodeIdx, object: ObjectIdx) -> Result<(), SceneError> {
        self.object(object)?;
        if !self.node(node)?.objects.contains(&object) {
            return Err(SceneError::ObjectNotAttached { object, node });
        }

        let entry = self.object_entry_mut(object);
        entry.on_detached();
        let renderable = entry.is_renderable();
        self.node_entry_mut(node).objects.retain(|o| *o != object);
        self.mark_children_up(node);

        log::debug!("Detached object {object:?} from node {node:?}");

        if self.is_in_graph(node) {
            self.notify(|observer| observer.object_removed(object, renderable));
        }
        Ok(())
    }

    /// Recomputes absolute transforms of all dirty nodes in the graph
    /// and notifies their objects.
    pub fn update(&mut self) {
        self.update_subtree(self.root, false);
    }

    /// Updates a single subtree, which doesn't have to be in the graph.
    ///
    /// The parent's absolute transform is used as is, even if it is stale.
    pub fn update_node(&mut self, idx: NodeIdx) -> Result<(), SceneError> {
        self.node(idx)?;
        self.update_subtree(idx, false);
        Ok(())
    }

    /// Registers an observer.
    /// The observer immediately receives `object_added` for every object already in the graph.
    ///
    /// The graph only keeps a weak reference, the subscription ends when the caller
    /// drops its last `Arc` of the observer.
    pub fn subscribe(&mut self, observer: SharedObserver) -> SubscriberId {
        {
            let mut locked = observer.lock().unwrap_or_else(PoisonError::into_inner);
            for (object, renderable) in self.subtree_objects(self.root) {
                locked.object_added(object, renderable);
            }
        }

        let id = self.next_subscriber;
        self.next_subscriber = SubscriberId::new(id.index() + 1);
        self.subscribers.insert(id, Arc::downgrade(&observer));
        id
    }

    /// Removes an observer, returns it if it was subscribed and is still alive.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> Option<SharedObserver> {
        self.subscribers.shift_remove(&id)?.upgrade()
    }

    /// Number of subscribed observers that are still alive.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .values()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    fn update_subtree(&mut self, idx: NodeIdx, parent_changed: bool) {
        let parent_absolute = self
            .node_entry(idx)
            .parent
            .map(|parent| *self.node_entry(parent).absolute());

        let node = self.node_entry_mut(idx);
        let mut dirty = node.dirty;
        if parent_changed {
            dirty.insert(DirtyFlags::OWN);
        }
        if dirty.is_clean() {
            return;
        }

        let own_changed = dirty.contains(DirtyFlags::OWN);
        if own_changed {
            node.absolute = match parent_absolute {
                Some(parent_absolute) => parent_absolute.compose(&node.local),
                None => node.local,
            };
        }
        node.dirty = DirtyFlags::CLEAN;
        let absolute = node.absolute;
        let objects = std::mem::take(&mut node.objects);
        let children = std::mem::take(&mut node.children);

        for object in &objects {
            self.object_entry_mut(*object).on_node_updated(&absolute);
        }
        for child in &children {
            self.update_subtree(*child, own_changed);
        }

        let node = self.node_entry_mut(idx);
        node.objects = objects;
        node.children = children;
    }

    /// Marks the node after a change of its local transform.
    pub(super) fn mark_transform_changed(&mut self, idx: NodeIdx) {
        self.mark_own_down(idx);
        self.mark_children_up(idx);
    }

    /// Sets `OWN` on the node and its subtree, stops at nodes that are already marked.
    fn mark_own_down(&mut self, idx: NodeIdx) {
        let mut stack = vec![idx];
        while let Some(n) = stack.pop() {
            let node = self.node_entry_mut(n);
            if node.dirty.contains(DirtyFlags::OWN) {
                continue;
            }
            node.dirty.insert(DirtyFlags::OWN);
            stack.extend(node.children.iter().copied());
        }
    }

    /// Sets `CHILDREN` on the node and its ancestors, stops at nodes that are already marked.
    fn mark_children_up(&mut self, idx: NodeIdx) {
        let mut current = Some(idx);
        while let Some(n) = current {
            let node = self.node_entry_mut(n);
            if node.dirty.contains(DirtyFlags::CHILDREN) {
                break;
            }
            node.dirty.insert(DirtyFlags::CHILDREN);
            current = node.parent;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeIdx, idx: NodeIdx) -> bool {
        let mut current = Some(idx);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.node_entry(n).parent;
        }
        false
    }

    /// Objects attached anywhere in the subtree, in depth first pre-order.
    fn subtree_objects(&self, idx: NodeIdx) -> Vec<(ObjectIdx, bool)> {
        let mut result = Vec::new();
        let mut stack = vec![idx];
        while let Some(n) = stack.pop() {
            let node = self.node_entry(n);
            result.extend(
                node.objects
                    .iter()
                    .map(|object| (*object, self.object_entry(*object).is_renderable())),
            );
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    fn notify(&mut self, mut f: impl FnMut(&mut dyn SceneObserver)) {
        self.subscribers.retain(|id, observer| {
            let Some(observer) = observer.upgrade() else {
                log::debug!("Subscriber {id:?} was dropped, removing it");
                return false;
            };
            let mut locked = observer.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *locked);
            true
        });
    }

    fn node_entry(&self, idx: NodeIdx) -> &TransformNode {
        self.nodes[idx]
            .as_ref()
            .unwrap_or_else(|| unreachable!("Links always point to live nodes"))
    }

    fn node_entry_mut(&mut self, idx: NodeIdx) -> &mut TransformNode {
        self.nodes[idx]
            .as_mut()
            .unwrap_or_else(|| unreachable!("Links always point to live nodes"))
    }

    fn object_entry(&self, idx: ObjectIdx) -> &SceneObject {
        self.objects[idx]
            .as_ref()
            .unwrap_or_else(|| unreachable!("Links always point to live objects"))
    }

    fn object_entry_mut(&mut self, idx: ObjectIdx) -> &mut SceneObject {
        self.objects[idx]
            .as_mut()
            .unwrap_or_else(|| unreachable!("Links always point to live objects"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::geometry::{WorldPoint, WorldVector};
    use crate::scene::observer::test::{Event, Recorder};
    use assert2::{assert, let_assert};

    fn camera() -> Camera {
        Camera::builder()
            .viewport_width(2.0)
            .viewport_height(2.0)
            .build()
    }

    fn absolute_position(graph: &SceneGraph, idx: NodeIdx) -> WorldPoint {
        graph.node(idx).unwrap().absolute().position
    }

    fn recorder(graph: &mut SceneGraph) -> (Arc<Mutex<Recorder>>, SubscriberId) {
        let recorder = Arc::new(Mutex::new(Recorder::default()));
        let id = graph.subscribe(recorder.clone());
        (recorder, id)
    }

    fn events(recorder: &Arc<Mutex<Recorder>>) -> Vec<Event> {
        std::mem::take(&mut recorder.lock().unwrap().events)
    }

    #[test]
    fn absolute_follows_ancestor_chain() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let c = graph.create_node("c");
        graph.attach_node(graph.root(), a).unwrap();
        graph.attach_node(a, b).unwrap();
        graph.node_mut(a).unwrap().set_position(WorldPoint::new(1.0, 0.0, 0.0));
        graph.node_mut(b).unwrap().set_position(WorldPoint::new(0.0, 2.0, 0.0));
        graph.node_mut(c).unwrap().set_position(WorldPoint::new(0.0, 0.0, 3.0));
        graph.attach_node(b, c).unwrap();

        graph.update();
        assert!(absolute_position(&graph, c) == WorldPoint::new(1.0, 2.0, 3.0));

        // Move c directly under a
        graph.detach_node(b, c).unwrap();
        graph.attach_node(a, c).unwrap();
        graph.update();
        assert!(absolute_position(&graph, c) == WorldPoint::new(1.0, 0.0, 3.0));
    }

    #[test]
    fn changes_wait_for_update() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("parent");
        let child = graph.create_node("child");
        let grandchild = graph.create_node("grandchild");
        graph.attach_node(graph.root(), parent).unwrap();
        graph.attach_node(parent, child).unwrap();
        graph.attach_node(child, grandchild).unwrap();
        graph.node_mut(grandchild).unwrap().set_position(WorldPoint::new(0.0, 1.0, 0.0));
        graph.update();

        graph
            .node_mut(parent)
            .unwrap()
            .translate(WorldVector::new(5.0, 0.0, 0.0))
            .set_scale(WorldVector::new(2.0, 2.0, 2.0))
            .set_visible(false);

        assert!(absolute_position(&graph, grandchild) == WorldPoint::new(0.0, 1.0, 0.0));
        assert!(graph.node(grandchild).unwrap().absolute().visible);

        graph.update();
        let absolute = graph.node(grandchild).unwrap().absolute();
        assert!(absolute.position == WorldPoint::new(5.0, 1.0, 0.0));
        assert!(absolute.scale == WorldVector::new(2.0, 2.0, 2.0));
        assert!(!absolute.visible);
    }

    #[test]
    fn rotated_parent_rotates_child_offset() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("parent");
        let child = graph.create_node("child");
        graph.attach_node(graph.root(), parent).unwrap();
        graph.attach_node(parent, child).unwrap();
        graph.node_mut(parent).unwrap().rotate_z(std::f32::consts::FRAC_PI_2);
        graph.node_mut(child).unwrap().set_position(WorldPoint::new(1.0, 0.0, 0.0));
        graph.update();

        let position = absolute_position(&graph, child);
        assert!((position - WorldPoint::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn flip_is_chained() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("parent");
        let child = graph.create_node("child");
        graph.attach_node(graph.root(), parent).unwrap();
        graph.attach_node(parent, child).unwrap();
        graph.node_mut(parent).unwrap().flip();
        graph.update();
        assert!(graph.node(child).unwrap().absolute().flipped);

        graph.node_mut(child).unwrap().set_flipped(true);
        graph.update();
        assert!(!graph.node(child).unwrap().absolute().flipped);
    }

    #[test]
    fn dirty_flags_propagation() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.attach_node(root, a).unwrap();
        graph.attach_node(a, b).unwrap();
        graph.update();
        for idx in [root, a, b] {
            assert!(graph.node(idx).unwrap().dirty().is_clean());
        }

        graph.node_mut(a).unwrap().rotate_x(0.5);
        assert!(graph.node(root).unwrap().dirty() == DirtyFlags::CHILDREN);
        assert!(graph.node(a).unwrap().dirty() == DirtyFlags::OWN | DirtyFlags::CHILDREN);
        assert!(graph.node(b).unwrap().dirty() == DirtyFlags::OWN);

        graph.update();
        for idx in [root, a, b] {
            assert!(graph.node(idx).unwrap().dirty().is_clean());
        }

        let object = graph.add_object(camera());
        graph.attach_object(b, object).unwrap();
        for idx in [root, a, b] {
            assert!(graph.node(idx).unwrap().dirty() == DirtyFlags::CHILDREN);
        }
    }

    #[test]
    fn partial_update_of_subtree() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.attach_node(a, b).unwrap();
        graph.node_mut(a).unwrap().set_position(WorldPoint::new(1.0, 0.0, 0.0));

        graph.update_node(b).unwrap();
        graph.update_node(a).unwrap();
        assert!(absolute_position(&graph, b) == WorldPoint::new(1.0, 0.0, 0.0));

        // a is not in the graph, the root update doesn't touch it
        graph.node_mut(a).unwrap().set_position(WorldPoint::new(2.0, 0.0, 0.0));
        graph.update();
        assert!(absolute_position(&graph, b) == WorldPoint::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn objects_follow_updates() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("camera");
        graph.attach_node(graph.root(), node).unwrap();
        let camera = graph.add_object(camera());
        graph.attach_object(node, camera).unwrap();
        graph.node_mut(node).unwrap().set_position(WorldPoint::new(0.0, 0.0, -4.0));

        assert!(graph.camera(camera).unwrap().origin() == WorldPoint::origin());
        graph.update();
        assert!(graph.camera(camera).unwrap().origin() == WorldPoint::new(0.0, 0.0, -4.0));
    }

    #[test]
    fn double_attach_node() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.attach_node(graph.root(), a).unwrap();
        graph.attach_node(graph.root(), b).unwrap();

        assert!(graph.attach_node(b, a) == Err(SceneError::NodeAlreadyAttached(a)));
        assert!(graph.node(a).unwrap().parent() == Some(graph.root()));
        assert!(graph.node(b).unwrap().children().is_empty());
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.attach_node(a, b).unwrap();

        assert!(graph.attach_node(b, a) == Err(SceneError::WouldCreateCycle { parent: b, child: a }));
        assert!(graph.attach_node(a, a) == Err(SceneError::WouldCreateCycle { parent: a, child: a }));
        assert!(graph.node(a).unwrap().parent().is_none());
    }

    #[test]
    fn root_is_special() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let root = graph.root();
        assert!(graph.attach_node(a, root) == Err(SceneError::RootNotAttachable));
        assert!(graph.remove_node(root) == Err(SceneError::RootNotAttachable));
        assert!(graph.node(root).unwrap().name() == "root");
    }

    #[test]
    fn detach_requires_link() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        assert!(graph.detach_node(a, b) == Err(SceneError::NotAChild { parent: a, child: b }));

        let object = graph.add_object(camera());
        assert!(
            graph.detach_object(a, object) == Err(SceneError::ObjectNotAttached { object, node: a })
        );
    }

    #[test]
    fn double_attach_object() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let object = graph.add_object(Mesh::cube(1.0));
        graph.attach_object(a, object).unwrap();

        assert!(
            graph.attach_object(b, object)
                == Err(SceneError::ObjectAlreadyAttached { object, node: a })
        );
        assert!(graph.node(b).unwrap().objects().is_empty());
        assert!(graph.object(object).unwrap().node() == Some(a));
    }

    #[test]
    fn stale_handles() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        graph.remove_node(a).unwrap();
        assert!(graph.node(a).err() == Some(SceneError::UnknownNode(a)));
        assert!(graph.attach_node(graph.root(), a) == Err(SceneError::UnknownNode(a)));

        let object = graph.add_object(camera());
        graph.remove_object(object).unwrap();
        assert!(graph.object(object).err() == Some(SceneError::UnknownObject(object)));
        assert!(graph.camera(object).is_none());
    }

    #[test]
    fn remove_node_orphans_children() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.attach_node(graph.root(), a).unwrap();
        graph.attach_node(a, b).unwrap();
        let object = graph.add_object(camera());
        graph.attach_object(a, object).unwrap();

        assert!(graph.remove_node(a) == Err(SceneError::NodeStillAttached(a)));
        graph.detach_node(graph.root(), a).unwrap();
        graph.remove_node(a).unwrap();

        assert!(graph.node(b).unwrap().parent().is_none());
        assert!(graph.object(object).unwrap().node().is_none());
        assert!(graph.nodes().count() == 2);
    }

    #[test]
    fn events_in_call_order() {
        let mut graph = SceneGraph::new();
        let (recorder, _) = recorder(&mut graph);

        let node = graph.create_node("node");
        let camera = graph.add_object(camera());
        let mesh = graph.add_object(Mesh::cube(1.0));

        // Not in the graph yet
        graph.attach_object(node, mesh).unwrap();
        assert!(events(&recorder).is_empty());

        graph.attach_node(graph.root(), node).unwrap();
        graph.attach_object(node, camera).unwrap();
        assert!(events(&recorder) == vec![Event::Added(mesh, true), Event::Added(camera, false)]);

        graph.detach_object(node, mesh).unwrap();
        graph.detach_node(graph.root(), node).unwrap();
        assert!(
            events(&recorder) == vec![Event::Removed(mesh, true), Event::Removed(camera, false)]
        );
    }

    #[test]
    fn subtree_events_in_pre_order() {
        let mut graph = SceneGraph::new();
        let (recorder, _) = recorder(&mut graph);

        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let c = graph.create_node("c");
        graph.attach_node(a, b).unwrap();
        graph.attach_node(a, c).unwrap();
        let objects: Vec<_> = (0..3).map(|_| graph.add_object(Mesh::cube(1.0))).collect();
        graph.attach_object(c, objects[2]).unwrap();
        graph.attach_object(b, objects[1]).unwrap();
        graph.attach_object(a, objects[0]).unwrap();

        graph.attach_node(graph.root(), a).unwrap();
        let expected: Vec<_> = objects.iter().map(|o| Event::Added(*o, true)).collect();
        assert!(events(&recorder) == expected);
    }

    #[test]
    fn subscribe_replays_and_unsubscribe_stops() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("node");
        graph.attach_node(graph.root(), node).unwrap();
        let mesh = graph.add_object(Mesh::cube(1.0));
        graph.attach_object(node, mesh).unwrap();

        let (recorder, id) = recorder(&mut graph);
        assert!(events(&recorder) == vec![Event::Added(mesh, true)]);

        assert!(graph.unsubscribe(id).is_some());
        assert!(graph.unsubscribe(id).is_none());
        graph.detach_object(node, mesh).unwrap();
        assert!(events(&recorder).is_empty());
    }

    #[test]
    fn dropped_observers_are_pruned() {
        let mut graph = SceneGraph::new();
        let (kept, _) = recorder(&mut graph);
        for _ in 0..3 {
            let (dropped, _) = recorder(&mut graph);
            drop(dropped);
        }
        assert!(graph.subscriber_count() == 1);
        assert!(graph.subscribers.len() == 4);

        let mesh = graph.add_object(Mesh::cube(1.0));
        graph.attach_object(graph.root(), mesh).unwrap();
        assert!(graph.subscribers.len() == 1);
        assert!(events(&kept) == vec![Event::Added(mesh, true)]);
    }

    #[test]
    fn unsubscribe_after_drop() {
        let mut graph = SceneGraph::new();
        let (recorder, id) = recorder(&mut graph);
        drop(recorder);
        assert!(graph.unsubscribe(id).is_none());
        assert!(graph.subscriber_count() == 0);
    }

    #[test]
    fn remove_attached_object() {
        let mut graph = SceneGraph::new();
        let (recorder, _) = recorder(&mut graph);
        let mesh = graph.add_object(Mesh::cube(1.0));
        graph.attach_object(graph.root(), mesh).unwrap();
        events(&recorder);

        let_assert!(Ok(SceneObject::Mesh(_)) = graph.remove_object(mesh));
        assert!(events(&recorder) == vec![Event::Removed(mesh, true)]);
        assert!(graph.node(graph.root()).unwrap().objects().is_empty());
    }
}
