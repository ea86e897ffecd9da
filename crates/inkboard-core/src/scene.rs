//! Scene model: the ordered object list of one page.

use crate::geometry::union_bounds;
use crate::shapes::{Object, ObjectId};
use kurbo::Rect;
use std::collections::HashMap;

/// The live objects of a page, keyed by id, with an explicit z-order.
///
/// All mutation goes through here; index 0 of the z-order paints first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    objects: HashMap<ObjectId, Object>,
    z_order: Vec<ObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from objects listed back to front.
    pub fn from_objects(objects: Vec<Object>) -> Self {
        let mut scene = Self::new();
        scene.replace_all(objects);
        scene
    }

    /// Add an object on top.
    pub fn append(&mut self, object: Object) {
        let id = object.id();
        if self.objects.insert(id, object).is_some() {
            self.z_order.retain(|&z| z != id);
        }
        self.z_order.push(id);
    }

    /// Insert an object at a z-position (clamped to the list length).
    pub fn insert_at(&mut self, index: usize, object: Object) {
        let id = object.id();
        if self.objects.insert(id, object).is_some() {
            self.z_order.retain(|&z| z != id);
        }
        let index = index.min(self.z_order.len());
        self.z_order.insert(index, id);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        let removed = self.objects.remove(&id)?;
        self.z_order.retain(|&z| z != id);
        Some(removed)
    }

    /// Remove every object matching `predicate`, returned back to front.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Object) -> bool) -> Vec<Object> {
        let doomed: Vec<ObjectId> = self
            .ordered()
            .filter(|o| predicate(o))
            .map(Object::id)
            .collect();
        doomed.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    pub fn find(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    /// Swap in a new value for an existing object (same id). Returns false
    /// if the id is not in the scene.
    pub fn replace(&mut self, object: Object) -> bool {
        match self.objects.get_mut(&object.id()) {
            Some(slot) => {
                *slot = object;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    /// Position in the z-order (0 = bottom).
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.z_order.iter().position(|&z| z == id)
    }

    /// Ids back to front.
    pub fn z_order(&self) -> &[ObjectId] {
        &self.z_order
    }

    /// Objects back to front.
    pub fn ordered(&self) -> impl DoubleEndedIterator<Item = &Object> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Deep copy of every object, back to front.
    pub fn clone_all(&self) -> Vec<Object> {
        self.ordered().cloned().collect()
    }

    /// Replace the whole object list (back to front).
    pub fn replace_all(&mut self, objects: Vec<Object>) {
        self.objects.clear();
        self.z_order.clear();
        for object in objects {
            self.append(object);
        }
    }

    /// Combined on-screen bounds of everything in the scene.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(self.ordered())
    }

    /// Move the given objects to the top, keeping their relative order.
    /// Returns true if the order changed.
    pub fn bring_to_front(&mut self, ids: &[ObjectId]) -> bool {
        let before = self.z_order.clone();
        let (moved, rest): (Vec<ObjectId>, Vec<ObjectId>) =
            self.z_order.iter().copied().partition(|id| ids.contains(id));
        self.z_order = rest;
        self.z_order.extend(moved);
        self.z_order != before
    }

    /// Move the given objects to the bottom, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ObjectId]) -> bool {
        let before = self.z_order.clone();
        let (mut moved, rest): (Vec<ObjectId>, Vec<ObjectId>) =
            self.z_order.iter().copied().partition(|id| ids.contains(id));
        moved.extend(rest);
        self.z_order = moved;
        self.z_order != before
    }

    /// Move each given object one step up, past the next unselected object.
    pub fn bring_forward(&mut self, ids: &[ObjectId]) -> bool {
        let mut changed = false;
        for i in (0..self.z_order.len().saturating_sub(1)).rev() {
            if ids.contains(&self.z_order[i]) && !ids.contains(&self.z_order[i + 1]) {
                self.z_order.swap(i, i + 1);
                changed = true;
            }
        }
        changed
    }

    /// Move each given object one step down, past the next unselected object.
    pub fn send_backward(&mut self, ids: &[ObjectId]) -> bool {
        let mut changed = false;
        for i in 1..self.z_order.len() {
            if ids.contains(&self.z_order[i]) && !ids.contains(&self.z_order[i - 1]) {
                self.z_order.swap(i, i - 1);
                changed = true;
            }
        }
        changed
    }

    /// Largest id in the scene, including group descendants.
    pub fn max_id(&self) -> Option<ObjectId> {
        self.objects.values().map(Object::max_id).max()
    }
}
