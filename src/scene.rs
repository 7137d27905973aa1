//! In-memory scene backend: objects in paint order, the active selection,
//! and the event stream the selection coordinator consumes.
//!
//! Mutations made through `Scene` methods enqueue `SceneEvent`s; nothing is
//! recorded to history here. The editor drains the queue after each change.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use kurbo::{Point, Rect};

use crate::document::Document;
use crate::image_ops::ImageCache;
use crate::objects::SceneObject;
use crate::types::ObjectId;

/// Pointer tolerance, in world units, for thin shapes.
pub const HIT_SLOP: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modification {
    Moved,
    Scaled,
    Rotated,
    Styled,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    ObjectAdded(ObjectId),
    ObjectRemoved(ObjectId),
    ObjectModified { id: ObjectId, change: Modification },
    SelectionChanged,
}

#[derive(Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    active: Vec<ObjectId>,
    background: Option<String>,
    next_id: ObjectId,
    events: Vec<SceneEvent>,
    images: ImageCache,
    disposed: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Direct access without an event. Callers that change persisted state
    /// should go through `modify` instead.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    fn assign_ids(&mut self, obj: &mut SceneObject) {
        let mut next = self.next_id;
        obj.for_each_mut(&mut |o| {
            next += 1;
            o.id = next;
        });
        self.next_id = next;
    }

    /// Append on top of the paint order.
    pub fn add(&mut self, obj: SceneObject) -> ObjectId {
        let index = self.objects.len();
        self.insert(index, obj)
    }

    pub fn insert(&mut self, index: usize, mut obj: SceneObject) -> ObjectId {
        self.assign_ids(&mut obj);
        let id = obj.id;
        let index = index.min(self.objects.len());
        self.objects.insert(index, obj);
        self.events.push(SceneEvent::ObjectAdded(id));
        id
    }

    /// Insert an object that already has ids, such as a former group child.
    pub fn reinsert(&mut self, index: usize, obj: SceneObject) -> ObjectId {
        let id = obj.id;
        let index = index.min(self.objects.len());
        self.objects.insert(index, obj);
        self.events.push(SceneEvent::ObjectAdded(id));
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        let obj = self.objects.remove(index);
        self.events.push(SceneEvent::ObjectRemoved(id));
        if self.active.contains(&id) {
            self.active.retain(|a| *a != id);
            self.events.push(SceneEvent::SelectionChanged);
        }
        Some(obj)
    }

    /// Apply `f` to an object and report the change. Returns false if `id` is unknown.
    pub fn modify(&mut self, id: ObjectId, change: Modification, f: impl FnOnce(&mut SceneObject)) -> bool {
        match self.get_mut(id) {
            Some(obj) => {
                f(obj);
                self.events.push(SceneEvent::ObjectModified { id, change });
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> &[ObjectId] {
        &self.active
    }

    /// Replace the active selection. Unknown ids are dropped.
    pub fn set_active(&mut self, ids: &[ObjectId]) {
        let mut next: Vec<ObjectId> = Vec::with_capacity(ids.len());
        for id in ids {
            if self.get(*id).is_some() && !next.contains(id) {
                next.push(*id);
            }
        }
        if next != self.active {
            self.active = next;
            self.events.push(SceneEvent::SelectionChanged);
        }
    }

    pub fn discard_active(&mut self) {
        self.set_active(&[]);
    }

    pub fn workspace(&self) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.is_workspace())
    }

    pub fn workspace_mut(&mut self) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.is_workspace())
    }

    pub fn workspace_bounds(&self) -> Option<Rect> {
        self.workspace().map(|ws| ws.world_bounds())
    }

    /// Move the workspace back to the bottom of the paint order.
    pub fn pin_workspace(&mut self) {
        if let Some(index) = self.objects.iter().position(|o| o.is_workspace()) {
            if index != 0 {
                let ws = self.objects.remove(index);
                self.objects.insert(0, ws);
            }
        }
    }

    /// Raise each id one step, keeping the relative order of the raised set.
    pub fn bring_forward(&mut self, ids: &[ObjectId]) {
        let mut indices: Vec<usize> = ids.iter().filter_map(|id| self.index_of(*id)).collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        let mut ceiling = self.objects.len();
        for index in indices {
            if index + 1 < ceiling {
                self.objects.swap(index, index + 1);
                ceiling = index + 1;
            } else {
                ceiling = index;
            }
        }
    }

    /// Lower each id one step, keeping the relative order of the lowered set.
    pub fn send_backwards(&mut self, ids: &[ObjectId]) {
        let mut indices: Vec<usize> = ids.iter().filter_map(|id| self.index_of(*id)).collect();
        indices.sort_unstable();
        let mut floor = 0;
        for index in indices {
            if index > floor {
                self.objects.swap(index, index - 1);
                floor = index;
            } else {
                floor = index + 1;
            }
        }
    }

    /// Topmost visible, selectable object under `pt` (world coordinates).
    pub fn hit_test(&self, pt: Point) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.visible && o.selectable && !o.is_workspace())
            .find(|o| o.contains(pt, HIT_SLOP))
            .map(|o| o.id)
    }

    /// Selectable objects whose bounds intersect `area`, in paint order.
    pub fn intersecting(&self, area: Rect) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.visible && o.selectable && !o.is_workspace())
            .filter(|o| {
                let b = o.world_bounds();
                b.x0 < area.x1 && b.x1 > area.x0 && b.y0 < area.y1 && b.y1 > area.y0
            })
            .map(|o| o.id)
            .collect()
    }

    pub fn to_document(&self) -> Document {
        Document {
            objects: self.objects.clone(),
            background: self.background.clone(),
            ..Document::default()
        }
    }

    /// Replace all content with `doc`. Selection is cleared and every object
    /// gets a fresh id.
    pub fn load(&mut self, doc: Document) {
        let had_selection = !self.active.is_empty();
        self.objects.clear();
        self.active.clear();
        self.background = doc.background;
        for obj in doc.objects {
            self.add(obj);
        }
        self.pin_workspace();
        if had_selection {
            self.events.push(SceneEvent::SelectionChanged);
        }
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.objects.clear();
        self.active.clear();
        self.events.clear();
        self.images.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
