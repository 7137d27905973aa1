//! Structural commands (z-order, grouping, locking, deletion, workspace
//! edits) and the interactive gestures reported by the canvas.

#[cfg(test)]
#[path = "arrange_test.rs"]
mod arrange_test;

use kurbo::{Point, Rect};

use crate::editor::Editor;
use crate::objects::{GroupData, SceneObject, Shape};
use crate::scene::Modification;
use crate::types::ObjectId;

impl Editor {
    fn selected_ids(&self) -> Option<Vec<ObjectId>> {
        if self.is_disposed() || self.selection().is_empty() {
            return None;
        }
        Some(self.selection().to_vec())
    }

    // ── Z-order ─────────────────────────────────────────────────────

    pub fn bring_forward(&mut self) {
        let Some(ids) = self.selected_ids() else { return };
        self.scene.bring_forward(&ids);
        self.scene.pin_workspace();
        self.commit();
    }

    pub fn send_backwards(&mut self) {
        let Some(ids) = self.selected_ids() else { return };
        self.scene.send_backwards(&ids);
        self.scene.pin_workspace();
        self.commit();
    }

    // ── Grouping ────────────────────────────────────────────────────

    /// Replace the selected objects (two or more) with one group holding
    /// them in their paint order. The group takes the topmost member's slot.
    pub fn group(&mut self) -> Option<ObjectId> {
        let ids = self.selected_ids()?;
        if ids.len() < 2 {
            return None;
        }
        let mut members: Vec<(usize, ObjectId)> =
            ids.iter().filter_map(|id| self.scene.index_of(*id).map(|i| (i, *id))).collect();
        members.sort_unstable();
        let top_index = members.last().map(|(i, _)| *i)?;
        let slot = top_index + 1 - members.len();

        let mut children: Vec<SceneObject> = Vec::with_capacity(members.len());
        for (_, id) in &members {
            if let Some(obj) = self.scene.remove(*id) {
                children.push(obj);
            }
        }
        let bounds = children
            .iter()
            .map(|c| c.world_bounds())
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);

        for child in &mut children {
            child.translate(-bounds.x0, -bounds.y0);
        }

        let mut group = SceneObject::new(
            Shape::Group(GroupData { objects: children, clip_path: None }),
            bounds.width(),
            bounds.height(),
            &self.style,
        );
        group.left = bounds.x0;
        group.top = bounds.y0;
        group.fill = None;
        group.stroke = None;
        group.stroke_width = 0.0;
        group.stroke_dash_array = None;

        let gid = self.scene.insert(slot, group);
        self.scene.set_active(&[gid]);
        self.commit();
        log::debug!("grouped {} objects into {gid}", members.len());
        Some(gid)
    }

    /// Dissolve the single selected group back into its members, in place.
    pub fn ungroup(&mut self) -> Vec<ObjectId> {
        let Some(ids) = self.selected_ids() else { return Vec::new() };
        let [gid] = ids.as_slice() else { return Vec::new() };
        let gid = *gid;
        if self.scene.get(gid).and_then(|g| g.group()).is_none() {
            return Vec::new();
        }
        let Some(index) = self.scene.index_of(gid) else { return Vec::new() };
        let Some(group) = self.scene.remove(gid) else { return Vec::new() };
        let parent = group.transform();
        let translation_only = group.angle == 0.0
            && group.scale_x == 1.0
            && group.scale_y == 1.0
            && !group.flip_x
            && !group.flip_y;
        let (dx, dy) = (group.left, group.top);
        let opacity = group.opacity;
        let children = match group.shape {
            Shape::Group(data) => data.objects,
            _ => Vec::new(),
        };

        let mut restored = Vec::with_capacity(children.len());
        for (offset, mut child) in children.into_iter().enumerate() {
            if translation_only {
                child.translate(dx, dy);
            } else {
                child.set_transform(parent * child.transform());
            }
            child.opacity *= opacity;
            restored.push(self.scene.reinsert(index + offset, child));
        }
        self.scene.discard_active();
        self.commit();
        restored
    }

    // ── Locking & deletion ──────────────────────────────────────────

    /// Make the selected objects unselectable by pointer. They stay selected.
    pub fn lock_object(&mut self) {
        let Some(ids) = self.selected_ids() else { return };
        for id in ids {
            self.scene.modify(id, Modification::Styled, |obj| {
                obj.selectable = false;
                obj.has_controls = false;
            });
        }
        self.commit();
    }

    /// Lock the selected objects and clear the selection.
    pub fn lock_selection(&mut self) {
        let Some(ids) = self.selected_ids() else { return };
        for id in ids {
            self.scene.modify(id, Modification::Styled, |obj| {
                obj.selectable = false;
                obj.has_controls = false;
            });
        }
        self.scene.discard_active();
        self.commit();
    }

    pub fn unlock_all(&mut self) {
        if self.is_disposed() {
            return;
        }
        let locked: Vec<ObjectId> = self
            .scene
            .objects()
            .iter()
            .filter(|o| !o.selectable && !o.is_workspace())
            .map(|o| o.id)
            .collect();
        if locked.is_empty() {
            return;
        }
        for id in locked {
            self.scene.modify(id, Modification::Styled, |obj| {
                obj.selectable = true;
                obj.has_controls = true;
            });
        }
        self.commit();
    }

    pub fn delete(&mut self) {
        let Some(ids) = self.selected_ids() else { return };
        for id in ids {
            self.scene.remove(id);
        }
        self.scene.discard_active();
        self.commit();
    }

    // ── Workspace ───────────────────────────────────────────────────

    pub fn change_background(&mut self, color: &str) {
        if self.is_disposed() {
            return;
        }
        let Some(id) = self.scene.workspace().map(|ws| ws.id) else { return };
        self.scene.modify(id, Modification::Styled, |ws| ws.fill = Some(color.to_string()));
        self.commit();
    }

    /// Resize the workspace and refit the view.
    pub fn change_size(&mut self, width: f64, height: f64) {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if self.is_disposed() || !valid(width) || !valid(height) {
            return;
        }
        let Some(id) = self.scene.workspace().map(|ws| ws.id) else { return };
        self.scene.modify(id, Modification::Scaled, |ws| {
            ws.width = width;
            ws.height = height;
        });
        self.auto_zoom();
        self.commit();
    }

    // ── Selection gestures ──────────────────────────────────────────

    /// Programmatic selection. Locked objects may be selected this way; the
    /// workspace never is.
    pub fn select(&mut self, ids: &[ObjectId]) {
        if self.is_disposed() {
            return;
        }
        let ids: Vec<ObjectId> = ids
            .iter()
            .copied()
            .filter(|id| self.scene.get(*id).is_some_and(|o| !o.is_workspace()))
            .collect();
        self.scene.set_active(&ids);
        self.dispatch_events();
    }

    pub fn clear_selection(&mut self) {
        self.select(&[]);
    }

    /// Pointer selection at a world point. With `toggle`, the hit object is
    /// added to or removed from the current selection.
    pub fn select_at(&mut self, pt: Point, toggle: bool) -> Option<ObjectId> {
        if self.is_disposed() {
            return None;
        }
        let hit = self.scene.hit_test(pt);
        let mut next: Vec<ObjectId> = if toggle { self.selection().to_vec() } else { Vec::new() };
        if let Some(id) = hit {
            match next.iter().position(|s| *s == id) {
                Some(pos) if toggle => {
                    next.remove(pos);
                }
                Some(_) => {}
                None => next.push(id),
            }
        }
        self.select(&next);
        hit
    }

    /// Marquee selection of everything selectable intersecting `area`.
    pub fn select_in_rect(&mut self, area: Rect, toggle: bool) {
        if self.is_disposed() {
            return;
        }
        let mut next: Vec<ObjectId> = if toggle { self.selection().to_vec() } else { Vec::new() };
        for id in self.scene.intersecting(area.abs()) {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        self.select(&next);
    }

    // ── Transform gestures ──────────────────────────────────────────

    fn gesture(&mut self, id: ObjectId, change: Modification, f: impl FnOnce(&mut SceneObject)) -> bool {
        if self.is_disposed() {
            return false;
        }
        if !self.scene.get(id).is_some_and(|o| o.selectable && !o.is_workspace()) {
            return false;
        }
        self.scene.modify(id, change, f);
        if self.dispatch_events() {
            self.record();
        }
        true
    }

    pub fn drag_object(&mut self, id: ObjectId, left: f64, top: f64) -> bool {
        self.gesture(id, Modification::Moved, |obj| {
            obj.left = left;
            obj.top = top;
        })
    }

    pub fn scale_object(&mut self, id: ObjectId, scale_x: f64, scale_y: f64) -> bool {
        self.gesture(id, Modification::Scaled, |obj| {
            obj.scale_x = scale_x.abs();
            obj.scale_y = scale_y.abs();
            obj.flip_x ^= scale_x < 0.0;
            obj.flip_y ^= scale_y < 0.0;
        })
    }

    /// Rotate about the object's visual center.
    pub fn rotate_object(&mut self, id: ObjectId, angle: f64) -> bool {
        self.gesture(id, Modification::Rotated, |obj| {
            let pivot = obj.center();
            obj.angle = angle;
            obj.center_on(pivot);
        })
    }

    // ── Text editing ────────────────────────────────────────────────

    /// Replace a text box's content and record.
    pub fn set_text(&mut self, id: ObjectId, text: &str) -> bool {
        if self.is_disposed() || self.scene.get(id).and_then(|o| o.text()).is_none() {
            return false;
        }
        self.scene.modify(id, Modification::Text, |obj| {
            if let Some(data) = obj.text_mut() {
                data.text = text.to_string();
                data.editing = None;
            }
        });
        if self.dispatch_events() {
            self.record();
        }
        true
    }

    pub fn begin_text_edit(&mut self, id: ObjectId) -> bool {
        if self.is_disposed() {
            return false;
        }
        let Some(data) = self.scene.get_mut(id).and_then(|o| o.text_mut()) else {
            return false;
        };
        data.editing = Some(data.text.clone());
        self.text_editing = Some(id);
        true
    }

    /// Update the transient edit buffer. Nothing is recorded.
    pub fn update_text_edit(&mut self, text: &str) -> bool {
        let Some(id) = self.text_editing else { return false };
        match self.scene.get_mut(id).and_then(|o| o.text_mut()) {
            Some(data) => {
                data.editing = Some(text.to_string());
                true
            }
            None => false,
        }
    }

    /// Commit the edit buffer into the text and record if it changed.
    pub fn end_text_edit(&mut self) -> bool {
        let Some(id) = self.text_editing.take() else { return false };
        let changed = self
            .scene
            .get_mut(id)
            .and_then(|o| o.text_mut())
            .is_some_and(|data| data.commit_editing());
        if changed {
            self.scene.modify(id, Modification::Text, |_| {});
            if self.dispatch_events() {
                self.record();
            }
        }
        changed
    }

    pub fn is_editing_text(&self) -> bool {
        self.text_editing.is_some()
    }
}
