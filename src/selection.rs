//! Selection and event coordination.
//!
//! The `Coordinator` consumes scene events and turns them into three
//! decisions: what the selection is, whether the change belongs in history,
//! and whether the active tool has to fall back to `Select`. Move-lock is
//! enforced here by snapping moved objects back to their insertion baseline.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::objects::Baseline;
use crate::scene::{Modification, Scene, SceneEvent};
use crate::types::{ObjectId, Tool};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// An interactive change happened that should become a history entry.
    pub record: bool,
    /// The tool was reset because the selection it edits went away.
    pub tool_fallback: Option<Tool>,
}

#[derive(Debug, Default)]
pub struct Coordinator {
    selection: Vec<ObjectId>,
    tool: Tool,
    move_lock: bool,
}

impl Coordinator {
    pub fn new(move_lock: bool) -> Self {
        Coordinator { selection: Vec::new(), tool: Tool::Select, move_lock }
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn move_lock(&self) -> bool {
        self.move_lock
    }

    pub fn set_move_lock(&mut self, locked: bool) {
        self.move_lock = locked;
    }

    pub fn reset(&mut self) {
        self.selection.clear();
    }

    pub fn process(&mut self, events: &[SceneEvent], scene: &mut Scene) -> Outcome {
        let mut outcome = Outcome::default();
        for event in events {
            match *event {
                SceneEvent::ObjectAdded(id) => {
                    if let Some(obj) = scene.get_mut(id) {
                        obj.baseline = Some(Baseline { left: obj.left, top: obj.top });
                    }
                }
                SceneEvent::ObjectRemoved(id) => {
                    self.selection.retain(|s| *s != id);
                }
                SceneEvent::ObjectModified { id, change: Modification::Moved } => {
                    if self.move_lock && self.revert_move(id, scene) {
                        log::debug!("move-lock: reverted object {id}");
                        continue;
                    }
                    outcome.record = true;
                }
                SceneEvent::ObjectModified { change: Modification::Scaled, .. }
                | SceneEvent::ObjectModified { change: Modification::Rotated, .. }
                | SceneEvent::ObjectModified { change: Modification::Text, .. }
                | SceneEvent::ObjectModified { change: Modification::Styled, .. } => {
                    outcome.record = true;
                }
                SceneEvent::SelectionChanged => {
                    if let Some(tool) = self.sync_selection(scene) {
                        outcome.tool_fallback = Some(tool);
                    }
                }
            }
        }
        outcome
    }

    /// Snap `id` back to its baseline. Returns false if it has none.
    fn revert_move(&self, id: ObjectId, scene: &mut Scene) -> bool {
        match scene.get_mut(id) {
            Some(obj) => match obj.baseline {
                Some(base) => {
                    obj.left = base.left;
                    obj.top = base.top;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    fn sync_selection(&mut self, scene: &Scene) -> Option<Tool> {
        self.selection = scene
            .active()
            .iter()
            .copied()
            .filter(|id| scene.get(*id).is_some_and(|o| !o.is_workspace()))
            .collect();
        if self.selection.is_empty() && self.tool.requires_selection() {
            self.tool = Tool::Select;
            return Some(Tool::Select);
        }
        None
    }
}
