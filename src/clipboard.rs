//! Copy / paste.
//!
//! Copied objects are held serialized so the clipboard is unaffected by later
//! edits to the originals. Each paste shifts the copies one more step down
//! and right.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use crate::editor::Editor;
use crate::objects::SceneObject;
use crate::types::ObjectId;

#[derive(Debug, Clone)]
pub struct Clipboard {
    payload: Option<String>,
    step: f64,
    repeat_offset: f64,
}

impl Clipboard {
    pub fn new(step: f64) -> Self {
        Clipboard { payload: None, step, repeat_offset: step }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    pub fn repeat_offset(&self) -> f64 {
        self.repeat_offset
    }

    /// Replace the slot with `objects`. Does nothing for an empty slice.
    pub fn copy(&mut self, objects: &[SceneObject]) -> Result<(), serde_json::Error> {
        if objects.is_empty() {
            return Ok(());
        }
        self.payload = Some(serde_json::to_string(objects)?);
        self.repeat_offset = self.step;
        Ok(())
    }

    /// Fresh copies of the slot, shifted by the current repeat offset.
    pub fn paste(&mut self) -> Result<Option<Vec<SceneObject>>, serde_json::Error> {
        let Some(payload) = &self.payload else {
            return Ok(None);
        };
        let mut objects: Vec<SceneObject> = serde_json::from_str(payload)?;
        for obj in &mut objects {
            obj.translate(self.repeat_offset, self.repeat_offset);
        }
        self.repeat_offset += self.step;
        Ok(Some(objects))
    }
}

impl Editor {
    pub fn copy(&mut self) {
        if self.is_disposed() {
            return;
        }
        let selected: Vec<SceneObject> = self.selected_objects().into_iter().cloned().collect();
        if let Err(err) = self.clipboard.copy(&selected) {
            log::error!("copy failed: {err}");
        }
    }

    /// Insert the clipboard contents on top and select them.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        if self.is_disposed() {
            return Vec::new();
        }
        let objects = match self.clipboard.paste() {
            Ok(Some(objects)) => objects,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::error!("paste failed: {err}");
                return Vec::new();
            }
        };
        let ids: Vec<ObjectId> = objects.into_iter().map(|obj| self.scene.add(obj)).collect();
        self.scene.set_active(&ids);
        self.commit();
        ids
    }
}
