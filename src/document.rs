//! The persisted document format.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::objects::SceneObject;

/// Extra object properties that survive serialization beyond geometry and paint.
pub const PERSISTED_KEYS: [&str; 8] = [
    "name",
    "gradientAngle",
    "selectable",
    "hasControls",
    "linkData",
    "editable",
    "extensionType",
    "extension",
];

pub const FORMAT_VERSION: &str = "1";

fn format_version() -> String {
    FORMAT_VERSION.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "format_version")]
    pub version: String,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Workspace size hint used when `objects` has no workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Default for Document {
    fn default() -> Self {
        Document { version: format_version(), objects: Vec::new(), background: None, width: None, height: None }
    }
}

impl Document {
    /// Parse and validate. Nothing is applied to any scene here, so a failure
    /// leaves the caller's state untouched.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let doc: Document = serde_json::from_str(json)?;
        let workspaces = doc.workspace_count();
        if workspaces > 1 {
            return Err(LoadError::DuplicateWorkspace(workspaces));
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn workspace_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_workspace()).count()
    }

    pub fn workspace(&self) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.is_workspace())
    }

    /// Commit pending text edit buffers, including text nested in groups.
    pub fn normalize_text(&mut self) {
        for obj in &mut self.objects {
            normalize_text(obj);
        }
    }
}

pub fn normalize_text(obj: &mut SceneObject) {
    obj.for_each_mut(&mut |o| {
        if let Some(text) = o.text_mut() {
            text.commit_editing();
        }
    });
}

/// What the host persistence layer receives on every debounced save.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SavePayload {
    pub json: String,
    pub width: f64,
    pub height: f64,
}
