#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::document::SavePayload;
use crate::editor::Editor;
use crate::error::{ImageError, PersistError};
use crate::image_ops::PendingImage;
use crate::persist::PersistSink;
use crate::shortcuts::Modifiers;
use crate::types::RasterFormat;

fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("logger already installed");
        }
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Hands save payloads to the host's JavaScript callback.
struct CallbackSink<'a>(Option<&'a js_sys::Function>);

impl PersistSink for CallbackSink<'_> {
    fn save(&mut self, payload: &SavePayload) -> Result<(), PersistError> {
        let Some(callback) = self.0 else {
            return Err(PersistError::Rejected("no save callback registered".into()));
        };
        let value = serde_wasm_bindgen::to_value(payload).map_err(|e| PersistError::Rejected(e.to_string()))?;
        callback
            .call1(&JsValue::NULL, &value)
            .map_err(|e| PersistError::Rejected(format!("{e:?}")))?;
        Ok(())
    }
}

/// Browser-facing editor handle. Image loads are split in two: the host asks
/// for a ticket, fetches the bytes itself, then resolves or rejects the ticket.
#[wasm_bindgen]
pub struct DesignEngine {
    pub(crate) editor: Editor,
    save_callback: Option<js_sys::Function>,
    pending_images: HashMap<u32, PendingImage>,
    next_ticket: u32,
}

#[wasm_bindgen]
impl DesignEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> DesignEngine {
        console_error_panic_hook::set_once();
        init_logging();

        let config = match EditorConfig::from_json(config_json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("invalid editor config, using defaults: {e}");
                EditorConfig::default()
            }
        };
        DesignEngine {
            editor: Editor::new(config),
            save_callback: None,
            pending_images: HashMap::new(),
            next_ticket: 1,
        }
    }

    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        self.editor.load_document(json).map_err(js_error)
    }

    pub fn set_save_callback(&mut self, callback: js_sys::Function) {
        self.save_callback = Some(callback);
    }

    /// Stamp subsequent edits with the host time, so the save quiet period
    /// runs from the last edit rather than the last `tick`. Call before
    /// `execute_command` or `handle_key`.
    pub fn set_clock(&mut self, now_ms: f64) {
        self.editor.set_clock(now_ms);
    }

    /// Drive the save debounce. Call from a timer or animation frame.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let mut sink = CallbackSink(self.save_callback.as_ref());
        self.editor.poll_save(now_ms, &mut sink)
    }

    pub fn save_now(&mut self) -> bool {
        let mut sink = CallbackSink(self.save_callback.as_ref());
        self.editor.flush_save(&mut sink)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor.resize_container(width, height);
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Start an image operation (`add`, `replace`, `edit`, `crop`,
    /// `crop_circle`). Returns `None` when the operation needs a selected
    /// image and there is none.
    pub fn request_image(&mut self, op: &str, reference: &str) -> Option<u32> {
        let pending = match op {
            "add" => self.editor.request_add_image(reference),
            "replace" => self.editor.request_replace_image(reference),
            "edit" => self.editor.request_edit_image(reference),
            "crop" => self.editor.request_crop_image(reference),
            "crop_circle" => self.editor.request_crop_circle(reference),
            other => {
                log::warn!("unknown image operation: {other}");
                None
            }
        }?;
        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.pending_images.insert(ticket, pending);
        Some(ticket)
    }

    pub fn resolve_image(&mut self, ticket: u32, bytes: &[u8]) -> Result<u32, JsValue> {
        let pending = self
            .pending_images
            .remove(&ticket)
            .ok_or_else(|| js_error(format!("unknown image ticket {ticket}")))?;
        self.editor.complete_image(pending, bytes).map_err(js_error)
    }

    pub fn reject_image(&mut self, ticket: u32, reason: &str) {
        if let Some(pending) = self.pending_images.remove(&ticket) {
            self.editor.fail_image(&pending, &ImageError::Fetch(reason.to_string()));
        }
    }

    /// Supply bytes for an image referenced by a loaded document.
    pub fn provide_image(&mut self, src: &str, bytes: &[u8]) -> Result<(), JsValue> {
        self.editor.provide_image(src, bytes).map_err(js_error)
    }

    pub fn export_raster(&mut self, format: &str) -> Result<String, JsValue> {
        let format: RasterFormat = format.parse().map_err(js_error)?;
        self.editor.to_raster_data_uri(format).map_err(js_error)
    }

    pub fn export_json(&self) -> Result<String, JsValue> {
        self.editor.to_document_json().map_err(js_error)
    }

    /// Returns the name of the shortcut that ran, if any.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        meta: bool,
        shift: bool,
        alt: bool,
        text_focused: bool,
    ) -> Option<String> {
        let mods = Modifiers { ctrl, meta, shift, alt };
        let mut sink = CallbackSink(self.save_callback.as_ref());
        self.editor
            .handle_shortcut(key, mods, text_focused, &mut sink)
            .map(|s| format!("{s:?}").to_lowercase())
    }

    /// Queued UI signals as a JSON array.
    pub fn signals_json(&mut self) -> String {
        let signals = self.editor.drain_signals();
        match serde_json::to_string(&signals) {
            Ok(json) => json,
            Err(e) => {
                log::error!("signal serialization failed: {e}");
                "[]".to_string()
            }
        }
    }

    pub fn state_json(&self) -> String {
        self.editor.ui_state().to_string()
    }

    /// End the session. A pending save is handed to the callback first.
    pub fn dispose(&mut self) {
        self.pending_images.clear();
        if let Some(payload) = self.editor.dispose() {
            let mut sink = CallbackSink(self.save_callback.as_ref());
            if let Err(e) = sink.save(&payload) {
                log::warn!("final save failed: {e}");
            }
        }
        self.save_callback = None;
    }
}
