//! Editor core.
//!
//! `Editor` owns one document session: the scene, history, selection
//! coordinator, clipboard, viewport and pending save. Commands live in
//! concern modules (`shapes`, `styling`, `arrange`, `image_ops`, `export`)
//! as further `impl Editor` blocks; this file holds lifecycle, load,
//! history and event dispatch.
//!
//! Every mutating command follows the same shape: change the scene, then
//! `commit()`, which routes the queued scene events through the coordinator
//! and records one snapshot.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::clipboard::Clipboard;
use crate::config::{EditorConfig, StyleDefaults};
use crate::document::{Document, SavePayload};
use crate::error::LoadError;
use crate::history::History;
use crate::image_ops::DataUriFetcher;
use crate::objects::SceneObject;
use crate::persist::{Debouncer, PersistSink};
use crate::scene::Scene;
use crate::selection::Coordinator;
use crate::types::{DocumentState, ObjectId, Tool};
use crate::viewport::Viewport;

/// Transient notifications for the host UI.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum UiSignal {
    ToolFallback(Tool),
    SaveFailed(String),
    LoadFailed(String),
    ImageFailed(String),
}

/// Weak handle to an editor session, held by in-flight async work.
#[derive(Clone, Debug)]
pub struct LivenessToken(Weak<()>);

impl LivenessToken {
    /// True while the session that issued this token is alive.
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// True if this token was issued by `editor`'s current session.
    pub fn belongs_to(&self, editor: &Editor) -> bool {
        match &editor.session {
            Some(session) => Weak::ptr_eq(&self.0, &Rc::downgrade(session)),
            None => false,
        }
    }
}

pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) style: StyleDefaults,
    pub(crate) scene: Scene,
    pub(crate) history: History,
    pub(crate) coordinator: Coordinator,
    pub(crate) clipboard: Clipboard,
    pub(crate) viewport: Viewport,
    pub(crate) saves: Debouncer<SavePayload>,
    pub(crate) signals: Vec<UiSignal>,
    pub(crate) state: DocumentState,
    pub(crate) clock_ms: f64,
    pub(crate) text_editing: Option<ObjectId>,
    session: Option<Rc<()>>,
}

impl Editor {
    /// A fresh session with an empty workspace sized from `config`.
    pub fn new(config: EditorConfig) -> Self {
        let config = config.normalized();
        let mut scene = Scene::new();
        scene.add(SceneObject::workspace(
            config.workspace_width,
            config.workspace_height,
            &config.workspace_fill,
        ));
        let mut editor = Editor {
            style: config.style.clone(),
            coordinator: Coordinator::new(config.move_lock),
            clipboard: Clipboard::new(config.paste_step),
            saves: Debouncer::new(config.save_debounce_ms),
            history: History::new(String::new()),
            viewport: Viewport::default(),
            signals: Vec::new(),
            state: DocumentState::Empty,
            clock_ms: 0.0,
            text_editing: None,
            session: Some(Rc::new(())),
            scene,
            config,
        };
        editor.dispatch_events();
        if let Some(snapshot) = editor.snapshot() {
            editor.history.reset(snapshot);
        }
        editor
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == DocumentState::Disposed
    }

    pub fn token(&self) -> LivenessToken {
        match &self.session {
            Some(session) => LivenessToken(Rc::downgrade(session)),
            None => LivenessToken(Weak::new()),
        }
    }

    /// Tear the session down. Later commands are no-ops and outstanding
    /// image requests are refused. Returns the pending save, if any, so the
    /// host can persist it.
    pub fn dispose(&mut self) -> Option<SavePayload> {
        if self.is_disposed() {
            return None;
        }
        let pending = self.saves.flush();
        self.session = None;
        self.scene.dispose();
        self.coordinator.reset();
        self.text_editing = None;
        self.state = DocumentState::Disposed;
        log::info!("editor disposed");
        pending
    }

    /// Load a serialized document, replacing the scene. The payload is fully
    /// validated first; on error nothing changes and `LoadFailed` is signalled.
    pub fn load_document(&mut self, json: &str) -> Result<(), LoadError> {
        self.load_document_sized(json, None)
    }

    /// Like `load_document`, with an explicit size for a synthesized workspace.
    pub fn load_document_sized(&mut self, json: &str, size: Option<(f64, f64)>) -> Result<(), LoadError> {
        if self.is_disposed() {
            return Err(LoadError::Disposed);
        }
        let mut doc = match Document::from_json(json) {
            Ok(doc) => doc,
            Err(err) => {
                log::error!("document load failed: {err}");
                self.signals.push(UiSignal::LoadFailed(err.to_string()));
                return Err(err);
            }
        };

        if doc.workspace().is_none() {
            let (width, height) = match (size, doc.width, doc.height) {
                (Some(size), _, _) => size,
                (None, Some(w), Some(h)) => (w, h),
                _ => (self.config.workspace_width, self.config.workspace_height),
            };
            log::debug!("document has no workspace, adding {width}x{height}");
            doc.objects
                .insert(0, SceneObject::workspace(width, height, &self.config.workspace_fill));
        }

        self.decode_embedded_images(&doc);
        self.apply_document(doc);
        self.auto_zoom();
        if let Some(snapshot) = self.snapshot() {
            self.history.reset(snapshot);
        }
        self.state = DocumentState::Loaded;
        log::info!("document loaded: {} objects", self.scene.len());
        Ok(())
    }

    fn decode_embedded_images(&mut self, doc: &Document) {
        let mut sources = Vec::new();
        for obj in &doc.objects {
            collect_image_sources(obj, &mut sources);
        }
        for src in sources {
            if self.scene.images().contains(&src) || !src.starts_with("data:") {
                continue;
            }
            if let Err(err) = self.scene.images_mut().load_from(&src, &DataUriFetcher) {
                log::warn!("embedded image could not be decoded: {err}");
            }
        }
    }

    pub(crate) fn apply_document(&mut self, doc: Document) {
        self.text_editing = None;
        self.coordinator.reset();
        self.scene.load(doc);
        self.dispatch_events();
    }

    // ── History ─────────────────────────────────────────────────────

    pub(crate) fn snapshot(&self) -> Option<String> {
        match self.scene.to_document().to_json() {
            Ok(json) => Some(json),
            Err(err) => {
                log::error!("snapshot serialization failed: {err}");
                None
            }
        }
    }

    /// Push the current scene onto history (skipped if identical to the
    /// current entry) and schedule a save.
    pub fn record(&mut self) {
        if self.is_disposed() {
            return;
        }
        let Some(snapshot) = self.snapshot() else {
            return;
        };
        if self.history.push(snapshot) {
            log::debug!("history: recorded entry {}", self.history.index());
            self.state = DocumentState::Dirty;
            self.schedule_save();
        } else {
            log::debug!("history: skipped identical snapshot");
        }
    }

    /// Route pending scene events through the coordinator, then record.
    pub(crate) fn commit(&mut self) {
        self.dispatch_events();
        self.record();
    }

    /// Route pending scene events through the coordinator. Returns whether an
    /// interactive change asked to be recorded.
    pub(crate) fn dispatch_events(&mut self) -> bool {
        let events = self.scene.drain_events();
        if events.is_empty() {
            return false;
        }
        let outcome = self.coordinator.process(&events, &mut self.scene);
        if let Some(tool) = outcome.tool_fallback {
            self.signals.push(UiSignal::ToolFallback(tool));
        }
        outcome.record
    }

    pub fn undo(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        let Some(doc) = Self::parse_entry(self.history.peek_undo()) else {
            return false;
        };
        self.history.undo();
        log::debug!("undo to entry {}", self.history.index());
        self.restore(doc);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        let Some(doc) = Self::parse_entry(self.history.peek_redo()) else {
            return false;
        };
        self.history.redo();
        log::debug!("redo to entry {}", self.history.index());
        self.restore(doc);
        true
    }

    /// The cursor only moves once the target entry has parsed.
    fn parse_entry(entry: Option<&str>) -> Option<Document> {
        match Document::from_json(entry?) {
            Ok(doc) => Some(doc),
            Err(err) => {
                log::error!("history entry could not be restored: {err}");
                None
            }
        }
    }

    fn restore(&mut self, doc: Document) {
        self.apply_document(doc);
        self.auto_zoom();
        self.schedule_save();
        self.state = DocumentState::Loaded;
    }

    pub fn can_undo(&self) -> bool {
        !self.is_disposed() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_disposed() && self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Update the clock used to stamp scheduled saves.
    pub fn set_clock(&mut self, now_ms: f64) {
        self.clock_ms = now_ms;
    }

    pub(crate) fn save_payload(&self) -> Option<SavePayload> {
        let json = match self.document_json() {
            Ok(json) => json,
            Err(err) => {
                log::error!("save payload serialization failed: {err}");
                return None;
            }
        };
        let (width, height) = self
            .scene
            .workspace()
            .map(|ws| ws.scaled_size())
            .unwrap_or((self.config.workspace_width, self.config.workspace_height));
        Some(SavePayload { json, width, height })
    }

    fn schedule_save(&mut self) {
        if let Some(payload) = self.save_payload() {
            self.saves.schedule(payload, self.clock_ms);
        }
    }

    pub fn save_pending(&self) -> bool {
        self.saves.is_pending()
    }

    /// Fire the scheduled save once the debounce window has passed.
    pub fn poll_save(&mut self, now_ms: f64, sink: &mut dyn PersistSink) -> bool {
        self.clock_ms = now_ms;
        match self.saves.poll(now_ms) {
            Some(payload) => self.deliver(&payload, sink),
            None => false,
        }
    }

    /// Fire the scheduled save immediately, or the current document if none is pending.
    pub fn flush_save(&mut self, sink: &mut dyn PersistSink) -> bool {
        if self.is_disposed() {
            return false;
        }
        match self.saves.flush().or_else(|| self.save_payload()) {
            Some(payload) => self.deliver(&payload, sink),
            None => false,
        }
    }

    fn deliver(&mut self, payload: &SavePayload, sink: &mut dyn PersistSink) -> bool {
        match sink.save(payload) {
            Ok(()) => {
                log::debug!("document saved ({} bytes)", payload.json.len());
                true
            }
            Err(err) => {
                log::warn!("document save failed: {err}");
                self.signals.push(UiSignal::SaveFailed(err.to_string()));
                false
            }
        }
    }

    // ── Selection & tools ───────────────────────────────────────────

    pub fn selection(&self) -> &[ObjectId] {
        self.coordinator.selection()
    }

    pub fn selected_objects(&self) -> Vec<&SceneObject> {
        self.selection().iter().filter_map(|id| self.scene.get(*id)).collect()
    }

    /// The single selected object, if exactly one is selected.
    pub fn active_object(&self) -> Option<&SceneObject> {
        match self.selection() {
            [id] => self.scene.get(*id),
            _ => None,
        }
    }

    pub fn tool(&self) -> Tool {
        self.coordinator.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.coordinator.set_tool(tool);
    }

    pub fn set_move_lock(&mut self, locked: bool) {
        self.coordinator.set_move_lock(locked);
    }

    pub fn drain_signals(&mut self) -> Vec<UiSignal> {
        std::mem::take(&mut self.signals)
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn style_defaults(&self) -> &StyleDefaults {
        &self.style
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.scene.get(id)
    }

    pub fn objects(&self) -> &[SceneObject] {
        self.scene.objects()
    }

    /// Paint-order position (0 is the bottom).
    pub fn index_of_object(&self, id: ObjectId) -> Option<usize> {
        self.scene.index_of(id)
    }

    pub fn workspace(&self) -> Option<&SceneObject> {
        self.scene.workspace()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // ── Viewport ────────────────────────────────────────────────────

    pub fn resize_container(&mut self, width: f64, height: f64) {
        if self.is_disposed() {
            return;
        }
        self.viewport.resize(width, height);
        self.auto_zoom();
    }

    pub fn auto_zoom(&mut self) {
        if let Some(bounds) = self.scene.workspace_bounds() {
            self.viewport.auto_fit(bounds, &self.config);
        }
    }

    pub fn zoom_in(&mut self) {
        if !self.is_disposed() {
            self.viewport.zoom_in(&self.config);
        }
    }

    pub fn zoom_out(&mut self) {
        if !self.is_disposed() {
            self.viewport.zoom_out(&self.config);
        }
    }
}

fn collect_image_sources(obj: &SceneObject, out: &mut Vec<String>) {
    if let Some(image) = obj.image() {
        out.push(image.src.clone());
    }
    if let Some(group) = obj.group() {
        for child in &group.objects {
            collect_image_sources(child, out);
        }
    }
}
