//! JSON command bus.
//!
//! Hosts send `{"action": ..., "params": {...}}` and get a JSON object back:
//! `{"success": true, ...}` or `{"error": "..."}`. Selection-scoped commands
//! with nothing selected still report success; they are no-ops, not failures.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use kurbo::{Point, Rect};
use serde::Deserialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

use crate::editor::Editor;
use crate::engine::DesignEngine;
use crate::styling::StyleChange;
use crate::types::{ObjectId, RasterFormat, Tool};

#[derive(Deserialize)]
struct Command {
    action: String,
    #[serde(default)]
    params: Value,
}

fn success() -> Value {
    json!({ "success": true })
}

fn failure(msg: impl std::fmt::Display) -> Value {
    json!({ "error": msg.to_string() })
}

fn created(id: Option<ObjectId>) -> Value {
    match id {
        Some(id) => json!({ "success": true, "id": id }),
        None => json!({ "success": false }),
    }
}

fn as_id(v: &Value) -> Option<ObjectId> {
    v.as_u64()
        .filter(|id| *id <= u64::from(ObjectId::MAX))
        .map(|id| id as ObjectId)
}

fn id_param(params: &Value) -> Option<ObjectId> {
    as_id(&params["id"])
}

fn ids_param(params: &Value) -> Vec<ObjectId> {
    params["ids"]
        .as_array()
        .map(|ids| ids.iter().filter_map(as_id).collect())
        .unwrap_or_default()
}

impl Editor {
    /// Run one command from the bus.
    pub fn execute(&mut self, action: &str, params: &Value) -> Value {
        if self.is_disposed() {
            return failure("editor disposed");
        }
        match action {
            "add_rectangle" => created(self.add_rectangle()),
            "add_soft_rectangle" => created(self.add_soft_rectangle()),
            "add_circle" => created(self.add_circle()),
            "add_ellipse" => created(self.add_ellipse()),
            "add_triangle" => created(self.add_triangle()),
            "add_inverse_triangle" => created(self.add_inverse_triangle()),
            "add_diamond" => created(self.add_diamond()),
            "add_line" => created(self.add_line()),
            "add_dashed_line" => created(self.add_dashed_line()),
            "add_text" => {
                let text = params["text"].as_str().unwrap_or("Text");
                created(self.add_text(text))
            }
            "change_style" => match StyleChange::deserialize(params) {
                Ok(change) => {
                    self.change_style(change);
                    success()
                }
                Err(e) => failure(format!("invalid style change: {e}")),
            },
            "change_background" => match params["color"].as_str() {
                Some(color) => {
                    self.change_background(color);
                    success()
                }
                None => failure("missing color"),
            },
            "change_size" => {
                match (params["width"].as_f64(), params["height"].as_f64()) {
                    (Some(w), Some(h)) => {
                        self.change_size(w, h);
                        success()
                    }
                    _ => failure("missing width or height"),
                }
            }
            "bring_forward" => {
                self.bring_forward();
                success()
            }
            "send_backwards" => {
                self.send_backwards();
                success()
            }
            "group" => created(self.group()),
            "ungroup" => json!({ "success": true, "ids": self.ungroup() }),
            "lock_object" => {
                self.lock_object();
                success()
            }
            "lock_selection" => {
                self.lock_selection();
                success()
            }
            "unlock_all" => {
                self.unlock_all();
                success()
            }
            "delete" => {
                self.delete();
                success()
            }
            "copy" => {
                self.copy();
                success()
            }
            "paste" => json!({ "success": true, "ids": self.paste() }),
            "undo" => json!({ "success": self.undo() }),
            "redo" => json!({ "success": self.redo() }),
            "select" => {
                self.select(&ids_param(params));
                json!({ "success": true, "selection": self.selection() })
            }
            "clear_selection" => {
                self.clear_selection();
                success()
            }
            "select_at" => {
                let pt = Point::new(params["x"].as_f64().unwrap_or(0.0), params["y"].as_f64().unwrap_or(0.0));
                let hit = self.select_at(pt, params["toggle"].as_bool().unwrap_or(false));
                json!({ "success": true, "hit": hit, "selection": self.selection() })
            }
            "select_in_rect" => {
                let area = Rect::new(
                    params["x0"].as_f64().unwrap_or(0.0),
                    params["y0"].as_f64().unwrap_or(0.0),
                    params["x1"].as_f64().unwrap_or(0.0),
                    params["y1"].as_f64().unwrap_or(0.0),
                );
                self.select_in_rect(area, params["toggle"].as_bool().unwrap_or(false));
                json!({ "success": true, "selection": self.selection() })
            }
            "drag" | "scale" | "rotate" | "set_text" | "begin_text_edit" => {
                let Some(id) = id_param(params) else {
                    return failure("missing id");
                };
                let applied = match action {
                    "drag" => self.drag_object(
                        id,
                        params["left"].as_f64().unwrap_or(0.0),
                        params["top"].as_f64().unwrap_or(0.0),
                    ),
                    "scale" => self.scale_object(
                        id,
                        params["scaleX"].as_f64().unwrap_or(1.0),
                        params["scaleY"].as_f64().unwrap_or(1.0),
                    ),
                    "rotate" => self.rotate_object(id, params["angle"].as_f64().unwrap_or(0.0)),
                    "set_text" => self.set_text(id, params["text"].as_str().unwrap_or_default()),
                    _ => self.begin_text_edit(id),
                };
                json!({ "success": applied })
            }
            "update_text_edit" => {
                let text = params["text"].as_str().unwrap_or_default();
                json!({ "success": self.update_text_edit(text) })
            }
            "end_text_edit" => json!({ "success": self.end_text_edit() }),
            "apply_filter" => match params["name"].as_str() {
                Some(name) => json!({ "success": self.apply_filter(name) }),
                None => failure("missing filter name"),
            },
            "clip_image_to_circle" => json!({ "success": self.clip_image_to_circle() }),
            "set_tool" => match Tool::deserialize(&params["tool"]) {
                Ok(tool) => {
                    self.set_tool(tool);
                    success()
                }
                Err(e) => failure(format!("invalid tool: {e}")),
            },
            "set_move_lock" => {
                self.set_move_lock(params["locked"].as_bool().unwrap_or(false));
                success()
            }
            "zoom_in" => {
                self.zoom_in();
                self.view_state()
            }
            "zoom_out" => {
                self.zoom_out();
                self.view_state()
            }
            "auto_zoom" => {
                self.auto_zoom();
                self.view_state()
            }
            "get_state" => self.ui_state(),
            "get_active_style" => self.active_style(),
            "export_json" => match self.to_document_json() {
                Ok(json) => json!({ "success": true, "json": json }),
                Err(e) => failure(e),
            },
            "export_raster" => {
                let format = params["format"].as_str().unwrap_or("png");
                match format.parse::<RasterFormat>() {
                    Ok(format) => match self.to_raster_data_uri(format) {
                        Ok(uri) => json!({ "success": true, "dataUri": uri }),
                        Err(e) => failure(e),
                    },
                    Err(e) => failure(e),
                }
            }
            other => {
                log::warn!("unknown command: {other}");
                failure(format!("unknown action: {other}"))
            }
        }
    }

    fn view_state(&self) -> Value {
        let vp = self.viewport();
        json!({ "success": true, "zoom": vp.zoom, "panX": vp.pan_x, "panY": vp.pan_y })
    }

    /// Undo/redo availability, selection and tool for the host UI.
    pub fn ui_state(&self) -> Value {
        json!({
            "state": self.state(),
            "canUndo": self.can_undo(),
            "canRedo": self.can_redo(),
            "selection": self.selection(),
            "tool": self.tool(),
            "editingText": self.is_editing_text(),
        })
    }

    pub fn active_style(&self) -> Value {
        json!({
            "fill": self.active_fill_color(),
            "stroke": self.active_stroke_color(),
            "strokeWidth": self.active_stroke_width(),
            "strokeDashArray": self.active_stroke_dash_array(),
            "opacity": self.active_opacity(),
            "fontFamily": self.active_font_family(),
            "fontSize": self.active_font_size(),
            "fontWeight": self.active_font_weight(),
            "fontStyle": self.active_font_style(),
            "textAlign": self.active_text_align(),
            "underline": self.active_font_underline(),
            "linethrough": self.active_font_linethrough(),
        })
    }
}

#[wasm_bindgen]
impl DesignEngine {
    pub fn execute_command(&mut self, cmd_json: &str) -> String {
        let cmd: Command = match serde_json::from_str(cmd_json) {
            Ok(c) => c,
            Err(e) => return failure(format!("Invalid JSON: {e}")).to_string(),
        };
        self.editor.execute(&cmd.action, &cmd.params).to_string()
    }
}
