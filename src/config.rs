//! Editor configuration.
//!
//! Everything here has a design-value default so hosts can pass `{}` and only
//! override what they care about. `StyleDefaults` is the appearance new
//! objects are built with; it is owned by the editor session and handed to
//! constructors explicitly.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleDefaults {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub stroke_dash_array: Vec<f64>,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        StyleDefaults {
            fill: "rgba(0,0,0,1)".to_string(),
            stroke: "rgba(0,0,0,1)".to_string(),
            stroke_width: 2.0,
            stroke_dash_array: Vec::new(),
            font_family: "Arial".to_string(),
            font_size: 32.0,
            font_weight: 400,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period before a scheduled save fires, in milliseconds.
    pub save_debounce_ms: f64,
    /// Diagonal offset added per paste, in logical pixels.
    pub paste_step: f64,
    /// Relative zoom change per zoom-in / zoom-out step.
    pub zoom_step: f64,
    pub min_zoom: f64,
    /// Upper clamp applied by zoom-out.
    pub zoom_out_max: f64,
    pub max_zoom: f64,
    /// Fraction of the container kept free on each side by auto-fit.
    pub fit_inset: f64,
    /// Reject interactive repositioning of objects.
    pub move_lock: bool,
    pub workspace_width: f64,
    pub workspace_height: f64,
    pub workspace_fill: String,
    pub style: StyleDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            save_debounce_ms: 500.0,
            paste_step: 10.0,
            zoom_step: 0.05,
            min_zoom: 0.2,
            zoom_out_max: 1.0,
            max_zoom: 20.0,
            fit_inset: 0.05,
            move_lock: false,
            workspace_width: 900.0,
            workspace_height: 1200.0,
            workspace_fill: "white".to_string(),
            style: StyleDefaults::default(),
        }
    }
}

fn checked(name: &str, value: f64, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
    if value.is_finite() && valid(value) {
        value
    } else {
        log::warn!("config {name}={value} out of range, using {default}");
        default
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config. An empty string yields defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Replace out-of-range numbers with their defaults so that
    /// `min_zoom <= zoom_out_max <= max_zoom` always holds.
    #[must_use]
    pub fn normalized(self) -> Self {
        let d = Self::default();
        let mut min_zoom = checked("minZoom", self.min_zoom, d.min_zoom, |v| v > 0.0);
        let mut max_zoom = checked("maxZoom", self.max_zoom, d.max_zoom, |v| v > 0.0);
        if min_zoom > max_zoom {
            log::warn!("config minZoom={min_zoom} exceeds maxZoom={max_zoom}, using defaults");
            min_zoom = d.min_zoom;
            max_zoom = d.max_zoom;
        }
        let zoom_out_max =
            checked("zoomOutMax", self.zoom_out_max, d.zoom_out_max, |v| v > 0.0).clamp(min_zoom, max_zoom);

        EditorConfig {
            save_debounce_ms: checked("saveDebounceMs", self.save_debounce_ms, d.save_debounce_ms, |v| v >= 0.0),
            paste_step: checked("pasteStep", self.paste_step, d.paste_step, |_| true),
            zoom_step: checked("zoomStep", self.zoom_step, d.zoom_step, |v| v > 0.0),
            min_zoom,
            zoom_out_max,
            max_zoom,
            fit_inset: checked("fitInset", self.fit_inset, d.fit_inset, |v| (0.0..0.5).contains(&v)),
            workspace_width: checked("workspaceWidth", self.workspace_width, d.workspace_width, |v| v > 0.0),
            workspace_height: checked("workspaceHeight", self.workspace_height, d.workspace_height, |v| v > 0.0),
            style: StyleDefaults {
                stroke_width: checked("strokeWidth", self.style.stroke_width, d.style.stroke_width, |v| v >= 0.0),
                font_size: checked("fontSize", self.style.font_size, d.style.font_size, |v| v > 0.0),
                ..self.style
            },
            ..self
        }
    }
}
