//! Style commands and active-style getters.
//!
//! Every style change on a selection goes through `route`, a single match
//! over (variant, property) that decides where the value lands. A text box
//! takes its "stroke color" as its fill, images have no fill, and groups
//! forward paint and font changes to their children.

#[cfg(test)]
#[path = "styling_test.rs"]
mod styling_test;

use serde::Deserialize;

use crate::editor::Editor;
use crate::objects::SceneObject;
use crate::scene::Modification;
use crate::types::{FontStyle, ObjectKind, TextAlign};

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "property", content = "value", rename_all = "camelCase")]
pub enum StyleChange {
    Fill(String),
    StrokeColor(String),
    StrokeWidth(f64),
    StrokeDashArray(Vec<f64>),
    Opacity(f64),
    FontFamily(String),
    FontSize(f64),
    FontWeight(u16),
    FontStyle(FontStyle),
    Underline(bool),
    Linethrough(bool),
    TextAlign(TextAlign),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Property {
    Fill,
    StrokeColor,
    StrokeShape,
    Opacity,
    Font,
}

impl StyleChange {
    fn property(&self) -> Property {
        match self {
            StyleChange::Fill(_) => Property::Fill,
            StyleChange::StrokeColor(_) => Property::StrokeColor,
            StyleChange::StrokeWidth(_) | StyleChange::StrokeDashArray(_) => Property::StrokeShape,
            StyleChange::Opacity(_) => Property::Opacity,
            StyleChange::FontFamily(_)
            | StyleChange::FontSize(_)
            | StyleChange::FontWeight(_)
            | StyleChange::FontStyle(_)
            | StyleChange::Underline(_)
            | StyleChange::Linethrough(_)
            | StyleChange::TextAlign(_) => Property::Font,
        }
    }

    /// NaN and infinities cannot be serialized into a document.
    fn is_finite(&self) -> bool {
        match self {
            StyleChange::StrokeWidth(v) | StyleChange::Opacity(v) | StyleChange::FontSize(v) => v.is_finite(),
            StyleChange::StrokeDashArray(dash) => dash.iter().all(|v| v.is_finite()),
            _ => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Route {
    /// Set on the object itself.
    Apply,
    /// Write a stroke color into `fill`.
    AsFill,
    /// Forward to each child.
    Children,
    Ignore,
}

fn route(kind: ObjectKind, property: Property) -> Route {
    use ObjectKind as K;
    use Property as P;
    match (kind, property) {
        (_, P::Opacity) => Route::Apply,
        (K::Group, _) => Route::Children,

        (K::Image, P::Fill) => Route::Ignore,
        (K::Textbox, P::StrokeColor) => Route::AsFill,
        (K::Textbox, P::Fill | P::StrokeShape | P::Font) => Route::Apply,

        (K::Rect | K::Circle | K::Ellipse | K::Triangle | K::Polygon | K::Line, P::Font) => Route::Ignore,
        (K::Image, P::Font) => Route::Ignore,

        (K::Rect | K::Circle | K::Ellipse | K::Triangle | K::Polygon | K::Line, P::Fill)
        | (K::Rect | K::Circle | K::Ellipse | K::Triangle | K::Polygon | K::Line | K::Image, P::StrokeColor)
        | (K::Rect | K::Circle | K::Ellipse | K::Triangle | K::Polygon | K::Line | K::Image, P::StrokeShape) => {
            Route::Apply
        }
    }
}

/// Apply `change` to `obj` according to the routing table.
pub fn apply_style(obj: &mut SceneObject, change: &StyleChange) {
    match route(obj.kind(), change.property()) {
        Route::Ignore => {}
        Route::Children => {
            if let Some(group) = obj.group_mut() {
                for child in &mut group.objects {
                    apply_style(child, change);
                }
            }
        }
        Route::AsFill => {
            if let StyleChange::StrokeColor(color) = change {
                obj.fill = Some(color.clone());
            }
        }
        Route::Apply => set_property(obj, change),
    }
}

fn set_property(obj: &mut SceneObject, change: &StyleChange) {
    match change {
        StyleChange::Fill(color) => obj.fill = Some(color.clone()),
        StyleChange::StrokeColor(color) => obj.stroke = Some(color.clone()),
        StyleChange::StrokeWidth(width) => obj.stroke_width = width.max(0.0),
        StyleChange::StrokeDashArray(dash) => obj.stroke_dash_array = Some(dash.clone()),
        StyleChange::Opacity(opacity) => obj.opacity = opacity.clamp(0.0, 1.0),
        font => {
            if let Some(text) = obj.text_mut() {
                match font {
                    StyleChange::FontFamily(family) => text.font_family = family.clone(),
                    StyleChange::FontSize(size) => text.font_size = *size,
                    StyleChange::FontWeight(weight) => text.font_weight = *weight,
                    StyleChange::FontStyle(style) => text.font_style = *style,
                    StyleChange::Underline(on) => text.underline = *on,
                    StyleChange::Linethrough(on) => text.linethrough = *on,
                    StyleChange::TextAlign(align) => text.text_align = *align,
                    _ => {}
                }
            }
        }
    }
}

impl Editor {
    /// Apply `change` to every selected object and record once.
    /// With nothing selected only the session defaults are updated.
    pub fn change_style(&mut self, change: StyleChange) {
        if self.is_disposed() {
            return;
        }
        if !change.is_finite() {
            log::warn!("ignoring non-finite style change: {change:?}");
            return;
        }
        self.remember_default(&change);
        let ids = self.selection().to_vec();
        if ids.is_empty() {
            return;
        }
        for id in ids {
            self.scene.modify(id, Modification::Styled, |obj| apply_style(obj, &change));
        }
        self.commit();
    }

    fn remember_default(&mut self, change: &StyleChange) {
        match change {
            StyleChange::Fill(color) => self.style.fill = color.clone(),
            StyleChange::StrokeColor(color) => self.style.stroke = color.clone(),
            StyleChange::StrokeWidth(width) => self.style.stroke_width = *width,
            StyleChange::StrokeDashArray(dash) => self.style.stroke_dash_array = dash.clone(),
            StyleChange::FontFamily(family) => self.style.font_family = family.clone(),
            _ => {}
        }
    }

    pub fn change_fill_color(&mut self, color: &str) {
        self.change_style(StyleChange::Fill(color.to_string()));
    }

    pub fn change_stroke_color(&mut self, color: &str) {
        self.change_style(StyleChange::StrokeColor(color.to_string()));
    }

    pub fn change_stroke_width(&mut self, width: f64) {
        self.change_style(StyleChange::StrokeWidth(width));
    }

    pub fn change_stroke_dash_array(&mut self, dash: Vec<f64>) {
        self.change_style(StyleChange::StrokeDashArray(dash));
    }

    pub fn change_opacity(&mut self, opacity: f64) {
        self.change_style(StyleChange::Opacity(opacity));
    }

    pub fn change_font_family(&mut self, family: &str) {
        self.change_style(StyleChange::FontFamily(family.to_string()));
    }

    pub fn change_font_size(&mut self, size: f64) {
        self.change_style(StyleChange::FontSize(size));
    }

    pub fn change_font_weight(&mut self, weight: u16) {
        self.change_style(StyleChange::FontWeight(weight));
    }

    pub fn change_font_style(&mut self, style: FontStyle) {
        self.change_style(StyleChange::FontStyle(style));
    }

    pub fn change_font_underline(&mut self, on: bool) {
        self.change_style(StyleChange::Underline(on));
    }

    pub fn change_font_linethrough(&mut self, on: bool) {
        self.change_style(StyleChange::Linethrough(on));
    }

    pub fn change_text_align(&mut self, align: TextAlign) {
        self.change_style(StyleChange::TextAlign(align));
    }

    // Getters read the first selected object.

    fn first_selected(&self) -> Option<&SceneObject> {
        self.selection().first().and_then(|id| self.scene.get(*id))
    }

    pub fn active_fill_color(&self) -> String {
        self.first_selected()
            .and_then(|o| o.fill.clone())
            .unwrap_or_else(|| self.style.fill.clone())
    }

    pub fn active_stroke_color(&self) -> String {
        self.first_selected()
            .and_then(|o| o.stroke.clone())
            .unwrap_or_else(|| self.style.stroke.clone())
    }

    pub fn active_stroke_width(&self) -> f64 {
        self.first_selected()
            .map(|o| o.stroke_width)
            .unwrap_or(self.style.stroke_width)
    }

    pub fn active_stroke_dash_array(&self) -> Vec<f64> {
        self.first_selected()
            .and_then(|o| o.stroke_dash_array.clone())
            .unwrap_or_else(|| self.style.stroke_dash_array.clone())
    }

    pub fn active_opacity(&self) -> f64 {
        self.first_selected().map(|o| o.opacity).unwrap_or(1.0)
    }

    pub fn active_font_family(&self) -> String {
        self.first_selected()
            .and_then(|o| o.text())
            .map(|t| t.font_family.clone())
            .unwrap_or_else(|| self.style.font_family.clone())
    }

    pub fn active_font_size(&self) -> f64 {
        self.first_selected()
            .and_then(|o| o.text())
            .map(|t| t.font_size)
            .unwrap_or(self.style.font_size)
    }

    pub fn active_font_weight(&self) -> u16 {
        self.first_selected()
            .and_then(|o| o.text())
            .map(|t| t.font_weight)
            .unwrap_or(self.style.font_weight)
    }

    pub fn active_font_style(&self) -> FontStyle {
        self.first_selected()
            .and_then(|o| o.text())
            .map(|t| t.font_style)
            .unwrap_or_default()
    }

    pub fn active_text_align(&self) -> TextAlign {
        self.first_selected()
            .and_then(|o| o.text())
            .map(|t| t.text_align)
            .unwrap_or_default()
    }

    pub fn active_font_underline(&self) -> bool {
        self.first_selected()
            .and_then(|o| o.text())
            .is_some_and(|t| t.underline)
    }

    pub fn active_font_linethrough(&self) -> bool {
        self.first_selected()
            .and_then(|o| o.text())
            .is_some_and(|t| t.linethrough)
    }
}
