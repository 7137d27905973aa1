//! Scene objects.
//!
//! A `SceneObject` is the common transform/paint envelope; the per-variant
//! payload lives in the tagged union `Shape`, serialized inline with a
//! `"type"` discriminator. Every field that serde sees is persisted; runtime
//! state (`id`, `baseline`, text edit buffers) is `#[serde(skip)]`.

#[cfg(test)]
#[path = "objects_test.rs"]
mod objects_test;

use kurbo::{Affine, BezPath, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::StyleDefaults;
use crate::types::{deserialize_font_weight, FontStyle, ImageFilter, ObjectKind, ObjectId, TextAlign};

/// Name carried by the distinguished workspace rectangle.
pub const WORKSPACE_NAME: &str = "clip";

const DECOMPOSE_EPSILON: f64 = 1e-12;

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

fn default_font_family() -> String {
    StyleDefaults::default().font_family
}

fn default_font_size() -> f64 {
    StyleDefaults::default().font_size
}

fn default_font_weight() -> u16 {
    StyleDefaults::default().font_weight
}

/// Circular clip in the owner's local coordinates.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClipMask {
    Circle { cx: f64, cy: f64, radius: f64 },
}

impl ClipMask {
    /// Largest circle centered in a `width` x `height` box.
    pub fn inscribed_circle(width: f64, height: f64) -> Self {
        ClipMask::Circle { cx: width / 2.0, cy: height / 2.0, radius: width.min(height) / 2.0 }
    }

    pub fn contains(&self, local: Point) -> bool {
        match *self {
            ClipMask::Circle { cx, cy, radius } => {
                let dx = local.x - cx;
                let dy = local.y - cy;
                dx * dx + dy * dy <= radius * radius
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_weight", deserialize_with = "deserialize_font_weight")]
    pub font_weight: u16,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub linethrough: bool,
    #[serde(default)]
    pub text_align: TextAlign,
    /// Uncommitted in-canvas edit buffer.
    #[serde(skip)]
    pub editing: Option<String>,
}

impl TextData {
    pub fn new(text: &str, style: &StyleDefaults) -> Self {
        TextData {
            text: text.to_string(),
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            font_weight: style.font_weight,
            font_style: FontStyle::Normal,
            underline: false,
            linethrough: false,
            text_align: TextAlign::Left,
            editing: None,
        }
    }

    /// Fold the edit buffer into the persisted text. Returns true if the text changed.
    pub fn commit_editing(&mut self) -> bool {
        match self.editing.take() {
            Some(buffer) if buffer != self.text => {
                self.text = buffer;
                true
            }
            _ => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub src: String,
    #[serde(default)]
    pub filters: Vec<ImageFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<ClipMask>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    /// Children in group-local coordinates, in paint order.
    pub objects: Vec<SceneObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<ClipMask>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect {
        #[serde(default)]
        rx: f64,
        #[serde(default)]
        ry: f64,
    },
    Circle {
        radius: f64,
    },
    Ellipse {
        rx: f64,
        ry: f64,
    },
    Triangle {},
    Polygon {
        points: Vec<Point>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    #[serde(alias = "text", alias = "i-text")]
    Textbox(TextData),
    Image(ImageData),
    Group(GroupData),
}

impl Shape {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Shape::Rect { .. } => ObjectKind::Rect,
            Shape::Circle { .. } => ObjectKind::Circle,
            Shape::Ellipse { .. } => ObjectKind::Ellipse,
            Shape::Triangle {} => ObjectKind::Triangle,
            Shape::Polygon { .. } => ObjectKind::Polygon,
            Shape::Line { .. } => ObjectKind::Line,
            Shape::Textbox(_) => ObjectKind::Textbox,
            Shape::Image(_) => ObjectKind::Image,
            Shape::Group(_) => ObjectKind::Group,
        }
    }
}

/// Position recorded when the object entered the scene; move-lock reverts to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub left: f64,
    pub top: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    #[serde(skip)]
    pub id: ObjectId,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Clockwise rotation in degrees around (left, top).
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub stroke: Option<String>,
    #[serde(default)]
    pub stroke_width: f64,
    #[serde(default)]
    pub stroke_dash_array: Option<Vec<f64>>,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default = "yes")]
    pub visible: bool,

    // Persisted metadata (see `document::PERSISTED_KEYS`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "yes")]
    pub selectable: bool,
    #[serde(default = "yes")]
    pub has_controls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_angle: Option<f64>,

    #[serde(skip)]
    pub baseline: Option<Baseline>,
}

impl SceneObject {
    /// A new object with the session's default paint.
    pub fn new(shape: Shape, width: f64, height: f64, style: &StyleDefaults) -> Self {
        SceneObject {
            id: 0,
            shape,
            left: 0.0,
            top: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            fill: Some(style.fill.clone()),
            stroke: Some(style.stroke.clone()),
            stroke_width: style.stroke_width,
            stroke_dash_array: Some(style.stroke_dash_array.clone()),
            opacity: 1.0,
            visible: true,
            name: None,
            selectable: true,
            has_controls: true,
            editable: None,
            link_data: None,
            extension_type: None,
            extension: None,
            gradient_angle: None,
            baseline: None,
        }
    }

    /// The workspace rectangle: fixed canvas bounds, not selectable, no controls.
    pub fn workspace(width: f64, height: f64, fill: &str) -> Self {
        SceneObject {
            fill: Some(fill.to_string()),
            stroke: None,
            stroke_width: 0.0,
            stroke_dash_array: None,
            name: Some(WORKSPACE_NAME.to_string()),
            selectable: false,
            has_controls: false,
            ..SceneObject::new(Shape::Rect { rx: 0.0, ry: 0.0 }, width, height, &StyleDefaults::default())
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }

    pub fn is_workspace(&self) -> bool {
        self.name.as_deref() == Some(WORKSPACE_NAME)
    }

    pub fn text(&self) -> Option<&TextData> {
        match &self.shape {
            Shape::Textbox(t) => Some(t),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextData> {
        match &mut self.shape {
            Shape::Textbox(t) => Some(t),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&ImageData> {
        match &self.shape {
            Shape::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageData> {
        match &mut self.shape {
            Shape::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn group(&self) -> Option<&GroupData> {
        match &self.shape {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn group_mut(&mut self) -> Option<&mut GroupData> {
        match &mut self.shape {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Local-to-parent transform: translate, rotate about (left, top), then scale/flip.
    pub fn transform(&self) -> Affine {
        let sx = if self.flip_x { -self.scale_x } else { self.scale_x };
        let sy = if self.flip_y { -self.scale_y } else { self.scale_y };
        Affine::translate(Vec2::new(self.left, self.top))
            * Affine::rotate(self.angle.to_radians())
            * Affine::scale_non_uniform(sx, sy)
    }

    /// Replace left/top/angle/scale/flip with the decomposition of `t`.
    /// Skew is not representable and is dropped. A mirror keeps the flip
    /// axis the object already had (`flip_y` if it had none), and the angle
    /// stays within half a turn of the previous one.
    pub fn set_transform(&mut self, t: Affine) {
        let [a, b, c, d, e, f] = t.as_coeffs();
        let det = a * d - b * c;
        let (flip_x, flip_y) = match (det < 0.0, self.flip_x, self.flip_y) {
            (true, true, false) => (true, false),
            (true, _, _) => (false, true),
            (false, true, true) => (true, true),
            (false, _, _) => (false, false),
        };
        let sx = a.hypot(b);
        let (sy, angle) = if sx > DECOMPOSE_EPSILON {
            let angle = if flip_x { (-b).atan2(-a) } else { b.atan2(a) };
            (det.abs() / sx, angle.to_degrees())
        } else {
            (c.hypot(d), 0.0)
        };
        let turns = ((self.angle - angle) / 360.0).round();

        self.left = e + 0.0;
        self.top = f + 0.0;
        self.angle = angle + turns * 360.0 + 0.0;
        self.scale_x = sx;
        self.scale_y = sy;
        self.flip_x = flip_x;
        self.flip_y = flip_y;
    }

    pub fn local_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Axis-aligned bounds in the coordinate space of `parent`.
    pub fn bounds_in(&self, parent: Affine) -> Rect {
        bbox_of(parent * self.transform(), self.local_bounds())
    }

    pub fn world_bounds(&self) -> Rect {
        self.bounds_in(Affine::IDENTITY)
    }

    /// Size as displayed (intrinsic size times scale).
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width * self.scale_x, self.height * self.scale_y)
    }

    pub fn center(&self) -> Point {
        self.transform() * Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.top += dy;
    }

    /// Move so that the object's visual center lands on `target`.
    pub fn center_on(&mut self, target: Point) {
        let delta = target - self.center();
        self.translate(delta.x, delta.y);
    }

    /// Hit test in parent space, with `slop` extra tolerance for thin shapes.
    pub fn contains(&self, pt: Point, slop: f64) -> bool {
        let local = self.transform().inverse() * pt;
        let b = self.local_bounds();
        let sx = self.scale_x.abs().max(DECOMPOSE_EPSILON);
        let sy = self.scale_y.abs().max(DECOMPOSE_EPSILON);
        local.x >= b.x0 - slop / sx
            && local.x <= b.x1 + slop / sx
            && local.y >= b.y0 - slop / sy
            && local.y <= b.y1 + slop / sy
    }

    /// Outline in local coordinates. Lines are open; text has none.
    pub fn outline(&self) -> Option<BezPath> {
        const TOLERANCE: f64 = 0.1;
        match &self.shape {
            Shape::Rect { rx, ry } => {
                let radius = rx.min(*ry).max(0.0).min(self.width.min(self.height) / 2.0);
                if radius > 0.0 {
                    Some(kurbo::RoundedRect::new(0.0, 0.0, self.width, self.height, radius).to_path(TOLERANCE))
                } else {
                    Some(self.local_bounds().to_path(TOLERANCE))
                }
            }
            Shape::Circle { radius } => {
                Some(kurbo::Circle::new(Point::new(*radius, *radius), *radius).to_path(TOLERANCE))
            }
            Shape::Ellipse { rx, ry } => {
                Some(kurbo::Ellipse::new(Point::new(*rx, *ry), Vec2::new(*rx, *ry), 0.0).to_path(TOLERANCE))
            }
            Shape::Triangle {} => Some(polygon_path(&[
                Point::new(self.width / 2.0, 0.0),
                Point::new(self.width, self.height),
                Point::new(0.0, self.height),
            ])),
            Shape::Polygon { points } => Some(polygon_path(points)),
            Shape::Line { x1, y1, x2, y2 } => {
                let mut path = BezPath::new();
                path.move_to(Point::new(*x1, *y1));
                path.line_to(Point::new(*x2, *y2));
                Some(path)
            }
            Shape::Image(_) | Shape::Group(_) => Some(self.local_bounds().to_path(TOLERANCE)),
            Shape::Textbox(_) => None,
        }
    }

    /// Visit this object and all descendants.
    pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut SceneObject)) {
        f(self);
        if let Some(group) = self.group_mut() {
            for child in &mut group.objects {
                child.for_each_mut(f);
            }
        }
    }
}

pub fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Axis-aligned bounding box of `rect` mapped through `t`.
pub fn bbox_of(t: Affine, rect: Rect) -> Rect {
    let corners = [
        t * Point::new(rect.x0, rect.y0),
        t * Point::new(rect.x1, rect.y0),
        t * Point::new(rect.x1, rect.y1),
        t * Point::new(rect.x0, rect.y1),
    ];
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in corners {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x, max_y)
}
