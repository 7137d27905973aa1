//! Primitive creation commands.

#[cfg(test)]
#[path = "shapes_test.rs"]
mod shapes_test;

use kurbo::Point;

use crate::editor::Editor;
use crate::objects::{SceneObject, Shape, TextData};
use crate::types::ObjectId;

const BOX: f64 = 400.0;
const ROUNDED_RADIUS: f64 = 50.0;
const CIRCLE_RADIUS: f64 = 225.0;
const ELLIPSE_RX: f64 = 200.0;
const ELLIPSE_RY: f64 = 100.0;
const DIAMOND: f64 = 600.0;
const LINE_LENGTH: f64 = 600.0;
const DASH: [f64; 2] = [20.0, 10.0];
const TEXT_WIDTH: f64 = 400.0;

impl Editor {
    /// Center `obj` on the workspace, add it on top and make it the sole selection.
    pub(crate) fn add_to_canvas(&mut self, mut obj: SceneObject) -> Option<ObjectId> {
        if self.is_disposed() {
            return None;
        }
        if let Some(ws) = self.scene.workspace() {
            obj.center_on(ws.center());
        }
        let id = self.scene.add(obj);
        self.scene.set_active(&[id]);
        self.commit();
        log::debug!("added object {id}");
        Some(id)
    }

    fn primitive(&self, shape: Shape, width: f64, height: f64) -> SceneObject {
        SceneObject::new(shape, width, height, &self.style)
    }

    pub fn add_rectangle(&mut self) -> Option<ObjectId> {
        let obj = self.primitive(Shape::Rect { rx: 0.0, ry: 0.0 }, BOX, BOX);
        self.add_to_canvas(obj)
    }

    pub fn add_soft_rectangle(&mut self) -> Option<ObjectId> {
        let obj = self.primitive(Shape::Rect { rx: ROUNDED_RADIUS, ry: ROUNDED_RADIUS }, BOX, BOX);
        self.add_to_canvas(obj)
    }

    pub fn add_circle(&mut self) -> Option<ObjectId> {
        let d = CIRCLE_RADIUS * 2.0;
        let obj = self.primitive(Shape::Circle { radius: CIRCLE_RADIUS }, d, d);
        self.add_to_canvas(obj)
    }

    pub fn add_ellipse(&mut self) -> Option<ObjectId> {
        let obj = self.primitive(
            Shape::Ellipse { rx: ELLIPSE_RX, ry: ELLIPSE_RY },
            ELLIPSE_RX * 2.0,
            ELLIPSE_RY * 2.0,
        );
        self.add_to_canvas(obj)
    }

    pub fn add_triangle(&mut self) -> Option<ObjectId> {
        let obj = self.primitive(Shape::Triangle {}, BOX, BOX);
        self.add_to_canvas(obj)
    }

    pub fn add_inverse_triangle(&mut self) -> Option<ObjectId> {
        let points = vec![Point::new(0.0, 0.0), Point::new(BOX, 0.0), Point::new(BOX / 2.0, BOX)];
        let obj = self.primitive(Shape::Polygon { points }, BOX, BOX);
        self.add_to_canvas(obj)
    }

    pub fn add_diamond(&mut self) -> Option<ObjectId> {
        let half = DIAMOND / 2.0;
        let points = vec![
            Point::new(half, 0.0),
            Point::new(DIAMOND, half),
            Point::new(half, DIAMOND),
            Point::new(0.0, half),
        ];
        let obj = self.primitive(Shape::Polygon { points }, DIAMOND, DIAMOND);
        self.add_to_canvas(obj)
    }

    /// A horizontal line using the session's current dash pattern.
    pub fn add_line(&mut self) -> Option<ObjectId> {
        let obj = self.line();
        self.add_to_canvas(obj)
    }

    pub fn add_dashed_line(&mut self) -> Option<ObjectId> {
        let mut obj = self.line();
        obj.stroke_dash_array = Some(DASH.to_vec());
        self.add_to_canvas(obj)
    }

    fn line(&self) -> SceneObject {
        self.primitive(
            Shape::Line { x1: 0.0, y1: 0.0, x2: LINE_LENGTH, y2: 0.0 },
            LINE_LENGTH,
            0.0,
        )
    }

    pub fn add_text(&mut self, text: &str) -> Option<ObjectId> {
        let data = TextData::new(text, &self.style);
        let height = (data.font_size * 1.16).ceil();
        let mut obj = self.primitive(Shape::Textbox(data), TEXT_WIDTH, height);
        obj.stroke = None;
        obj.stroke_width = 0.0;
        obj.editable = Some(true);
        self.add_to_canvas(obj)
    }
}
