//! Software rasterizer for raster export.
//!
//! Objects are flattened into world-space layers (vector outline or bitmap,
//! with inherited opacity and clip masks) and composited source-over, one
//! pixel sample per pixel center. Text is not rasterized and dash patterns
//! are drawn solid.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::rc::Rc;

use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape as _};

use crate::color::{blend_over, parse_css_color};
use crate::image_ops::ImageCache;
use crate::objects::{bbox_of, ClipMask, SceneObject, Shape};
use crate::scene::Scene;

const FLATTEN_TOLERANCE: f64 = 0.25;

#[derive(Clone, Copy)]
struct Clip {
    inverse: Affine,
    mask: ClipMask,
}

impl Clip {
    fn admits(&self, pt: Point) -> bool {
        self.mask.contains(self.inverse * pt)
    }
}

struct Stroke {
    color: Rgba<u8>,
    half_width: f64,
    segments: Vec<(Point, Point)>,
}

impl Stroke {
    fn covers(&self, pt: Point) -> bool {
        self.segments
            .iter()
            .any(|(a, b)| distance_to_segment(pt, *a, *b) <= self.half_width)
    }
}

enum Paint {
    Vector { path: BezPath, fill: Option<Rgba<u8>>, stroke: Option<Stroke> },
    Bitmap { inverse: Affine, width: f64, height: f64, pixels: Rc<RgbaImage> },
}

struct Layer {
    paint: Paint,
    opacity: f64,
    clips: Vec<Clip>,
    bounds: Rect,
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

fn segments_of(path: &BezPath) -> Vec<(Point, Point)> {
    let mut segments = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    path.flatten(FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            start = p;
            last = p;
        }
        PathEl::LineTo(p) => {
            segments.push((last, p));
            last = p;
        }
        PathEl::ClosePath => {
            if last != start {
                segments.push((last, start));
            }
            last = start;
        }
        _ => {}
    });
    segments
}

fn vector_layer(obj: &SceneObject, t: Affine, opacity: f64, clips: &[Clip]) -> Option<Layer> {
    let mut path = obj.outline()?;
    path.apply_affine(t);
    let fill = match obj.shape {
        Shape::Line { .. } => None,
        _ => obj.fill.as_deref().and_then(parse_css_color),
    };
    let scale = t.determinant().abs().sqrt();
    let stroke = match obj.stroke.as_deref().and_then(parse_css_color) {
        Some(color) if obj.stroke_width > 0.0 => Some(Stroke {
            color,
            half_width: obj.stroke_width * scale / 2.0,
            segments: segments_of(&path),
        }),
        _ => None,
    };
    if fill.is_none() && stroke.is_none() {
        return None;
    }
    let pad = stroke.as_ref().map_or(0.0, |s| s.half_width);
    let bounds = path.bounding_box().inflate(pad, pad);
    Some(Layer { paint: Paint::Vector { path, fill, stroke }, opacity, clips: clips.to_vec(), bounds })
}

fn collect_layers(
    objects: &[SceneObject],
    parent: Affine,
    parent_opacity: f64,
    clips: &[Clip],
    images: &ImageCache,
    out: &mut Vec<Layer>,
) {
    for obj in objects.iter().filter(|o| o.visible) {
        let t = parent * obj.transform();
        let opacity = parent_opacity * obj.opacity;
        match &obj.shape {
            Shape::Textbox(_) => {}
            Shape::Group(group) => {
                let mut inner = clips.to_vec();
                if let Some(mask) = group.clip_path {
                    inner.push(Clip { inverse: t.inverse(), mask });
                }
                collect_layers(&group.objects, t, opacity, &inner, images, out);
            }
            Shape::Image(image) => {
                let Some(pixels) = images.pixels(&image.src, &image.filters) else {
                    log::debug!("no pixels for {}, skipping", image.src);
                    continue;
                };
                let mut own = clips.to_vec();
                if let Some(mask) = image.clip_path {
                    own.push(Clip { inverse: t.inverse(), mask });
                }
                out.push(Layer {
                    paint: Paint::Bitmap { inverse: t.inverse(), width: obj.width, height: obj.height, pixels },
                    opacity,
                    clips: own,
                    bounds: bbox_of(t, obj.local_bounds()),
                });
            }
            _ => {
                if let Some(layer) = vector_layer(obj, t, opacity, clips) {
                    out.push(layer);
                }
            }
        }
    }
}

/// Pixel range `[lo, hi)` along one axis covered by `lo_world..hi_world`.
fn span(lo_world: f64, hi_world: f64, origin: f64, size: u32) -> (u32, u32) {
    let max = f64::from(size);
    let lo = (lo_world - origin).floor().clamp(0.0, max);
    let hi = (hi_world - origin).ceil().clamp(0.0, max);
    (lo as u32, hi as u32)
}

fn paint_layer(out: &mut RgbaImage, region: Rect, layer: &Layer) {
    let (w, h) = out.dimensions();
    let (x0, x1) = span(layer.bounds.x0, layer.bounds.x1, region.x0, w);
    let (y0, y1) = span(layer.bounds.y0, layer.bounds.y1, region.y0, h);
    for y in y0..y1 {
        for x in x0..x1 {
            let pt = Point::new(region.x0 + f64::from(x) + 0.5, region.y0 + f64::from(y) + 0.5);
            if !layer.clips.iter().all(|c| c.admits(pt)) {
                continue;
            }
            let dst = out.get_pixel_mut(x, y);
            match &layer.paint {
                Paint::Vector { path, fill, stroke } => {
                    if let Some(color) = fill {
                        if path.contains(pt) {
                            blend_over(dst, *color, layer.opacity);
                        }
                    }
                    if let Some(stroke) = stroke {
                        if stroke.covers(pt) {
                            blend_over(dst, stroke.color, layer.opacity);
                        }
                    }
                }
                Paint::Bitmap { inverse, width, height, pixels } => {
                    let local = *inverse * pt;
                    if local.x < 0.0 || local.y < 0.0 || local.x >= *width || local.y >= *height {
                        continue;
                    }
                    let (pw, ph) = pixels.dimensions();
                    let sx = ((local.x / width * f64::from(pw)) as u32).min(pw.saturating_sub(1));
                    let sy = ((local.y / height * f64::from(ph)) as u32).min(ph.saturating_sub(1));
                    blend_over(dst, *pixels.get_pixel(sx, sy), layer.opacity);
                }
            }
        }
    }
}

impl Scene {
    /// Render `region` (world coordinates) at one pixel per world unit.
    pub fn rasterize(&self, region: Rect) -> RgbaImage {
        let w = region.width().ceil().max(0.0) as u32;
        let h = region.height().ceil().max(0.0) as u32;
        let mut out = RgbaImage::new(w, h);
        if let Some(color) = self.background().and_then(parse_css_color) {
            for px in out.pixels_mut() {
                blend_over(px, color, 1.0);
            }
        }
        let mut layers = Vec::new();
        collect_layers(self.objects(), Affine::IDENTITY, 1.0, &[], self.images(), &mut layers);
        for layer in &layers {
            paint_layer(&mut out, region, layer);
        }
        out
    }
}
