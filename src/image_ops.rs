//! Image loading, filtering and the image commands.
//!
//! Fetching happens outside the editor. A command first issues a
//! `PendingImage` (capturing the target and a liveness token), the host
//! fetches the bytes, and `complete_image` applies the result only if the
//! session is still alive and the target still exists.

#[cfg(test)]
#[path = "image_ops_test.rs"]
mod image_ops_test;

use std::collections::HashMap;
use std::rc::Rc;

use base64::{engine::general_purpose, Engine as _};
use image::{imageops, Rgba, RgbaImage};

use crate::editor::{Editor, LivenessToken, UiSignal};
use crate::error::ImageError;
use crate::objects::{ClipMask, GroupData, ImageData, SceneObject, Shape};
use crate::scene::Modification;
use crate::types::{ImageFilter, ObjectId, ObjectKind};

// ── Sources ─────────────────────────────────────────────────────────

/// Resolves an image reference (URL, data URI, ...) to encoded bytes.
pub trait ImageFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, ImageError>;
}

/// Resolves `data:<mime>;base64,<payload>` references without I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUriFetcher;

impl ImageFetcher for DataUriFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, ImageError> {
        decode_data_uri(reference)
    }
}

pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ImageError> {
    let rest = uri.trim().strip_prefix("data:").ok_or(ImageError::InvalidDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageError::InvalidDataUri)?;
    if !meta.ends_with(";base64") {
        return Err(ImageError::InvalidDataUri);
    }
    general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ImageError::InvalidDataUri)
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

// ── Pixel cache ─────────────────────────────────────────────────────

/// Decoded pixels per source reference, plus filtered variants. Runtime only.
#[derive(Default)]
pub struct ImageCache {
    sources: HashMap<String, Rc<RgbaImage>>,
    filtered: HashMap<String, Rc<RgbaImage>>,
}

fn filter_key(src: &str, filters: &[ImageFilter]) -> String {
    let names: Vec<&str> = filters.iter().map(|f| f.name()).collect();
    format!("{src}#{}", names.join("+"))
}

fn is_identity(filters: &[ImageFilter]) -> bool {
    filters.iter().all(|f| *f == ImageFilter::None)
}

impl ImageCache {
    pub fn contains(&self, src: &str) -> bool {
        self.sources.contains_key(src)
    }

    pub fn insert(&mut self, src: &str, pixels: RgbaImage) -> Rc<RgbaImage> {
        let pixels = Rc::new(pixels);
        self.filtered.retain(|key, _| !key.starts_with(&format!("{src}#")));
        self.sources.insert(src.to_string(), Rc::clone(&pixels));
        pixels
    }

    /// Fetch and decode `src` unless it is already cached.
    pub fn load_from(&mut self, src: &str, fetcher: &dyn ImageFetcher) -> Result<Rc<RgbaImage>, ImageError> {
        if let Some(pixels) = self.sources.get(src) {
            return Ok(Rc::clone(pixels));
        }
        let pixels = decode_image(&fetcher.fetch(src)?)?;
        Ok(self.insert(src, pixels))
    }

    /// Pixels for `src` with `filters` applied, computing them if not cached.
    pub fn pixels(&self, src: &str, filters: &[ImageFilter]) -> Option<Rc<RgbaImage>> {
        let source = self.sources.get(src)?;
        if is_identity(filters) {
            return Some(Rc::clone(source));
        }
        if let Some(hit) = self.filtered.get(&filter_key(src, filters)) {
            return Some(Rc::clone(hit));
        }
        Some(Rc::new(apply_filters(source, filters)))
    }

    /// Recompute and cache the filtered variant for `src`.
    pub fn refresh(&mut self, src: &str, filters: &[ImageFilter]) {
        if is_identity(filters) {
            return;
        }
        let Some(source) = self.sources.get(src) else { return };
        let pixels = apply_filters(source, filters);
        self.filtered.insert(filter_key(src, filters), Rc::new(pixels));
    }

    pub fn clear(&mut self) {
        self.sources.clear();
        self.filtered.clear();
    }
}

// ── Filters ─────────────────────────────────────────────────────────

/// 3x5 color matrices (rows R, G, B; columns r, g, b, a, offset).
const SEPIA: [f32; 15] = [0.393, 0.769, 0.189, 0.0, 0.0, 0.349, 0.686, 0.168, 0.0, 0.0, 0.272, 0.534, 0.131, 0.0, 0.0];
const BROWNIE: [f32; 15] = [
    0.59970, 0.34553, -0.27082, 0.0, 0.186, -0.03770, 0.86095, 0.15059, 0.0, -0.1449, 0.24113, -0.07441, 0.44972, 0.0,
    -0.02965,
];
const VINTAGE: [f32; 15] = [
    0.62793, 0.32021, -0.03965, 0.0, 0.03784, 0.02578, 0.64411, 0.03259, 0.0, 0.02926, 0.04660, -0.08512, 0.52416, 0.0,
    0.02023,
];
const KODACHROME: [f32; 15] = [
    1.12855, -0.39673, -0.03992, 0.0, 0.24991, -0.16404, 1.08352, -0.05498, 0.0, 0.09698, -0.16786, -0.56034, 1.60148,
    0.0, 0.13972,
];
const TECHNICOLOR: [f32; 15] = [
    1.91252, -0.85453, -0.09155, 0.0, 0.04624, -0.30878, 1.76589, -0.10601, 0.0, -0.27589, -0.23110, -0.75018, 1.84759,
    0.0, 0.12137,
];
const POLAROID: [f32; 15] = [1.438, -0.062, -0.062, 0.0, 0.0, -0.122, 1.378, -0.122, 0.0, 0.0, -0.016, -0.016, 1.483, 0.0, 0.0];
const BLACK_AND_WHITE: [f32; 15] = [1.5, 1.5, 1.5, 0.0, -1.0, 1.5, 1.5, 1.5, 0.0, -1.0, 1.5, 1.5, 1.5, 0.0, -1.0];

const SHARPEN: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
const EMBOSS: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 0.7, -1.0, -1.0, -1.0, -1.0];

const PIXEL_BLOCK: u32 = 8;
const REMOVE_DISTANCE: f32 = 0.15;
const BLEND_COLOR: [f32; 3] = [0.0, 1.0, 0.0];
const GAMMA: [f32; 3] = [1.0, 0.5, 2.1];

fn unit(v: u8) -> f32 {
    f32::from(v) / 255.0
}

fn byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn map_pixels(img: &RgbaImage, f: impl Fn([f32; 3]) -> [f32; 3]) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let [r, g, b] = f([unit(px[0]), unit(px[1]), unit(px[2])]);
        *px = Rgba([byte(r), byte(g), byte(b), px[3]]);
    }
    out
}

fn color_matrix(img: &RgbaImage, m: &[f32; 15]) -> RgbaImage {
    map_pixels(img, |[r, g, b]| {
        let row = |i: usize| m[i] * r + m[i + 1] * g + m[i + 2] * b + m[i + 4];
        [row(0), row(5), row(10)]
    })
}

/// Push each channel away from (or toward) the pixel's max channel.
fn push_from_max(img: &RgbaImage, amount: f32, weighted: bool) -> RgbaImage {
    map_pixels(img, |[r, g, b]| {
        let max = r.max(g).max(b);
        let avg = (r + g + b) / 3.0;
        let amt = if weighted { (max - avg).abs() * 2.0 * -amount } else { -amount };
        let adjust = |c: f32| if c == max { c } else { c + (max - c) * amt };
        [adjust(r), adjust(g), adjust(b)]
    })
}

fn pixelate(img: &RgbaImage, block: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let mut out = img.clone();
    for by in (0..h).step_by(block as usize) {
        for bx in (0..w).step_by(block as usize) {
            let sample = *img.get_pixel(bx, by);
            for y in by..(by + block).min(h) {
                for x in bx..(bx + block).min(w) {
                    out.put_pixel(x, y, sample);
                }
            }
        }
    }
    out
}

fn remove_white(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    let limit = REMOVE_DISTANCE * 3.0_f32.sqrt();
    for px in out.pixels_mut() {
        let d = (1.0 - unit(px[0])).hypot(1.0 - unit(px[1])).hypot(1.0 - unit(px[2]));
        if d < limit {
            px[3] = 0;
        }
    }
    out
}

pub fn apply_filter(img: &RgbaImage, filter: ImageFilter) -> RgbaImage {
    match filter {
        ImageFilter::None => img.clone(),
        ImageFilter::Polaroid => color_matrix(img, &POLAROID),
        ImageFilter::Sepia => color_matrix(img, &SEPIA),
        ImageFilter::Kodachrome => color_matrix(img, &KODACHROME),
        ImageFilter::Brownie => color_matrix(img, &BROWNIE),
        ImageFilter::Vintage => color_matrix(img, &VINTAGE),
        ImageFilter::Technicolor => color_matrix(img, &TECHNICOLOR),
        ImageFilter::Blacknwhite => color_matrix(img, &BLACK_AND_WHITE),
        ImageFilter::Contrast => imageops::contrast(img, 30.0),
        ImageFilter::Brightness => imageops::brighten(img, 51),
        ImageFilter::Greyscale => map_pixels(img, |[r, g, b]| {
            let l = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            [l, l, l]
        }),
        ImageFilter::Invert => {
            let mut out = img.clone();
            imageops::invert(&mut out);
            out
        }
        ImageFilter::Pixelate => pixelate(img, PIXEL_BLOCK),
        ImageFilter::Blur => imageops::blur(img, 2.0),
        ImageFilter::Sharpen => imageops::filter3x3(img, &SHARPEN),
        ImageFilter::Emboss => imageops::filter3x3(img, &EMBOSS),
        ImageFilter::Removecolor => remove_white(img),
        ImageFilter::Vibrance => push_from_max(img, 0.5, true),
        ImageFilter::Saturation => push_from_max(img, 0.7, false),
        ImageFilter::Blendcolor => map_pixels(img, |[r, g, b]| [r * BLEND_COLOR[0], g * BLEND_COLOR[1], b * BLEND_COLOR[2]]),
        ImageFilter::Huerotate => imageops::huerotate(img, 90),
        ImageFilter::Resize => {
            let (w, h) = img.dimensions();
            imageops::resize(img, (w / 2).max(1), (h / 2).max(1), imageops::FilterType::Triangle)
        }
        ImageFilter::Gamma => map_pixels(img, |[r, g, b]| {
            [r.powf(1.0 / GAMMA[0]), g.powf(1.0 / GAMMA[1]), b.powf(1.0 / GAMMA[2])]
        }),
    }
}

pub fn apply_filters(img: &RgbaImage, filters: &[ImageFilter]) -> RgbaImage {
    filters.iter().fold(img.clone(), |acc, f| apply_filter(&acc, *f))
}

// ── Commands ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageRequest {
    /// Insert a new image fitted into the workspace.
    Add,
    /// Swap the source of an image, keeping its placement and displayed size.
    Replace(ObjectId),
    /// Swap the source in place at its natural size (edited pixels).
    Edit(ObjectId),
    /// Replace with a rectangular crop of the original.
    CropRect(ObjectId),
    /// Replace with a group clipped to a circle.
    CropCircle(ObjectId),
}

/// An image command waiting for its bytes.
#[derive(Clone, Debug)]
pub struct PendingImage {
    token: LivenessToken,
    reference: String,
    request: ImageRequest,
}

impl Editor {
    fn active_image_id(&self) -> Option<ObjectId> {
        self.active_object().filter(|o| o.kind() == ObjectKind::Image).map(|o| o.id)
    }

    fn pending(&self, reference: &str, request: ImageRequest) -> Option<PendingImage> {
        if self.is_disposed() {
            return None;
        }
        Some(PendingImage { token: self.token(), reference: reference.to_string(), request })
    }

    pub fn request_add_image(&self, reference: &str) -> Option<PendingImage> {
        self.pending(reference, ImageRequest::Add)
    }

    pub fn request_replace_image(&self, reference: &str) -> Option<PendingImage> {
        let target = self.active_image_id()?;
        self.pending(reference, ImageRequest::Replace(target))
    }

    pub fn request_edit_image(&self, reference: &str) -> Option<PendingImage> {
        let target = self.active_image_id()?;
        self.pending(reference, ImageRequest::Edit(target))
    }

    pub fn request_crop_image(&self, reference: &str) -> Option<PendingImage> {
        let target = self.active_image_id()?;
        self.pending(reference, ImageRequest::CropRect(target))
    }

    pub fn request_crop_circle(&self, reference: &str) -> Option<PendingImage> {
        let target = self.active_image_id()?;
        self.pending(reference, ImageRequest::CropCircle(target))
    }

    /// Report that fetching failed for `pending`.
    pub fn fail_image(&mut self, pending: &PendingImage, err: &ImageError) {
        if !pending.token.belongs_to(self) {
            return;
        }
        log::warn!("image {} failed: {err}", pending.reference);
        self.signals.push(UiSignal::ImageFailed(err.to_string()));
    }

    /// Fetch through `fetcher` and complete in one step.
    pub fn load_image(&mut self, pending: PendingImage, fetcher: &dyn ImageFetcher) -> Result<ObjectId, ImageError> {
        match fetcher.fetch(&pending.reference) {
            Ok(bytes) => self.complete_image(pending, &bytes),
            Err(err) => {
                self.fail_image(&pending, &err);
                Err(err)
            }
        }
    }

    /// Apply fetched bytes. Late completions (after dispose, or from another
    /// session) return `SessionEnded` without touching anything.
    pub fn complete_image(&mut self, pending: PendingImage, bytes: &[u8]) -> Result<ObjectId, ImageError> {
        if !pending.token.is_live() || !pending.token.belongs_to(self) || self.is_disposed() {
            log::debug!("dropping late image {}", pending.reference);
            return Err(ImageError::SessionEnded);
        }
        let result = decode_image(bytes).and_then(|pixels| self.place_image(&pending, pixels));
        if let Err(err) = &result {
            self.fail_image(&pending, err);
        }
        result
    }

    fn place_image(&mut self, pending: &PendingImage, pixels: RgbaImage) -> Result<ObjectId, ImageError> {
        let (w, h) = pixels.dimensions();
        let (w, h) = (f64::from(w), f64::from(h));
        let src = pending.reference.clone();

        match pending.request {
            ImageRequest::Add => {
                self.scene.images_mut().insert(&src, pixels);
                let mut obj = SceneObject::new(
                    Shape::Image(ImageData { src, filters: Vec::new(), clip_path: None }),
                    w,
                    h,
                    &self.style,
                );
                obj.stroke = None;
                obj.stroke_width = 0.0;
                if let Some(ws) = self.scene.workspace() {
                    let (ww, wh) = ws.scaled_size();
                    let scale = (ww / w).min(wh / h);
                    if scale.is_finite() && scale > 0.0 {
                        obj.scale_x = scale;
                        obj.scale_y = scale;
                    }
                }
                self.add_to_canvas(obj).ok_or(ImageError::SessionEnded)
            }
            ImageRequest::Replace(target) => {
                let filters = self.image_filters(target)?;
                self.scene.images_mut().insert(&src, pixels);
                self.scene.images_mut().refresh(&src, &filters);
                self.scene.modify(target, Modification::Styled, |obj| {
                    let (dw, dh) = obj.scaled_size();
                    obj.width = w;
                    obj.height = h;
                    obj.scale_x = dw / w;
                    obj.scale_y = dh / h;
                    if let Some(image) = obj.image_mut() {
                        image.src = src;
                    }
                });
                self.commit();
                Ok(target)
            }
            ImageRequest::Edit(target) | ImageRequest::CropRect(target) => {
                let filters = self.image_filters(target)?;
                self.scene.images_mut().insert(&src, pixels);
                self.scene.images_mut().refresh(&src, &filters);
                self.scene.modify(target, Modification::Styled, |obj| {
                    obj.width = w;
                    obj.height = h;
                    if let Some(image) = obj.image_mut() {
                        image.src = src;
                    }
                });
                self.commit();
                Ok(target)
            }
            ImageRequest::CropCircle(target) => {
                let filters = self.image_filters(target)?;
                self.crop_to_circle(target, src, pixels, filters)
            }
        }
    }

    fn image_filters(&self, target: ObjectId) -> Result<Vec<ImageFilter>, ImageError> {
        self.scene
            .get(target)
            .and_then(|o| o.image())
            .map(|i| i.filters.clone())
            .ok_or(ImageError::NoTarget)
    }

    /// Replace `target` with a circle-clipped group holding the new image at
    /// the same place and displayed size.
    fn crop_to_circle(
        &mut self,
        target: ObjectId,
        src: String,
        pixels: RgbaImage,
        filters: Vec<ImageFilter>,
    ) -> Result<ObjectId, ImageError> {
        let index = self.scene.index_of(target).ok_or(ImageError::NoTarget)?;
        let original = self.scene.remove(target).ok_or(ImageError::NoTarget)?;
        let (w, h) = pixels.dimensions();
        let (w, h) = (f64::from(w), f64::from(h));
        self.scene.images_mut().insert(&src, pixels);
        self.scene.images_mut().refresh(&src, &filters);

        let (dw, dh) = original.scaled_size();
        let mut image = SceneObject::new(Shape::Image(ImageData { src, filters, clip_path: None }), w, h, &self.style);
        image.stroke = None;
        image.stroke_width = 0.0;
        image.scale_x = dw / w;
        image.scale_y = dh / h;

        let mut group = SceneObject::new(
            Shape::Group(GroupData { objects: vec![image], clip_path: Some(ClipMask::inscribed_circle(dw, dh)) }),
            dw,
            dh,
            &self.style,
        );
        group.left = original.left;
        group.top = original.top;
        group.angle = original.angle;
        group.opacity = original.opacity;
        group.fill = None;
        group.stroke = None;
        group.stroke_width = 0.0;
        group.stroke_dash_array = None;

        let gid = self.scene.insert(index, group);
        self.scene.set_active(&[gid]);
        self.commit();
        Ok(gid)
    }

    /// Decode bytes for a source referenced by a loaded document.
    pub fn provide_image(&mut self, src: &str, bytes: &[u8]) -> Result<(), ImageError> {
        if self.is_disposed() {
            return Err(ImageError::SessionEnded);
        }
        let pixels = decode_image(bytes)?;
        self.scene.images_mut().insert(src, pixels);
        let chains: Vec<Vec<ImageFilter>> = self
            .scene
            .objects()
            .iter()
            .filter_map(|o| o.image())
            .filter(|i| i.src == src)
            .map(|i| i.filters.clone())
            .collect();
        for filters in chains {
            self.scene.images_mut().refresh(src, &filters);
        }
        Ok(())
    }

    /// Replace the filter chain of each selected image with `name`
    /// (`none` clears it). Unknown names change nothing.
    pub fn apply_filter(&mut self, name: &str) -> bool {
        if self.is_disposed() {
            return false;
        }
        let filter: ImageFilter = match name.parse() {
            Ok(f) => f,
            Err(err) => {
                log::warn!("{err}");
                return false;
            }
        };
        let chain = if filter == ImageFilter::None { Vec::new() } else { vec![filter] };
        let targets: Vec<(ObjectId, String)> = self
            .selected_objects()
            .into_iter()
            .filter_map(|o| o.image().map(|i| (o.id, i.src.clone())))
            .collect();
        if targets.is_empty() {
            return false;
        }
        for (id, src) in targets {
            self.scene.images_mut().refresh(&src, &chain);
            let chain = chain.clone();
            self.scene.modify(id, Modification::Styled, |obj| {
                if let Some(image) = obj.image_mut() {
                    image.filters = chain;
                }
            });
        }
        self.commit();
        true
    }

    /// Non-destructive circular clip on each selected image.
    pub fn clip_image_to_circle(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        let targets: Vec<ObjectId> = self
            .selected_objects()
            .into_iter()
            .filter(|o| o.kind() == ObjectKind::Image)
            .map(|o| o.id)
            .collect();
        if targets.is_empty() {
            return false;
        }
        for id in targets {
            self.scene.modify(id, Modification::Styled, |obj| {
                let mask = ClipMask::inscribed_circle(obj.width, obj.height);
                if let Some(image) = obj.image_mut() {
                    image.clip_path = Some(mask);
                }
            });
        }
        self.commit();
        true
    }
}
