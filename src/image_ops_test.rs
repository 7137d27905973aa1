use super::*;
use crate::config::EditorConfig;
use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;

fn png_bytes(w: u32, h: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, Rgba(color));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("encode");
    bytes
}

fn png_uri(w: u32, h: u32, color: [u8; 4]) -> String {
    encode_data_uri("image/png", &png_bytes(w, h, color))
}

fn editor_with_image(w: u32, h: u32) -> (Editor, ObjectId) {
    let mut editor = Editor::new(EditorConfig::default());
    let pending = editor.request_add_image(&png_uri(w, h, [200, 10, 10, 255])).expect("pending");
    let id = editor.load_image(pending, &DataUriFetcher).expect("image");
    (editor, id)
}

#[test]
fn data_uri_round_trip() {
    let uri = encode_data_uri("image/png", &[1, 2, 3]);
    assert!(uri.starts_with("data:image/png;base64,"));
    assert_eq!(decode_data_uri(&uri).expect("decode"), vec![1, 2, 3]);
}

#[test]
fn data_uri_rejects_other_schemes() {
    assert!(matches!(decode_data_uri("https://example.com/a.png"), Err(ImageError::InvalidDataUri)));
    assert!(matches!(decode_data_uri("data:image/png,raw"), Err(ImageError::InvalidDataUri)));
    assert!(matches!(decode_data_uri("data:image/png;base64,@@@"), Err(ImageError::InvalidDataUri)));
}

#[test]
fn added_image_fits_workspace_and_is_centered() {
    let (editor, id) = editor_with_image(1800, 1200);
    let obj = editor.object(id).expect("image");
    assert_eq!((obj.width, obj.height), (1800.0, 1200.0));
    assert!((obj.scale_x - 0.5).abs() < 1e-9);
    assert_eq!(obj.scale_x, obj.scale_y);
    let c = obj.center();
    assert!((c.x - 450.0).abs() < 1e-6 && (c.y - 600.0).abs() < 1e-6);
    assert_eq!(editor.selection(), &[id]);
    let src = &obj.image().expect("image data").src;
    assert!(editor.scene().images().contains(src));
}

#[test]
fn undecodable_bytes_signal_and_leave_scene_alone() {
    let mut editor = Editor::new(EditorConfig::default());
    let pending = editor.request_add_image("broken.png").expect("pending");
    let result = editor.complete_image(pending, b"not an image");
    assert!(matches!(result, Err(ImageError::Decode(_))));
    assert_eq!(editor.objects().len(), 1);
    assert!(matches!(editor.drain_signals().as_slice(), [UiSignal::ImageFailed(_)]));
}

#[test]
fn completion_after_dispose_is_ignored() {
    let mut editor = Editor::new(EditorConfig::default());
    let pending = editor.request_add_image("late.png").expect("pending");
    editor.dispose();
    let result = editor.complete_image(pending, &png_bytes(2, 2, [0, 0, 0, 255]));
    assert!(matches!(result, Err(ImageError::SessionEnded)));
    assert!(editor.objects().is_empty());
    assert!(editor.drain_signals().is_empty());
}

#[test]
fn completion_from_another_editor_is_refused() {
    let first = Editor::new(EditorConfig::default());
    let mut second = Editor::new(EditorConfig::default());
    let pending = first.request_add_image("x.png").expect("pending");
    let result = second.complete_image(pending, &png_bytes(2, 2, [0, 0, 0, 255]));
    assert!(matches!(result, Err(ImageError::SessionEnded)));
    assert_eq!(second.objects().len(), 1);
}

#[test]
fn image_requests_need_an_active_image() {
    let mut editor = Editor::new(EditorConfig::default());
    assert!(editor.request_replace_image("a.png").is_none());
    editor.add_rectangle().expect("rect");
    assert!(editor.request_crop_circle("a.png").is_none());
}

#[test]
fn replace_keeps_placement_and_displayed_size() {
    let (mut editor, id) = editor_with_image(200, 100);
    let before = editor.object(id).cloned().expect("image");
    let pending = editor.request_replace_image("replacement.png").expect("pending");
    editor
        .complete_image(pending, &png_bytes(50, 50, [0, 0, 255, 255]))
        .expect("replace");
    let after = editor.object(id).expect("image");
    assert_eq!(after.image().map(|i| i.src.as_str()), Some("replacement.png"));
    assert_eq!((after.left, after.top), (before.left, before.top));
    let (bw, bh) = before.scaled_size();
    let (aw, ah) = after.scaled_size();
    assert!((aw - bw).abs() < 1e-9 && (ah - bh).abs() < 1e-9);
    assert_eq!(editor.index_of_object(id), Some(1));
}

#[test]
fn crop_circle_replaces_image_with_clipped_group() {
    let (mut editor, id) = editor_with_image(300, 200);
    editor.apply_filter("sepia");
    let before = editor.object(id).cloned().expect("image");
    let pending = editor.request_crop_circle("cropped.png").expect("pending");
    let gid = editor
        .complete_image(pending, &png_bytes(300, 200, [10, 200, 10, 255]))
        .expect("crop");
    assert!(editor.object(id).is_none());
    let group = editor.object(gid).expect("group");
    assert_eq!((group.left, group.top), (before.left, before.top));
    let data = group.group().expect("group data");
    let (dw, dh) = before.scaled_size();
    assert_eq!(data.clip_path, Some(ClipMask::inscribed_circle(dw, dh)));
    assert_eq!(data.objects[0].image().map(|i| i.filters.clone()), Some(vec![ImageFilter::Sepia]));
    assert_eq!(editor.selection(), &[gid]);
}

#[test]
fn unknown_filter_is_a_noop() {
    let (mut editor, _) = editor_with_image(4, 4);
    let len = editor.history_len();
    assert!(!editor.apply_filter("oil-paint"));
    assert_eq!(editor.history_len(), len);
}

#[test]
fn filter_none_clears_chain() {
    let (mut editor, id) = editor_with_image(4, 4);
    assert!(editor.apply_filter("Greyscale"));
    assert_eq!(editor.object(id).and_then(|o| o.image()).map(|i| i.filters.len()), Some(1));
    assert!(editor.apply_filter("none"));
    assert_eq!(editor.object(id).and_then(|o| o.image()).map(|i| i.filters.len()), Some(0));
}

#[test]
fn clip_to_circle_is_non_destructive() {
    let (mut editor, id) = editor_with_image(100, 50);
    assert!(editor.clip_image_to_circle());
    let obj = editor.object(id).expect("image");
    assert_eq!(obj.kind(), ObjectKind::Image);
    assert_eq!(
        obj.image().and_then(|i| i.clip_path),
        Some(ClipMask::Circle { cx: 50.0, cy: 25.0, radius: 25.0 })
    );
}

#[test]
fn every_filter_preserves_or_halves_dimensions() {
    let img = RgbaImage::from_fn(16, 8, |x, y| Rgba([(x * 16) as u8, (y * 32) as u8, 128, 255]));
    for filter in ImageFilter::ALL {
        let out = apply_filter(&img, filter);
        if filter == ImageFilter::Resize {
            assert_eq!(out.dimensions(), (8, 4));
        } else {
            assert_eq!(out.dimensions(), (16, 8), "{filter}");
        }
    }
}

#[test]
fn greyscale_and_invert_behave() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 200]));
    let grey = apply_filter(&img, ImageFilter::Greyscale);
    let px = grey.get_pixel(0, 0);
    assert_eq!(px[0], px[1]);
    assert_eq!(px[3], 200);
    let inv = apply_filter(&img, ImageFilter::Invert);
    assert_eq!(inv.get_pixel(0, 0).0[..3], [0, 255, 255]);
}

#[test]
fn remove_color_clears_white() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
    assert_eq!(apply_filter(&img, ImageFilter::Removecolor).get_pixel(0, 0)[3], 0);
}

#[test]
fn cache_serves_filtered_pixels() {
    let mut cache = ImageCache::default();
    cache.insert("a", RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])));
    cache.refresh("a", &[ImageFilter::Invert]);
    let px = *cache.pixels("a", &[ImageFilter::Invert]).expect("pixels").get_pixel(0, 0);
    assert_eq!(px, Rgba([0, 255, 255, 255]));
    let raw = *cache.pixels("a", &[]).expect("pixels").get_pixel(0, 0);
    assert_eq!(raw, Rgba([255, 0, 0, 255]));
    assert!(cache.pixels("missing", &[]).is_none());
}
