//! CSS color parsing for the rasterizer.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use image::Rgba;

fn hex_byte(s: &str) -> Option<u8> {
    match u8::from_str_radix(s, 16) {
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

/// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex(raw: &str) -> Option<Rgba<u8>> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let short = |i: usize| hex_byte(&hex[i..=i].repeat(2));
    let long = |i: usize| hex_byte(&hex[i..i + 2]);
    match hex.len() {
        3 => Some(Rgba([short(0)?, short(1)?, short(2)?, 255])),
        4 => Some(Rgba([short(0)?, short(1)?, short(2)?, short(3)?])),
        6 => Some(Rgba([long(0)?, long(2)?, long(4)?, 255])),
        8 => Some(Rgba([long(0)?, long(2)?, long(4)?, long(6)?])),
        _ => None,
    }
}

fn channel(part: &str) -> Option<u8> {
    let part = part.trim();
    if let Some(pct) = part.strip_suffix('%') {
        let v: f64 = match pct.trim().parse() {
            Ok(v) => v,
            Err(_) => return None,
        };
        return Some((v.clamp(0.0, 100.0) * 2.55).round() as u8);
    }
    match part.parse::<f64>() {
        Ok(v) => Some(v.clamp(0.0, 255.0).round() as u8),
        Err(_) => None,
    }
}

fn alpha(part: &str) -> Option<u8> {
    match part.trim().parse::<f64>() {
        Ok(v) => Some((v.clamp(0.0, 1.0) * 255.0).round() as u8),
        Err(_) => None,
    }
}

/// Parse `rgb(r, g, b)` / `rgba(r, g, b, a)`.
pub fn parse_functional(raw: &str) -> Option<Rgba<u8>> {
    let s = raw.trim().to_ascii_lowercase();
    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').collect();
    match parts.as_slice() {
        [r, g, b] => Some(Rgba([channel(r)?, channel(g)?, channel(b)?, 255])),
        [r, g, b, a] => Some(Rgba([channel(r)?, channel(g)?, channel(b)?, alpha(a)?])),
        _ => None,
    }
}

fn named(raw: &str) -> Option<Rgba<u8>> {
    let rgb = match raw.trim().to_ascii_lowercase().as_str() {
        "transparent" => return Some(Rgba([0, 0, 0, 0])),
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "pink" => [255, 192, 203],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Parse any supported CSS color. Empty strings and unknown values are `None`
/// and render as nothing.
pub fn parse_css_color(raw: &str) -> Option<Rgba<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('#') {
        return parse_hex(trimmed);
    }
    parse_functional(trimmed).or_else(|| named(trimmed))
}

/// Source-over blend of `src` (scaled by `opacity`) onto `dst`.
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f64) {
    let sa = f64::from(src[3]) / 255.0 * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let sc = f64::from(src[i]);
        let dc = f64::from(dst[i]);
        let c = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
