use super::*;

#[test]
fn parse_hex_supports_short_and_long_forms() {
    assert_eq!(parse_hex("#ABC"), Some(Rgba([170, 187, 204, 255])));
    assert_eq!(parse_hex("  #a1B2c3 "), Some(Rgba([161, 178, 195, 255])));
    assert_eq!(parse_hex("#ff000080"), Some(Rgba([255, 0, 0, 128])));
}

#[test]
fn parse_hex_rejects_invalid_inputs() {
    assert_eq!(parse_hex("AABBCC"), None);
    assert_eq!(parse_hex("#12"), None);
    assert_eq!(parse_hex("#12GG34"), None);
}

#[test]
fn parse_functional_reads_rgb_and_rgba() {
    assert_eq!(parse_functional("rgb(1, 2, 3)"), Some(Rgba([1, 2, 3, 255])));
    assert_eq!(parse_functional("rgba(0,0,0,1)"), Some(Rgba([0, 0, 0, 255])));
    assert_eq!(parse_functional("rgba(10,20,30,0.5)"), Some(Rgba([10, 20, 30, 128])));
    assert_eq!(parse_functional("rgb(100%, 0%, 0%)"), Some(Rgba([255, 0, 0, 255])));
}

#[test]
fn parse_css_color_handles_names_and_transparent() {
    assert_eq!(parse_css_color("white"), Some(Rgba([255, 255, 255, 255])));
    assert_eq!(parse_css_color("transparent"), Some(Rgba([0, 0, 0, 0])));
    assert_eq!(parse_css_color(""), None);
    assert_eq!(parse_css_color("not-a-color"), None);
}

#[test]
fn blend_over_opaque_source_replaces_destination() {
    let mut dst = Rgba([255, 255, 255, 255]);
    blend_over(&mut dst, Rgba([10, 20, 30, 255]), 1.0);
    assert_eq!(dst, Rgba([10, 20, 30, 255]));
}

#[test]
fn blend_over_half_opacity_mixes() {
    let mut dst = Rgba([255, 255, 255, 255]);
    blend_over(&mut dst, Rgba([0, 0, 0, 255]), 0.5);
    assert_eq!(dst[3], 255);
    assert!((i32::from(dst[0]) - 128).abs() <= 1);
}

#[test]
fn blend_over_zero_opacity_is_noop() {
    let mut dst = Rgba([1, 2, 3, 4]);
    blend_over(&mut dst, Rgba([200, 200, 200, 255]), 0.0);
    assert_eq!(dst, Rgba([1, 2, 3, 4]));
}
