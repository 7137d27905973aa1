use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn sized(w: f64, h: f64) -> Viewport {
    let mut vp = Viewport::default();
    vp.resize(w, h);
    vp
}

#[test]
fn screen_world_round_trip() {
    let vp = Viewport { zoom: 2.0, pan_x: 10.0, pan_y: -5.0, ..Viewport::default() };
    let world = Point::new(3.0, 4.0);
    let back = vp.screen_to_world(vp.world_to_screen(world));
    assert!(approx(back.x, 3.0) && approx(back.y, 4.0));
    let via_affine = vp.transform() * world;
    assert_eq!(via_affine, vp.world_to_screen(world));
}

#[test]
fn auto_fit_centers_workspace() {
    let config = EditorConfig::default();
    let mut vp = sized(1000.0, 800.0);
    assert!(vp.auto_fit(Rect::new(0.0, 0.0, 900.0, 1200.0), &config));
    assert!(approx(vp.zoom, 800.0 * 0.9 / 1200.0));
    let c = vp.world_to_screen(Point::new(450.0, 600.0));
    assert!(approx(c.x, 500.0) && approx(c.y, 400.0));
}

#[test]
fn auto_fit_clamps_to_zoom_range() {
    let config = EditorConfig::default();
    let mut vp = sized(100.0, 100.0);
    vp.auto_fit(Rect::new(0.0, 0.0, 100_000.0, 100_000.0), &config);
    assert!(approx(vp.zoom, config.min_zoom));
    vp.auto_fit(Rect::new(0.0, 0.0, 1.0, 1.0), &config);
    assert!(approx(vp.zoom, config.max_zoom));
}

#[test]
fn auto_fit_needs_a_container() {
    let config = EditorConfig::default();
    let mut vp = Viewport::default();
    assert!(!vp.auto_fit(Rect::new(0.0, 0.0, 10.0, 10.0), &config));
    assert!(approx(vp.zoom, 1.0));
}

#[test]
fn zoom_in_caps_at_max() {
    let config = EditorConfig::default();
    let mut vp = sized(100.0, 100.0);
    vp.zoom = 19.99;
    vp.zoom_in(&config);
    assert!(approx(vp.zoom, config.max_zoom));
}

#[test]
fn zoom_out_clamps_between_min_and_one() {
    let config = EditorConfig::default();
    let mut vp = sized(100.0, 100.0);
    vp.zoom = 4.0;
    vp.zoom_out(&config);
    assert!(approx(vp.zoom, 1.0));
    vp.zoom = 0.2;
    vp.zoom_out(&config);
    assert!(approx(vp.zoom, 0.2));
}

#[test]
fn zoom_keeps_container_center_fixed() {
    let config = EditorConfig::default();
    let mut vp = sized(200.0, 100.0);
    let before = vp.screen_to_world(vp.center());
    vp.zoom_in(&config);
    let after = vp.screen_to_world(vp.center());
    assert!(approx(before.x, after.x) && approx(before.y, after.y));
}
