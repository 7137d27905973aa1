use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::types::ObjectKind;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn primitives_are_centered_and_selected() {
    let mut editor = Editor::new(EditorConfig::default());
    let adders: [fn(&mut Editor) -> Option<u32>; 9] = [
        Editor::add_rectangle,
        Editor::add_soft_rectangle,
        Editor::add_circle,
        Editor::add_ellipse,
        Editor::add_triangle,
        Editor::add_inverse_triangle,
        Editor::add_diamond,
        Editor::add_line,
        Editor::add_dashed_line,
    ];
    for add in adders {
        let id = add(&mut editor).expect("added");
        assert_eq!(editor.selection(), &[id]);
        let c = editor.object(id).expect("object").center();
        assert!(approx(c.x, 450.0) && approx(c.y, 600.0), "{c:?}");
    }
    assert_eq!(editor.history_len(), 10);
}

#[test]
fn primitive_kinds_and_sizes() {
    let mut editor = Editor::new(EditorConfig::default());
    let circle = editor.add_circle().expect("circle");
    let obj = editor.object(circle).expect("object");
    assert_eq!(obj.kind(), ObjectKind::Circle);
    assert_eq!((obj.width, obj.height), (450.0, 450.0));

    let diamond = editor.add_diamond().expect("diamond");
    assert_eq!(editor.object(diamond).map(|o| o.kind()), Some(ObjectKind::Polygon));
}

#[test]
fn dashed_line_uses_fixed_pattern() {
    let mut editor = Editor::new(EditorConfig::default());
    let id = editor.add_dashed_line().expect("line");
    assert_eq!(
        editor.object(id).and_then(|o| o.stroke_dash_array.clone()),
        Some(vec![20.0, 10.0])
    );
}

#[test]
fn text_uses_session_font() {
    let mut config = EditorConfig::default();
    config.style.font_family = "Inter".into();
    let mut editor = Editor::new(config);
    let id = editor.add_text("Hello").expect("text");
    let text = editor.object(id).and_then(|o| o.text().cloned()).expect("textbox");
    assert_eq!(text.text, "Hello");
    assert_eq!(text.font_family, "Inter");
    assert_eq!(text.font_size, 32.0);
}

#[test]
fn adding_after_dispose_is_refused() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.dispose();
    assert_eq!(editor.add_rectangle(), None);
}
