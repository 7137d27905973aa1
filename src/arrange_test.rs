use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::types::{ObjectKind, Tool};
use kurbo::{Point, Rect};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn editor() -> Editor {
    Editor::new(EditorConfig::default())
}

fn paint_order(editor: &Editor) -> Vec<u32> {
    editor.objects().iter().map(|o| o.id).collect()
}

#[test]
fn structural_commands_without_selection_do_nothing() {
    let mut editor = editor();
    editor.add_rectangle().expect("rect");
    editor.clear_selection();
    let before = editor.scene().to_document();
    let len = editor.history_len();

    editor.bring_forward();
    editor.send_backwards();
    editor.lock_object();
    editor.lock_selection();
    editor.delete();
    assert_eq!(editor.group(), None);
    assert!(editor.ungroup().is_empty());
    editor.change_stroke_color("red");

    assert_eq!(editor.scene().to_document(), before);
    assert_eq!(editor.history_len(), len);
}

#[test]
fn send_backwards_never_passes_workspace() {
    let mut editor = editor();
    let id = editor.add_rectangle().expect("rect");
    editor.send_backwards();
    editor.send_backwards();
    assert!(editor.objects()[0].is_workspace());
    assert_eq!(editor.objects()[1].id, id);
}

#[test]
fn bring_forward_swaps_with_next() {
    let mut editor = editor();
    let a = editor.add_rectangle().expect("a");
    let b = editor.add_circle().expect("b");
    editor.select(&[a]);
    editor.bring_forward();
    let order = paint_order(&editor);
    assert_eq!(&order[1..], &[b, a]);
}

#[test]
fn group_then_ungroup_restores_members() {
    let mut editor = editor();
    let a = editor.add_rectangle().expect("a");
    editor.drag_object(a, 10.0, 20.0);
    editor.scale_object(a, -1.0, 1.0);
    editor.rotate_object(a, 30.0);
    let b = editor.add_circle().expect("b");
    editor.rotate_object(b, 30.0);
    editor.scale_object(b, 1.5, 0.5);
    assert_eq!(editor.object(a).map(|o| (o.flip_x, o.flip_y)), Some((true, false)));
    let before: Vec<_> = editor
        .objects()
        .iter()
        .filter(|o| !o.is_workspace())
        .map(|o| (o.kind(), o.left, o.top, o.angle, o.scale_x, o.scale_y, o.flip_x, o.flip_y))
        .collect();

    editor.select(&[a, b]);
    let gid = editor.group().expect("group");
    assert_eq!(editor.selection(), &[gid]);
    assert_eq!(editor.objects().len(), 2);
    assert_eq!(editor.object(gid).map(|g| g.kind()), Some(ObjectKind::Group));

    let restored = editor.ungroup();
    assert_eq!(restored.len(), 2);
    assert!(editor.selection().is_empty());
    let after: Vec<_> = editor
        .objects()
        .iter()
        .filter(|o| !o.is_workspace())
        .map(|o| (o.kind(), o.left, o.top, o.angle, o.scale_x, o.scale_y, o.flip_x, o.flip_y))
        .collect();
    assert_eq!(before.len(), after.len());
    for (x, y) in before.iter().zip(after.iter()) {
        assert_eq!(x.0, y.0);
        assert!(approx(x.1, y.1) && approx(x.2, y.2), "{x:?} vs {y:?}");
        assert!(approx(x.3, y.3) && approx(x.4, y.4) && approx(x.5, y.5), "{x:?} vs {y:?}");
        assert_eq!((x.6, x.7), (y.6, y.7));
    }
}

#[test]
fn group_needs_two_members() {
    let mut editor = editor();
    editor.add_rectangle().expect("rect");
    assert_eq!(editor.group(), None);
}

#[test]
fn ungroup_ignores_non_groups() {
    let mut editor = editor();
    editor.add_rectangle().expect("rect");
    assert!(editor.ungroup().is_empty());
}

#[test]
fn lock_selection_clears_selection_and_blocks_pointer() {
    let mut editor = editor();
    let id = editor.add_rectangle().expect("rect");
    let center = editor.object(id).map(|o| o.center()).expect("center");
    editor.lock_selection();
    assert!(editor.selection().is_empty());
    assert_eq!(editor.select_at(center, false), None);
    editor.select(&[id]);
    assert_eq!(editor.selection(), &[id]);
}

#[test]
fn lock_object_keeps_selection() {
    let mut editor = editor();
    let id = editor.add_rectangle().expect("rect");
    editor.lock_object();
    assert_eq!(editor.selection(), &[id]);
    assert_eq!(editor.object(id).map(|o| o.selectable), Some(false));
    editor.unlock_all();
    assert_eq!(editor.object(id).map(|o| o.selectable), Some(true));
}

#[test]
fn delete_removes_selected_and_keeps_workspace() {
    let mut editor = editor();
    editor.add_rectangle().expect("rect");
    editor.add_circle().expect("circle");
    editor.select_in_rect(Rect::new(0.0, 0.0, 900.0, 1200.0), false);
    assert_eq!(editor.selection().len(), 2);
    editor.delete();
    assert_eq!(editor.objects().len(), 1);
    assert!(editor.objects()[0].is_workspace());
}

#[test]
fn workspace_is_never_selected() {
    let mut editor = editor();
    let ws = editor.workspace().map(|w| w.id).expect("workspace");
    editor.select(&[ws]);
    assert!(editor.selection().is_empty());
    assert_eq!(editor.select_at(Point::new(5.0, 5.0), false), None);
    assert!(!editor.drag_object(ws, 100.0, 100.0));
}

#[test]
fn select_at_toggle_adds_and_removes() {
    let mut editor = editor();
    let a = editor.add_rectangle().expect("a");
    editor.drag_object(a, 0.0, 0.0);
    let b = editor.add_rectangle().expect("b");
    editor.drag_object(b, 500.0, 800.0);
    editor.select_at(Point::new(10.0, 10.0), false);
    assert_eq!(editor.selection(), &[a]);
    editor.select_at(Point::new(510.0, 810.0), true);
    assert_eq!(editor.selection(), &[a, b]);
    editor.select_at(Point::new(10.0, 10.0), true);
    assert_eq!(editor.selection(), &[b]);
}

#[test]
fn drag_records_history() {
    let mut editor = editor();
    let id = editor.add_rectangle().expect("rect");
    let len = editor.history_len();
    assert!(editor.drag_object(id, 1.0, 2.0));
    assert_eq!(editor.history_len(), len + 1);
    editor.undo();
    assert_eq!(editor.objects()[1].left, 250.0);
}

#[test]
fn move_lock_pins_objects_to_insertion_position() {
    let mut editor = Editor::new(EditorConfig { move_lock: true, ..EditorConfig::default() });
    let id = editor.add_rectangle().expect("rect");
    let (left, top) = editor.object(id).map(|o| (o.left, o.top)).expect("object");
    let len = editor.history_len();
    editor.drag_object(id, left + 300.0, top - 40.0);
    editor.drag_object(id, 0.0, 0.0);
    let obj = editor.object(id).expect("object");
    assert_eq!((obj.left, obj.top), (left, top));
    assert_eq!(editor.history_len(), len);
}

#[test]
fn rotate_keeps_center() {
    let mut editor = editor();
    let id = editor.add_rectangle().expect("rect");
    editor.rotate_object(id, 45.0);
    let c = editor.object(id).map(|o| o.center()).expect("center");
    assert!(approx(c.x, 450.0) && approx(c.y, 600.0));
}

#[test]
fn change_size_resizes_workspace_and_refits() {
    let mut editor = editor();
    editor.resize_container(1000.0, 1000.0);
    let zoom_before = editor.viewport().zoom;
    editor.change_size(2000.0, 2000.0);
    let ws = editor.workspace().expect("workspace");
    assert_eq!((ws.width, ws.height), (2000.0, 2000.0));
    assert!(editor.viewport().zoom < zoom_before);
    assert_eq!(editor.history_len(), 2);
}

#[test]
fn change_background_records() {
    let mut editor = editor();
    editor.change_background("#eeeeee");
    assert_eq!(editor.workspace().and_then(|w| w.fill.clone()).as_deref(), Some("#eeeeee"));
    assert_eq!(editor.history_len(), 2);
    editor.change_background("#eeeeee");
    assert_eq!(editor.history_len(), 2);
}

#[test]
fn text_edit_buffer_is_committed_on_end() {
    let mut editor = editor();
    let id = editor.add_text("draft").expect("text");
    let len = editor.history_len();
    assert!(editor.begin_text_edit(id));
    assert!(editor.is_editing_text());
    editor.update_text_edit("dra");
    editor.update_text_edit("final");
    assert_eq!(editor.history_len(), len);
    assert!(editor.end_text_edit());
    assert_eq!(editor.object(id).and_then(|o| o.text()).map(|t| t.text.clone()), Some("final".into()));
    assert_eq!(editor.history_len(), len + 1);
}

#[test]
fn deleting_selection_falls_back_from_fill_tool() {
    let mut editor = editor();
    editor.add_rectangle().expect("rect");
    editor.set_tool(Tool::Fill);
    editor.delete();
    assert_eq!(editor.tool(), Tool::Select);
    assert!(editor
        .drain_signals()
        .contains(&crate::editor::UiSignal::ToolFallback(Tool::Select)));
}
