use super::*;
use crate::config::EditorConfig;
use crate::document::SavePayload;
use crate::error::PersistError;

fn cmd() -> Modifiers {
    Modifiers { ctrl: true, ..Modifiers::default() }
}

#[test]
fn bindings_resolve_with_ctrl_or_cmd() {
    let meta = Modifiers { meta: true, ..Modifiers::default() };
    let shift = Modifiers { shift: true, ..cmd() };
    assert_eq!(resolve_shortcut("z", cmd(), Focus::Canvas), Some(Shortcut::Undo));
    assert_eq!(resolve_shortcut("z", meta, Focus::Canvas), Some(Shortcut::Undo));
    assert_eq!(resolve_shortcut("Z", shift, Focus::Canvas), Some(Shortcut::Redo));
    assert_eq!(resolve_shortcut("y", cmd(), Focus::Canvas), Some(Shortcut::Redo));
    assert_eq!(resolve_shortcut("c", cmd(), Focus::Canvas), Some(Shortcut::Copy));
    assert_eq!(resolve_shortcut("v", meta, Focus::Canvas), Some(Shortcut::Paste));
    assert_eq!(resolve_shortcut("s", cmd(), Focus::Canvas), Some(Shortcut::Save));
    assert_eq!(resolve_shortcut("Delete", Modifiers::default(), Focus::Canvas), Some(Shortcut::Delete));
    assert_eq!(resolve_shortcut("Backspace", Modifiers::default(), Focus::Canvas), Some(Shortcut::Delete));
}

#[test]
fn plain_letters_are_not_shortcuts() {
    assert_eq!(resolve_shortcut("z", Modifiers::default(), Focus::Canvas), None);
    assert_eq!(resolve_shortcut("q", cmd(), Focus::Canvas), None);
}

#[test]
fn text_focus_suppresses_everything() {
    assert_eq!(resolve_shortcut("z", cmd(), Focus::TextInput), None);
    assert_eq!(resolve_shortcut("Backspace", Modifiers::default(), Focus::TextInput), None);
}

#[test]
fn editing_a_text_box_suppresses_delete() {
    let mut editor = Editor::new(EditorConfig::default());
    let id = editor.add_text("hello").expect("text");
    editor.begin_text_edit(id);
    let mut sink = |_: &SavePayload| -> Result<(), PersistError> { Ok(()) };
    assert_eq!(editor.handle_shortcut("Backspace", Modifiers::default(), false, &mut sink), None);
    assert!(editor.object(id).is_some());

    editor.end_text_edit();
    assert_eq!(
        editor.handle_shortcut("Backspace", Modifiers::default(), false, &mut sink),
        Some(Shortcut::Delete)
    );
    assert!(editor.object(id).is_none());
}

#[test]
fn host_text_focus_suppresses_undo() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.add_rectangle().expect("rect");
    let mut sink = |_: &SavePayload| -> Result<(), PersistError> { Ok(()) };
    assert_eq!(editor.handle_shortcut("z", cmd(), true, &mut sink), None);
    assert!(editor.can_undo());
    assert_eq!(editor.handle_shortcut("z", cmd(), false, &mut sink), Some(Shortcut::Undo));
    assert!(!editor.can_undo());
}

#[test]
fn save_shortcut_flushes_to_sink() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.add_rectangle().expect("rect");
    let mut saved = Vec::new();
    let mut sink = |p: &SavePayload| -> Result<(), PersistError> {
        saved.push(p.json.clone());
        Ok(())
    };
    editor.handle_shortcut("s", cmd(), false, &mut sink);
    assert_eq!(saved.len(), 1);
    assert!(!editor.save_pending());
}

#[test]
fn copy_paste_via_keyboard() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.add_rectangle().expect("rect");
    let before = editor.objects().len();
    let mut sink = |_: &SavePayload| -> Result<(), PersistError> { Ok(()) };
    editor.handle_shortcut("c", cmd(), false, &mut sink);
    editor.handle_shortcut("v", cmd(), false, &mut sink);
    assert_eq!(editor.objects().len(), before + 1);
}
