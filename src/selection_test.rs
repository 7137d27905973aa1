use super::*;
use crate::config::StyleDefaults;
use crate::objects::{SceneObject, Shape};

fn scene_with_rect() -> (Scene, ObjectId) {
    let mut scene = Scene::new();
    scene.add(SceneObject::workspace(100.0, 100.0, "white"));
    let mut obj = SceneObject::new(Shape::Rect { rx: 0.0, ry: 0.0 }, 10.0, 10.0, &StyleDefaults::default());
    obj.left = 5.0;
    obj.top = 6.0;
    let id = scene.add(obj);
    (scene, id)
}

fn drain(coord: &mut Coordinator, scene: &mut Scene) -> Outcome {
    let events = scene.drain_events();
    coord.process(&events, scene)
}

#[test]
fn added_objects_get_a_baseline() {
    let (mut scene, id) = scene_with_rect();
    let mut coord = Coordinator::new(false);
    let outcome = drain(&mut coord, &mut scene);
    assert!(!outcome.record);
    assert_eq!(scene.get(id).and_then(|o| o.baseline), Some(Baseline { left: 5.0, top: 6.0 }));
}

#[test]
fn move_is_recorded_without_lock() {
    let (mut scene, id) = scene_with_rect();
    let mut coord = Coordinator::new(false);
    drain(&mut coord, &mut scene);
    scene.modify(id, Modification::Moved, |o| o.left = 50.0);
    assert!(drain(&mut coord, &mut scene).record);
    assert_eq!(scene.get(id).map(|o| o.left), Some(50.0));
}

#[test]
fn move_lock_reverts_and_skips_history() {
    let (mut scene, id) = scene_with_rect();
    let mut coord = Coordinator::new(true);
    drain(&mut coord, &mut scene);
    scene.modify(id, Modification::Moved, |o| {
        o.left = 50.0;
        o.top = 70.0;
    });
    let outcome = drain(&mut coord, &mut scene);
    assert!(!outcome.record);
    let obj = scene.get(id).expect("object");
    assert_eq!((obj.left, obj.top), (5.0, 6.0));
}

#[test]
fn scale_and_rotate_are_recorded_under_lock() {
    let (mut scene, id) = scene_with_rect();
    let mut coord = Coordinator::new(true);
    drain(&mut coord, &mut scene);
    scene.modify(id, Modification::Rotated, |o| o.angle = 10.0);
    assert!(drain(&mut coord, &mut scene).record);
}

#[test]
fn selection_excludes_workspace() {
    let (mut scene, id) = scene_with_rect();
    let ws = scene.workspace().map(|w| w.id).expect("workspace");
    let mut coord = Coordinator::new(false);
    scene.set_active(&[ws, id]);
    drain(&mut coord, &mut scene);
    assert_eq!(coord.selection(), &[id]);
}

#[test]
fn emptied_selection_resets_selection_tools() {
    let (mut scene, id) = scene_with_rect();
    let mut coord = Coordinator::new(false);
    scene.set_active(&[id]);
    drain(&mut coord, &mut scene);
    coord.set_tool(Tool::Fill);
    scene.discard_active();
    let outcome = drain(&mut coord, &mut scene);
    assert_eq!(outcome.tool_fallback, Some(Tool::Select));
    assert_eq!(coord.tool(), Tool::Select);
}

#[test]
fn emptied_selection_keeps_other_tools() {
    let (mut scene, id) = scene_with_rect();
    let mut coord = Coordinator::new(false);
    scene.set_active(&[id]);
    drain(&mut coord, &mut scene);
    coord.set_tool(Tool::Shapes);
    scene.discard_active();
    assert_eq!(drain(&mut coord, &mut scene).tool_fallback, None);
    assert_eq!(coord.tool(), Tool::Shapes);
}
