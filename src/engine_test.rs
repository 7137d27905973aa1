use super::*;

#[test]
fn set_clock_stamps_command_edits() {
    let mut engine = DesignEngine::new("{}");
    engine.set_clock(1000.0);
    let reply = engine.execute_command(r#"{"action": "add_rectangle"}"#);
    assert!(reply.contains("\"success\":true"));

    let mut saved = 0;
    let mut sink = |_: &SavePayload| -> Result<(), PersistError> {
        saved += 1;
        Ok(())
    };
    assert!(!engine.editor.poll_save(1400.0, &mut sink));
    assert!(engine.editor.poll_save(1500.0, &mut sink));
    assert_eq!(saved, 1);
}

#[test]
fn bad_config_json_falls_back_to_defaults() {
    let engine = DesignEngine::new("{not json");
    assert_eq!(engine.editor.config(), &EditorConfig::default());
    let engine = DesignEngine::new(r#"{"minZoom": 50, "maxZoom": 2}"#);
    assert_eq!(engine.editor.config().min_zoom, 0.2);
}
