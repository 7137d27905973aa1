//! Keyboard shortcut bindings.

#[cfg(test)]
#[path = "shortcuts_test.rs"]
mod shortcuts_test;

use serde::Deserialize;

use crate::editor::Editor;
use crate::persist::PersistSink;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shortcut {
    Undo,
    Redo,
    Copy,
    Paste,
    Delete,
    Save,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Where keyboard input is going.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Canvas,
    /// A host text field, or a canvas text box in edit mode.
    TextInput,
}

/// Map a key press to a shortcut. Nothing is intercepted while text is being typed.
pub fn resolve_shortcut(key: &str, mods: Modifiers, focus: Focus) -> Option<Shortcut> {
    if focus == Focus::TextInput || mods.alt {
        return None;
    }
    if !mods.command() {
        return match key {
            "Delete" | "Backspace" if !mods.shift => Some(Shortcut::Delete),
            _ => None,
        };
    }
    match key.to_ascii_lowercase().as_str() {
        "z" if mods.shift => Some(Shortcut::Redo),
        "z" => Some(Shortcut::Undo),
        "y" => Some(Shortcut::Redo),
        "c" => Some(Shortcut::Copy),
        "v" => Some(Shortcut::Paste),
        "s" => Some(Shortcut::Save),
        _ => None,
    }
}

impl Editor {
    /// Resolve and run a key press. Returns the shortcut that fired, if any.
    pub fn handle_shortcut(
        &mut self,
        key: &str,
        mods: Modifiers,
        host_text_focused: bool,
        sink: &mut dyn PersistSink,
    ) -> Option<Shortcut> {
        if self.is_disposed() {
            return None;
        }
        let focus = if host_text_focused || self.is_editing_text() { Focus::TextInput } else { Focus::Canvas };
        let shortcut = resolve_shortcut(key, mods, focus)?;
        log::debug!("shortcut {shortcut:?}");
        match shortcut {
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::Copy => self.copy(),
            Shortcut::Paste => {
                self.paste();
            }
            Shortcut::Delete => self.delete(),
            Shortcut::Save => {
                self.flush_save(sink);
            }
        }
        Some(shortcut)
    }
}
