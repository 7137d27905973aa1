//! Linear snapshot history.
//!
//! Entries are serialized documents. `index` always points at the entry that
//! matches the live scene.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    pub fn new(initial: String) -> Self {
        History { entries: vec![initial], index: 0 }
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: String) {
        self.entries.clear();
        self.entries.push(initial);
        self.index = 0;
    }

    /// Append a snapshot, discarding any redo tail. A snapshot equal to the
    /// current entry is ignored; returns whether anything was appended.
    pub fn push(&mut self, snapshot: String) -> bool {
        if self.current() == Some(snapshot.as_str()) {
            return false;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        self.index = self.entries.len() - 1;
        true
    }

    /// The entry `undo` would move to, without moving.
    pub fn peek_undo(&self) -> Option<&str> {
        self.index.checked_sub(1).and_then(|i| self.entries.get(i)).map(String::as_str)
    }

    pub fn peek_redo(&self) -> Option<&str> {
        self.entries.get(self.index + 1).map(String::as_str)
    }

    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.current()
    }

    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.current()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
