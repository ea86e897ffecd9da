//! Snapshot-based undo/redo.

use crate::shapes::Object;

/// Default number of snapshots kept per page.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Linear undo stack of full object-list snapshots.
///
/// `entries[pointer]` always mirrors the live scene after the last commit.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    entries: Vec<Vec<Object>>,
    pointer: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT, Vec::new())
    }
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(limit: usize, initial: Vec<Object>) -> Self {
        Self {
            entries: vec![initial],
            pointer: 0,
            limit: limit.max(1),
        }
    }

    /// Rebuild from persisted parts. Out-of-range pointers are clamped and an
    /// empty entry list is seeded with `current`.
    pub fn from_parts(
        limit: usize,
        mut entries: Vec<Vec<Object>>,
        pointer: usize,
        current: &[Object],
    ) -> Self {
        if entries.is_empty() {
            entries.push(current.to_vec());
        }
        let limit = limit.max(1);
        let excess = entries.len().saturating_sub(limit);
        entries.drain(..excess);
        let pointer = pointer.saturating_sub(excess).min(entries.len() - 1);
        Self {
            entries,
            pointer,
            limit,
        }
    }

    /// Record a new state. Drops any redo entries and evicts the oldest
    /// entry once the limit is exceeded.
    pub fn snapshot(&mut self, objects: Vec<Object>) {
        self.entries.truncate(self.pointer + 1);
        self.entries.push(objects);
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.pointer = self.entries.len() - 1;
        log::debug!("History snapshot {}/{}", self.pointer + 1, self.entries.len());
    }

    /// Step back. Returns the state to restore, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Vec<Object>> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        log::debug!("Undo to history entry {}", self.pointer);
        Some(self.entries[self.pointer].clone())
    }

    /// Step forward. Returns the state to restore, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Vec<Object>> {
        if !self.can_redo() {
            return None;
        }
        self.pointer += 1;
        log::debug!("Redo to history entry {}", self.pointer);
        Some(self.entries[self.pointer].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    pub fn entries(&self) -> &[Vec<Object>] {
        &self.entries
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
