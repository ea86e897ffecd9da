//! Multi-page documents.
//!
//! The active page's scene, history and background live in dedicated fields;
//! every other page sits in its slot in `pages`. Switching pages flushes the
//! live state back into its slot and loads the incoming one.

use crate::config::EditorConfig;
use crate::error::{DocumentError, DocumentResult, EditError};
use crate::history::History;
use crate::scene::Scene;
use crate::shapes::{IdAllocator, Object, ObjectId, SerializableColor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Page background settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Background {
    pub color: SerializableColor,
    /// Hidden backgrounds export as transparent.
    pub visible: bool,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: SerializableColor::white(),
            visible: true,
        }
    }
}

/// A stored page: objects, their history and background.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub scene: Scene,
    pub history: History,
    pub background: Background,
}

impl Page {
    fn blank(history_limit: usize) -> Self {
        Self {
            scene: Scene::new(),
            history: History::new(history_limit, Vec::new()),
            background: Background::default(),
        }
    }
}

/// A deleted page waiting out its restore window.
#[derive(Debug, Clone)]
struct PendingRestore {
    page: Page,
    index: usize,
    deleted_at: Instant,
}

/// A document of one or more pages.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    pages: Vec<Page>,
    active: usize,
    scene: Scene,
    history: History,
    background: Background,
    ids: IdAllocator,
    pending: Option<PendingRestore>,
    history_limit: usize,
    restore_timeout: Duration,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Document {
    /// A document with a single blank page.
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pages: vec![Page::default()],
            active: 0,
            scene: Scene::new(),
            history: History::new(config.history_limit, Vec::new()),
            background: Background::default(),
            ids: IdAllocator::new(),
            pending: None,
            history_limit: config.history_limit,
            restore_timeout: config.restore_timeout(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    /// The live scene and the id allocator, borrowed together.
    pub fn scene_and_ids_mut(&mut self) -> (&mut Scene, &mut IdAllocator) {
        (&mut self.scene, &mut self.ids)
    }

    /// Record the live scene as a new history entry.
    pub fn snapshot(&mut self) {
        self.history.snapshot(self.scene.clone_all());
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(objects) => {
                self.scene.replace_all(objects);
                true
            }
            None => false,
        }
    }

    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(objects) => {
                self.scene.replace_all(objects);
                true
            }
            None => false,
        }
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn set_background_color(&mut self, color: SerializableColor) {
        self.background.color = color;
    }

    pub fn set_background_visible(&mut self, visible: bool) {
        self.background.visible = visible;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn active_page(&self) -> usize {
        self.active
    }

    /// Move the live state into the active slot.
    fn flush(&mut self) {
        if let Some(slot) = self.pages.get_mut(self.active) {
            slot.scene = std::mem::take(&mut self.scene);
            slot.history = std::mem::take(&mut self.history);
            slot.background = self.background;
        }
    }

    /// Make `index` active and pull its state into the live fields.
    fn load_page(&mut self, index: usize) {
        self.active = index;
        if let Some(slot) = self.pages.get_mut(index) {
            self.scene = std::mem::take(&mut slot.scene);
            self.history = std::mem::take(&mut slot.history);
            self.background = slot.background;
        }
        log::debug!("Loaded page {} of {}", index + 1, self.pages.len());
    }

    /// Append a blank page and switch to it. Returns its index.
    pub fn add_page(&mut self) -> usize {
        self.flush();
        self.pages.push(Page::blank(self.history_limit));
        let index = self.pages.len() - 1;
        self.load_page(index);
        log::info!("Added page {}", index + 1);
        index
    }

    pub fn switch_page(&mut self, index: usize) -> Result<(), EditError> {
        if index >= self.pages.len() {
            return Err(EditError::PageOutOfRange(index));
        }
        if index != self.active {
            self.flush();
            self.load_page(index);
        }
        Ok(())
    }

    /// Delete a page. It can be brought back with
    /// [`Document::restore_deleted_page`] until the restore window closes;
    /// a later delete replaces the pending one.
    pub fn delete_page(&mut self, index: usize, now: Instant) -> Result<(), EditError> {
        if index >= self.pages.len() {
            return Err(EditError::PageOutOfRange(index));
        }
        if self.pages.len() == 1 {
            log::warn!("Refusing to delete the last page");
            return Err(EditError::LastPage);
        }
        self.flush();
        let page = self.pages.remove(index);
        self.pending = Some(PendingRestore {
            page,
            index,
            deleted_at: now,
        });
        let next = if index < self.active {
            self.active - 1
        } else {
            self.active.min(self.pages.len() - 1)
        };
        self.load_page(next);
        log::info!("Deleted page {}", index + 1);
        Ok(())
    }

    pub fn has_pending_restore(&self) -> bool {
        self.pending.is_some()
    }

    /// Re-insert the last deleted page at its old index and switch to it.
    pub fn restore_deleted_page(&mut self, now: Instant) -> Result<usize, EditError> {
        let pending = self.pending.take().ok_or(EditError::NoPendingRestore)?;
        if now.saturating_duration_since(pending.deleted_at) > self.restore_timeout {
            log::debug!("Restore window for page {} expired", pending.index + 1);
            return Err(EditError::RestoreExpired);
        }
        self.flush();
        let index = pending.index.min(self.pages.len());
        self.pages.insert(index, pending.page);
        self.load_page(index);
        log::info!("Restored page {}", index + 1);
        Ok(index)
    }

    /// Drop the pending restore once its window has passed. Returns true if
    /// something was discarded.
    pub fn expire_pending(&mut self, now: Instant) -> bool {
        let expired = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.deleted_at) > self.restore_timeout);
        if expired {
            self.pending = None;
        }
        expired
    }

    /// Snapshot of every page in the persisted layout.
    pub fn export_state(&self) -> DocumentState {
        let pages = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                if i == self.active {
                    PageState::new(&self.scene, &self.history, self.background)
                } else {
                    PageState::new(&page.scene, &page.history, page.background)
                }
            })
            .collect();
        DocumentState {
            id: Some(self.id.clone()),
            pages,
            active_page: self.active,
        }
    }

    /// Rebuild a document from persisted state. The id allocator resumes
    /// above every id found in any page or history entry.
    pub fn import_state(state: DocumentState, config: &EditorConfig) -> DocumentResult<Self> {
        if state.pages.is_empty() {
            return Err(DocumentError::Invalid("document has no pages".to_string()));
        }
        let active = if state.active_page < state.pages.len() {
            state.active_page
        } else {
            log::warn!("Active page {} out of range, using the first page", state.active_page);
            0
        };

        let mut max_id: Option<ObjectId> = None;
        let mut pages = Vec::with_capacity(state.pages.len());
        for page in state.pages {
            let color = SerializableColor::from_hex(&page.background_color).ok_or_else(|| {
                DocumentError::Invalid(format!("bad background color {:?}", page.background_color))
            })?;
            let in_history = page.history.iter().flatten().map(Object::max_id).max();
            let history = History::from_parts(
                config.history_limit,
                page.history,
                page.history_pointer,
                &page.objects,
            );
            let scene = Scene::from_objects(page.objects);
            max_id = max_id.max(scene.max_id()).max(in_history);
            pages.push(Page {
                scene,
                history,
                background: Background {
                    color,
                    visible: page.background_visible,
                },
            });
        }

        let mut document = Self {
            id: state.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            pages,
            active,
            scene: Scene::new(),
            history: History::default(),
            background: Background::default(),
            ids: max_id.map_or_else(IdAllocator::new, IdAllocator::resume_after),
            pending: None,
            history_limit: config.history_limit,
            restore_timeout: config.restore_timeout(),
        };
        document.load_page(active);
        log::info!("Imported document with {} pages", document.pages.len());
        Ok(document)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.export_state())?)
    }

    pub fn from_json(json: &str, config: &EditorConfig) -> DocumentResult<Self> {
        let state: DocumentState = serde_json::from_str(json)?;
        Self::import_state(state, config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Saved document to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, config: &EditorConfig) -> DocumentResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json, config)
    }
}

/// Persisted form of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub pages: Vec<PageState>,
    #[serde(default)]
    pub active_page: usize,
}

/// Persisted form of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub objects: Vec<Object>,
    #[serde(default)]
    pub history: Vec<Vec<Object>>,
    #[serde(default)]
    pub history_pointer: usize,
    pub background_color: String,
    #[serde(default = "default_visible")]
    pub background_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl PageState {
    fn new(scene: &Scene, history: &History, background: Background) -> Self {
        Self {
            objects: scene.clone_all(),
            history: history.entries().to_vec(),
            history_pointer: history.pointer(),
            background_color: background.color.to_hex(),
            background_visible: background.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ObjectKind, ShapeKind, VectorShape};
    use kurbo::Point;

    fn add_rect(doc: &mut Document) -> ObjectId {
        let id = doc.ids_mut().next_id();
        let shape = VectorShape::new(ShapeKind::Rect, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        doc.scene_mut().append(Object::new(id, ObjectKind::Shape(shape)));
        doc.snapshot();
        id
    }

    #[test]
    fn test_pages_are_independent() {
        let mut doc = Document::default();
        add_rect(&mut doc);
        doc.set_background_color(SerializableColor::black());

        assert_eq!(doc.add_page(), 1);
        assert!(doc.scene().is_empty());
        assert!(!doc.history().can_undo());
        assert_eq!(doc.background(), Background::default());
        add_rect(&mut doc);
        add_rect(&mut doc);

        doc.switch_page(0).unwrap();
        assert_eq!(doc.scene().len(), 1);
        assert_eq!(doc.background().color, SerializableColor::black());
        assert!(doc.undo());
        assert!(doc.scene().is_empty());

        doc.switch_page(1).unwrap();
        assert_eq!(doc.scene().len(), 2);
        assert_eq!(doc.switch_page(5), Err(EditError::PageOutOfRange(5)));
    }

    #[test]
    fn test_ids_unique_across_pages() {
        let mut doc = Document::default();
        let a = add_rect(&mut doc);
        doc.add_page();
        let b = add_rect(&mut doc);
        assert_ne!(a, b);
    }

    #[test]
    fn test_cannot_delete_last_page() {
        let mut doc = Document::default();
        assert_eq!(doc.delete_page(0, Instant::now()), Err(EditError::LastPage));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_delete_and_restore_within_window() {
        let mut doc = Document::default();
        add_rect(&mut doc);
        doc.add_page();
        doc.add_page();
        doc.switch_page(0).unwrap();

        let t0 = Instant::now();
        doc.delete_page(0, t0).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.active_page(), 0);
        assert!(doc.scene().is_empty());

        let index = doc.restore_deleted_page(t0 + Duration::from_secs(2)).unwrap();
        assert_eq!(index, 0);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.scene().len(), 1);
        assert!(doc.history().can_undo());
        assert_eq!(doc.restore_deleted_page(t0), Err(EditError::NoPendingRestore));
    }

    #[test]
    fn test_restore_expires() {
        let mut doc = Document::default();
        doc.add_page();
        let t0 = Instant::now();
        doc.delete_page(1, t0).unwrap();
        assert!(!doc.expire_pending(t0 + Duration::from_secs(1)));
        assert_eq!(
            doc.restore_deleted_page(t0 + Duration::from_secs(6)),
            Err(EditError::RestoreExpired)
        );
        assert!(!doc.has_pending_restore());
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_delete_before_active_keeps_page() {
        let mut doc = Document::default();
        doc.add_page();
        add_rect(&mut doc);
        doc.delete_page(0, Instant::now()).unwrap();
        assert_eq!(doc.active_page(), 0);
        assert_eq!(doc.scene().len(), 1);
    }

    #[test]
    fn test_state_round_trip_resumes_ids() {
        let mut doc = Document::default();
        add_rect(&mut doc);
        let second = add_rect(&mut doc);
        doc.scene_mut().remove(second);
        doc.snapshot();
        doc.add_page();
        doc.set_background_visible(false);

        let json = doc.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["activePage"], 1);
        assert_eq!(value["pages"][0]["historyPointer"], 3);
        assert_eq!(value["pages"][0]["backgroundColor"], "#ffffff");
        assert_eq!(value["pages"][1]["backgroundVisible"], false);

        let mut restored = Document::from_json(&json, &EditorConfig::default()).unwrap();
        assert_eq!(restored.id(), doc.id());
        assert_eq!(restored.active_page(), 1);
        assert!(!restored.background().visible);
        // The deleted object only lives in history, yet its id is not reused.
        assert!(restored.ids_mut().next_id() > second);

        restored.switch_page(0).unwrap();
        assert_eq!(restored.scene().len(), 1);
        assert!(restored.undo());
        assert_eq!(restored.scene().len(), 2);
    }

    #[test]
    fn test_import_rejects_empty_and_bad_color() {
        let empty = DocumentState {
            id: None,
            pages: Vec::new(),
            active_page: 0,
        };
        assert!(Document::import_state(empty, &EditorConfig::default()).is_err());

        let json = r#"{ "pages": [{ "objects": [], "backgroundColor": "nope" }] }"#;
        assert!(matches!(
            Document::from_json(json, &EditorConfig::default()),
            Err(DocumentError::Invalid(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut doc = Document::default();
        add_rect(&mut doc);
        doc.save(&path).unwrap();

        let loaded = Document::load(&path, &EditorConfig::default()).unwrap();
        assert_eq!(loaded.scene(), doc.scene());
        assert_eq!(loaded.history().len(), 2);
    }
}
