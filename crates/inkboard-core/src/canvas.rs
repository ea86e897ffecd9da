//! Editing facade: tool, selection, clipboard and commands over a document.

use crate::config::EditorConfig;
use crate::document::{Background, Document};
use crate::error::EditError;
use crate::geometry::{pivot, rotate_point, translate};
use crate::input::{Modifiers, PointerEvent};
use crate::interaction::{EditContext, GestureOutcome, Interaction};
use crate::scene::Scene;
use crate::selection::SelectionFrame;
use crate::shapes::{
    FontFamily, Group, ImageObject, ImageSource, Object, ObjectId, ObjectKind, SerializableColor,
};
use crate::tools::{ToolKind, ToolSettings};
use kurbo::{Point, Vec2};
use std::time::Instant;

/// Largest size an inserted image is given before the user resizes it.
const IMAGE_FIT_WIDTH: f64 = 800.0;
const IMAGE_FIT_HEIGHT: f64 = 600.0;

/// Representative property values of the selection, for the property panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionProperties {
    pub count: usize,
    pub color: Option<SerializableColor>,
    pub opacity: f64,
    pub size: Option<f64>,
    pub corner_radius: Option<f64>,
    pub sides: Option<u32>,
    pub fill: Option<bool>,
    /// True only when every selected object is locked.
    pub locked: bool,
}

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub id: ObjectId,
    pub type_name: &'static str,
    pub locked: bool,
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: Document,
    /// Style applied to new objects.
    pub settings: ToolSettings,
    selection: Vec<ObjectId>,
    tool: ToolKind,
    interaction: Interaction,
    clipboard: Vec<Object>,
    config: EditorConfig,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_document(Document::new(&config), config)
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        Self {
            document,
            settings: ToolSettings::default(),
            selection: Vec::new(),
            tool: ToolKind::default(),
            interaction: Interaction::new(),
            clipboard: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    // --- tools ---------------------------------------------------------

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tool by name. An open text box is committed first.
    pub fn set_tool(&mut self, name: &str) -> Result<(), EditError> {
        let tool = ToolKind::from_name(name)
            .ok_or_else(|| EditError::UnknownTool(name.to_string()))?;
        self.set_tool_kind(tool);
        Ok(())
    }

    pub fn set_tool_kind(&mut self, tool: ToolKind) {
        self.commit_text();
        if !self.interaction.is_idle() {
            self.pointer_leave();
        }
        self.tool = tool;
        log::debug!("Tool: {}", tool.name());
    }

    // --- pointer and text input ----------------------------------------

    fn run(
        &mut self,
        f: impl FnOnce(&mut Interaction, &mut EditContext<'_>) -> GestureOutcome,
    ) -> GestureOutcome {
        let (scene, ids) = self.document.scene_and_ids_mut();
        let mut ctx = EditContext {
            scene,
            selection: &mut self.selection,
            tool: self.tool,
            settings: &self.settings,
            ids,
            config: &self.config,
        };
        let outcome = f(&mut self.interaction, &mut ctx);
        if outcome == GestureOutcome::Committed {
            self.document.snapshot();
        }
        outcome
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> GestureOutcome {
        match event {
            PointerEvent::Down { position, modifiers } => self.pointer_down(position, modifiers),
            PointerEvent::Move { position, modifiers } => self.pointer_move(position, modifiers),
            PointerEvent::Up { position, modifiers } => self.pointer_up(position, modifiers),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) -> GestureOutcome {
        self.run(|i, ctx| i.pointer_down(ctx, point, modifiers))
    }

    pub fn pointer_move(&mut self, point: Point, modifiers: Modifiers) -> GestureOutcome {
        self.run(|i, ctx| i.pointer_move(ctx, point, modifiers))
    }

    pub fn pointer_up(&mut self, point: Point, modifiers: Modifiers) -> GestureOutcome {
        self.run(|i, ctx| i.pointer_up(ctx, point, modifiers))
    }

    pub fn pointer_leave(&mut self) -> GestureOutcome {
        self.run(|i, ctx| i.pointer_leave(ctx))
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        self.interaction.insert_text(text)
    }

    pub fn newline(&mut self) -> bool {
        self.interaction.newline()
    }

    pub fn backspace(&mut self) -> bool {
        self.interaction.backspace()
    }

    pub fn commit_text(&mut self) -> GestureOutcome {
        self.run(|i, ctx| i.commit_text(ctx))
    }

    pub fn cancel_text(&mut self) -> bool {
        self.interaction.cancel_text()
    }

    // --- selection -----------------------------------------------------

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection, ignoring ids not on the current page.
    pub fn select(&mut self, ids: &[ObjectId]) {
        let scene = self.document.scene();
        self.selection = ids.iter().copied().filter(|id| scene.contains(*id)).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection = self.document.scene().z_order().to_vec();
    }

    /// Selected objects, back to front.
    pub fn selected_objects(&self) -> Vec<&Object> {
        self.document
            .scene()
            .ordered()
            .filter(|o| self.selection.contains(&o.id()))
            .collect()
    }

    /// Frame to draw around the selection: rotated with a single object,
    /// axis-aligned around several.
    pub fn selection_frame(&self) -> Option<SelectionFrame> {
        match self.selected_objects().as_slice() {
            [] => None,
            [only] => Some(SelectionFrame::for_object(only)),
            many => SelectionFrame::for_objects(many.iter().copied()),
        }
    }

    pub fn selection_properties(&self) -> Option<SelectionProperties> {
        let selected = self.selected_objects();
        let first = selected.first()?;
        Some(SelectionProperties {
            count: selected.len(),
            color: selected.iter().find_map(|o| o.color()),
            opacity: first.opacity,
            size: selected.iter().find_map(|o| o.size()),
            corner_radius: selected.iter().find_map(|o| o.corner_radius()),
            sides: selected.iter().find_map(|o| o.sides()),
            fill: selected.iter().find_map(|o| o.fill()),
            locked: selected.iter().all(|o| o.locked),
        })
    }

    /// Layer panel rows, topmost first.
    pub fn layers(&self) -> Vec<LayerInfo> {
        self.document
            .scene()
            .ordered()
            .rev()
            .map(|o| LayerInfo {
                id: o.id(),
                type_name: o.type_name(),
                locked: o.locked,
            })
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.document.scene().len()
    }

    // --- property edits ------------------------------------------------

    /// Apply `edit` to every unlocked selected object and snapshot once.
    /// Edits that change nothing leave history alone.
    fn edit_selection(&mut self, mut edit: impl FnMut(&mut Object)) -> Result<(), EditError> {
        if self.selection.is_empty() {
            return Err(EditError::NothingSelected);
        }
        let scene = self.document.scene_mut();
        let targets: Vec<ObjectId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| scene.find(*id).is_some_and(|o| !o.locked))
            .collect();
        if targets.is_empty() {
            log::warn!("Property edit skipped: selection is locked");
            return Err(EditError::Locked);
        }
        let mut changed = false;
        for id in targets {
            if let Some(object) = scene.find_mut(id) {
                let before = object.clone();
                edit(object);
                changed |= *object != before;
            }
        }
        if changed {
            self.document.snapshot();
        }
        Ok(())
    }

    pub fn set_color(&mut self, color: SerializableColor) -> Result<(), EditError> {
        self.settings.color = color;
        self.edit_selection(|o| o.set_color(color))
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), EditError> {
        let opacity = opacity.clamp(0.0, 1.0);
        self.settings.opacity = opacity;
        self.edit_selection(|o| o.opacity = opacity)
    }

    /// Line width for strokes and shapes, font size for text.
    pub fn set_size(&mut self, size: f64) -> Result<(), EditError> {
        let size = size.max(0.0);
        self.settings.size = size;
        self.edit_selection(|o| o.set_size(size))
    }

    pub fn set_corner_radius(&mut self, radius: f64) -> Result<(), EditError> {
        self.settings.corner_radius = radius.clamp(0.0, 100.0);
        self.edit_selection(|o| o.set_corner_radius(radius))
    }

    pub fn set_sides(&mut self, sides: u32) -> Result<(), EditError> {
        self.settings.sides = Some(sides);
        self.edit_selection(|o| o.set_sides(sides))
    }

    pub fn set_fill(&mut self, fill: bool) -> Result<(), EditError> {
        self.settings.fill = fill;
        self.edit_selection(|o| o.set_fill(fill))
    }

    pub fn set_font_family(&mut self, family: FontFamily) -> Result<(), EditError> {
        self.settings.font_family = family;
        self.edit_selection(|o| {
            if let ObjectKind::Text(text) = &mut o.kind {
                text.font_family = family;
            }
        })
    }

    // --- structure commands --------------------------------------------

    /// Wrap the selection in a group placed at the topmost member's z-position.
    pub fn group(&mut self) -> Result<ObjectId, EditError> {
        let scene = self.document.scene();
        let mut members: Vec<(usize, ObjectId)> = self
            .selection
            .iter()
            .filter_map(|id| scene.index_of(*id).map(|i| (i, *id)))
            .collect();
        if members.len() < 2 {
            return Err(EditError::TooFewToGroup);
        }
        members.sort_unstable();
        let top = members.last().map_or(0, |(i, _)| *i);
        let insert_at = top + 1 - members.len();

        let (scene, ids) = self.document.scene_and_ids_mut();
        let children: Vec<Object> = members
            .iter()
            .filter_map(|(_, id)| scene.remove(*id))
            .collect();
        let group_id = ids.next_id();
        let group = Object::new(
            group_id,
            ObjectKind::Group(Group::new(children)),
        );
        scene.insert_at(insert_at, group);
        self.selection = vec![group_id];
        self.document.snapshot();
        log::debug!("Grouped {} objects into {group_id}", members.len());
        Ok(group_id)
    }

    /// Dissolve the single selected group. Children get new ids, take the
    /// group's z-position and absorb its rotation so nothing moves on screen.
    pub fn ungroup(&mut self) -> Result<Vec<ObjectId>, EditError> {
        let [group_id] = self.selection.as_slice() else {
            return Err(if self.selection.is_empty() {
                EditError::NothingSelected
            } else {
                EditError::NotAGroup
            });
        };
        let group_id = *group_id;
        let (scene, ids) = self.document.scene_and_ids_mut();
        if !scene.find(group_id).is_some_and(Object::is_group) {
            return Err(EditError::NotAGroup);
        }
        let index = scene.index_of(group_id).unwrap_or(scene.len());
        let Some(group) = scene.remove(group_id) else {
            return Err(EditError::NotAGroup);
        };
        let center = pivot(&group);
        let angle = group.rotation;
        let ObjectKind::Group(inner) = group.kind else {
            return Err(EditError::NotAGroup);
        };

        let mut new_ids = Vec::with_capacity(inner.children.len());
        for (offset, mut child) in inner.ungroup().into_iter().enumerate() {
            if angle != 0.0 {
                let c = pivot(&child);
                translate(&mut child, rotate_point(center, c, angle) - c);
                child.rotation += angle;
            }
            child.regenerate_ids(ids);
            new_ids.push(child.id());
            scene.insert_at(index + offset, child);
        }
        self.selection = new_ids.clone();
        self.document.snapshot();
        log::debug!("Ungrouped {group_id} into {} objects", new_ids.len());
        Ok(new_ids)
    }

    /// Copy the selection to the internal clipboard. Returns how many objects were copied.
    pub fn copy(&mut self) -> Result<usize, EditError> {
        let copied: Vec<Object> = self.selected_objects().into_iter().cloned().collect();
        if copied.is_empty() {
            return Err(EditError::NothingSelected);
        }
        self.clipboard = copied;
        Ok(self.clipboard.len())
    }

    fn place_copies(&mut self, sources: Vec<Object>) -> Vec<ObjectId> {
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let (scene, ids) = self.document.scene_and_ids_mut();
        let mut new_ids = Vec::with_capacity(sources.len());
        for mut object in sources {
            translate(&mut object, offset);
            object.regenerate_ids(ids);
            new_ids.push(object.id());
            scene.append(object);
        }
        self.selection = new_ids.clone();
        self.document.snapshot();
        new_ids
    }

    /// Paste the internal clipboard, offset and with fresh ids.
    pub fn paste(&mut self) -> Result<Vec<ObjectId>, EditError> {
        if self.clipboard.is_empty() {
            return Err(EditError::NothingToPaste);
        }
        let new_ids = self.place_copies(self.clipboard.clone());
        // Repeated pastes cascade instead of stacking.
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        self.clipboard.iter_mut().for_each(|o| translate(o, offset));
        Ok(new_ids)
    }

    /// Paste the internal clipboard, or else the image from the OS clipboard.
    pub fn paste_with_fallback(
        &mut self,
        os_image: Option<ImageSource>,
        center: Point,
    ) -> Result<Vec<ObjectId>, EditError> {
        if !self.clipboard.is_empty() {
            return self.paste();
        }
        match os_image {
            Some(source) => Ok(vec![self.insert_image(source, center)]),
            None => Err(EditError::NothingToPaste),
        }
    }

    pub fn duplicate(&mut self) -> Result<Vec<ObjectId>, EditError> {
        let copies: Vec<Object> = self.selected_objects().into_iter().cloned().collect();
        if copies.is_empty() {
            return Err(EditError::NothingSelected);
        }
        Ok(self.place_copies(copies))
    }

    /// Add a decoded image centered on `center`, shrunk to fit 800x600.
    pub fn insert_image(&mut self, source: ImageSource, center: Point) -> ObjectId {
        let mut image =
            ImageObject::new(Point::ZERO, source).fit_within(IMAGE_FIT_WIDTH, IMAGE_FIT_HEIGHT);
        image.position = Point::new(center.x - image.width / 2.0, center.y - image.height / 2.0);
        let (scene, ids) = self.document.scene_and_ids_mut();
        let id = ids.next_id();
        scene.append(Object::new(id, ObjectKind::Image(image)));
        self.selection = vec![id];
        self.document.snapshot();
        log::info!("Inserted image {id}");
        id
    }

    /// Delete unlocked selected objects. Returns how many were removed.
    pub fn delete_selected(&mut self) -> Result<usize, EditError> {
        if self.selection.is_empty() {
            return Err(EditError::NothingSelected);
        }
        let selection = self.selection.clone();
        let removed = self
            .document
            .scene_mut()
            .remove_where(|o| selection.contains(&o.id()) && !o.locked);
        if removed.is_empty() {
            log::warn!("Delete skipped: selection is locked");
            return Err(EditError::Locked);
        }
        self.selection
            .retain(|id| !removed.iter().any(|o| o.id() == *id));
        self.document.snapshot();
        Ok(removed.len())
    }

    /// Lock the selection, or unlock it when everything is already locked.
    /// Returns the new lock state.
    pub fn toggle_lock(&mut self) -> Result<bool, EditError> {
        let selection = self.selection.clone();
        let scene = self.document.scene_mut();
        let present: Vec<ObjectId> = selection
            .into_iter()
            .filter(|id| scene.contains(*id))
            .collect();
        if present.is_empty() {
            return Err(EditError::NothingSelected);
        }
        let lock = !present
            .iter()
            .all(|id| scene.find(*id).is_some_and(|o| o.locked));
        for id in present {
            if let Some(object) = scene.find_mut(id) {
                object.locked = lock;
            }
        }
        self.document.snapshot();
        Ok(lock)
    }

    fn reorder(
        &mut self,
        op: impl FnOnce(&mut Scene, &[ObjectId]) -> bool,
    ) -> Result<(), EditError> {
        if self.selection.is_empty() {
            return Err(EditError::NothingSelected);
        }
        if op(self.document.scene_mut(), &self.selection) {
            self.document.snapshot();
        }
        Ok(())
    }

    pub fn bring_to_front(&mut self) -> Result<(), EditError> {
        self.reorder(|s, ids| s.bring_to_front(ids))
    }

    pub fn bring_forward(&mut self) -> Result<(), EditError> {
        self.reorder(|s, ids| s.bring_forward(ids))
    }

    pub fn send_backward(&mut self) -> Result<(), EditError> {
        self.reorder(|s, ids| s.send_backward(ids))
    }

    pub fn send_to_back(&mut self) -> Result<(), EditError> {
        self.reorder(|s, ids| s.send_to_back(ids))
    }

    /// Remove every unlocked object on the page. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        self.interaction.reset();
        let removed = self.document.scene_mut().remove_where(|o| !o.locked);
        if !removed.is_empty() {
            let scene = self.document.scene();
            self.selection.retain(|id| scene.contains(*id));
            self.document.snapshot();
        }
        removed.len()
    }

    // --- history -------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.interaction.reset();
        self.selection.clear();
        self.document.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.interaction.reset();
        self.selection.clear();
        self.document.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.document.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document.history().can_redo()
    }

    // --- pages ---------------------------------------------------------

    fn leave_page(&mut self) {
        self.commit_text();
        self.interaction.reset();
        self.selection.clear();
    }

    pub fn add_page(&mut self) -> usize {
        self.leave_page();
        self.document.add_page()
    }

    pub fn switch_page(&mut self, index: usize) -> Result<(), EditError> {
        if index != self.document.active_page() {
            self.leave_page();
        }
        self.document.switch_page(index)
    }

    pub fn delete_page(&mut self, index: usize, now: Instant) -> Result<(), EditError> {
        self.leave_page();
        self.document.delete_page(index, now)
    }

    pub fn restore_deleted_page(&mut self, now: Instant) -> Result<usize, EditError> {
        self.leave_page();
        self.document.restore_deleted_page(now)
    }

    /// Whether a deleted page can still be restored.
    pub fn has_pending_restore(&self) -> bool {
        self.document.has_pending_restore()
    }

    /// Drop the pending restore once its window has passed.
    pub fn expire_pending(&mut self, now: Instant) -> bool {
        self.document.expire_pending(now)
    }

    pub fn background(&self) -> Background {
        self.document.background()
    }

    pub fn set_background_color(&mut self, color: SerializableColor) {
        self.document.set_background_color(color);
    }

    pub fn set_background_visible(&mut self, visible: bool) {
        self.document.set_background_visible(visible);
    }
}
