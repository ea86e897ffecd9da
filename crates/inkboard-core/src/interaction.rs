//! Pointer gesture state machine.
//!
//! One [`Gesture`] is active at a time. Pointer-down picks it based on the
//! tool and what lies under the pointer, moves update the scene live, and
//! pointer-up (or leave) resolves it. The caller snapshots history when a
//! call reports [`GestureOutcome::Committed`].

use crate::config::EditorConfig;
use crate::geometry::{normalize_angle, pivot, rotated_bounds, translate};
use crate::hit::{find_topmost, hit_test, rect_intersects};
use crate::input::Modifiers;
use crate::scene::Scene;
use crate::selection::{
    min_resize_dimension, resize_members, resize_object, rotate_members, rotation_for_pointer,
    HandleKind, SelectionFrame,
};
use crate::shapes::{
    IdAllocator, Object, ObjectId, ObjectKind, Stroke, StrokeTool, TextBlock, VectorShape,
};
use crate::snap::{alignment_guides, constrain_square, snap_line_endpoint, snap_rotation, Guide};
use crate::tools::{ToolKind, ToolSettings};
use kurbo::{Point, Rect};

/// Id carried by objects that are still being drawn.
pub const DRAFT_ID: ObjectId = ObjectId(0);

/// Freehand points closer than this to the simplified line are dropped on commit.
const STROKE_SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Everything a gesture may read or mutate, borrowed for one call.
pub struct EditContext<'a> {
    pub scene: &'a mut Scene,
    pub selection: &'a mut Vec<ObjectId>,
    pub tool: ToolKind,
    pub settings: &'a ToolSettings,
    pub ids: &'a mut IdAllocator,
    pub config: &'a EditorConfig,
}

/// The active pointer gesture. Base objects are pre-gesture clones and are
/// never mutated while the gesture runs.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// A stroke or shape being drawn; not yet part of the scene.
    Drawing { start: Point, draft: Object },
    /// A text block being typed; not yet part of the scene.
    TextEditing { draft: Object },
    Dragging { start: Point, bases: Vec<Object> },
    Resizing {
        start: Point,
        handle: usize,
        base: Object,
    },
    Rotating { center: Point, base: Object },
    GroupResizing {
        start: Point,
        handle: usize,
        frame: Rect,
        bases: Vec<Object>,
    },
    GroupRotating {
        pivot: Point,
        start_angle: f64,
        bases: Vec<Object>,
    },
    Marqueeing { start: Point, current: Point },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Drawing { .. } => "drawing",
            Gesture::TextEditing { .. } => "text-editing",
            Gesture::Dragging { .. } => "dragging",
            Gesture::Resizing { .. } => "resizing",
            Gesture::Rotating { .. } => "rotating",
            Gesture::GroupResizing { .. } => "group-resizing",
            Gesture::GroupRotating { .. } => "group-rotating",
            Gesture::Marqueeing { .. } => "marqueeing",
        }
    }
}

/// What a pointer or text call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GestureOutcome {
    /// Nothing happened.
    Ignored,
    /// Live state changed (repaint), nothing to record yet.
    Updated,
    /// A discrete edit landed in the scene; take one history snapshot.
    Committed,
}

/// Owns the active gesture and its transient visuals.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    gesture: Gesture,
    guides: Vec<Guide>,
    last_point: Option<Point>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.gesture, Gesture::TextEditing { .. })
    }

    /// Object being drawn or typed, for painting.
    pub fn draft(&self) -> Option<&Object> {
        match &self.gesture {
            Gesture::Drawing { draft, .. } | Gesture::TextEditing { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Marqueeing { start, current } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }

    /// Alignment guides for the current drag or resize.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Drop the active gesture without committing anything.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.guides.clear();
    }

    pub fn pointer_down(
        &mut self,
        ctx: &mut EditContext<'_>,
        point: Point,
        modifiers: Modifiers,
    ) -> GestureOutcome {
        self.last_point = Some(point);
        // A missed release or an open text box ends before anything new starts.
        let previous = if self.is_editing_text() {
            self.commit_text(ctx)
        } else {
            self.finish(ctx)
        };

        self.gesture = if ctx.tool.is_drawing() {
            start_drawing(ctx, point)
        } else {
            start_selecting(ctx, point, modifiers)
        };
        log::debug!("Gesture start: {}", self.gesture.name());
        previous.max(GestureOutcome::Updated)
    }

    pub fn pointer_move(
        &mut self,
        ctx: &mut EditContext<'_>,
        point: Point,
        modifiers: Modifiers,
    ) -> GestureOutcome {
        self.last_point = Some(point);
        let config = ctx.config;
        match &mut self.gesture {
            Gesture::Idle | Gesture::TextEditing { .. } => return GestureOutcome::Ignored,
            Gesture::Drawing { start, draft } => match &mut draft.kind {
                ObjectKind::Stroke(stroke) => stroke.add_point(point),
                ObjectKind::Shape(shape) => {
                    shape.end = if !modifiers.shift {
                        point
                    } else if shape.kind.is_linear() {
                        snap_line_endpoint(*start, point, config.rotation_snap_degrees)
                    } else {
                        constrain_square(*start, point)
                    };
                }
                _ => {}
            },
            Gesture::Dragging { start, bases } => {
                let delta = point - *start;
                for base in bases.iter() {
                    let mut moved = base.clone();
                    translate(&mut moved, delta);
                    ctx.scene.replace(moved);
                }
                let ids: Vec<ObjectId> = bases.iter().map(Object::id).collect();
                self.guides = guides_for(ctx, &ids);
            }
            Gesture::Resizing {
                start,
                handle,
                base,
            } => {
                let min = min_resize_dimension(base, config.min_vector_size, config.min_box_size);
                let resized = resize_object(base, *handle, point - *start, modifiers.shift, min);
                ctx.scene.replace(resized);
                self.guides = guides_for(ctx, &[base.id()]);
            }
            Gesture::Rotating { center, base } => {
                let mut angle = rotation_for_pointer(*center, point);
                if modifiers.shift {
                    angle = snap_rotation(angle, config.rotation_snap());
                }
                let mut rotated = base.clone();
                rotated.rotation = normalize_angle(angle);
                ctx.scene.replace(rotated);
            }
            Gesture::GroupResizing {
                start,
                handle,
                frame,
                bases,
            } => {
                let resized = resize_members(
                    bases,
                    *frame,
                    *handle,
                    point - *start,
                    modifiers.shift,
                    config.min_box_size,
                );
                for object in resized {
                    ctx.scene.replace(object);
                }
                let ids: Vec<ObjectId> = bases.iter().map(Object::id).collect();
                self.guides = guides_for(ctx, &ids);
            }
            Gesture::GroupRotating {
                pivot,
                start_angle,
                bases,
            } => {
                let d = point - *pivot;
                let mut delta = d.y.atan2(d.x) - *start_angle;
                if modifiers.shift {
                    delta = snap_rotation(delta, config.rotation_snap());
                }
                for object in rotate_members(bases, *pivot, delta) {
                    ctx.scene.replace(object);
                }
            }
            Gesture::Marqueeing { current, .. } => *current = point,
        }
        GestureOutcome::Updated
    }

    pub fn pointer_up(
        &mut self,
        ctx: &mut EditContext<'_>,
        point: Point,
        modifiers: Modifiers,
    ) -> GestureOutcome {
        if self.is_editing_text() {
            return GestureOutcome::Ignored;
        }
        self.pointer_move(ctx, point, modifiers);
        self.finish(ctx)
    }

    /// The pointer left the canvas: resolve exactly like a release at the
    /// last known position.
    pub fn pointer_leave(&mut self, ctx: &mut EditContext<'_>) -> GestureOutcome {
        match self.last_point {
            Some(point) => self.pointer_up(ctx, point, Modifiers::NONE),
            None => GestureOutcome::Ignored,
        }
    }

    /// Resolve the active gesture and return to idle.
    fn finish(&mut self, ctx: &mut EditContext<'_>) -> GestureOutcome {
        self.guides.clear();
        let gesture = std::mem::take(&mut self.gesture);
        let outcome = match gesture {
            Gesture::Idle => return GestureOutcome::Ignored,
            Gesture::TextEditing { draft } => {
                // Only reached through `commit_text`.
                self.gesture = Gesture::TextEditing { draft };
                return GestureOutcome::Ignored;
            }
            Gesture::Drawing { draft, .. } => commit_drawing(ctx, draft),
            Gesture::Dragging { bases, .. }
            | Gesture::GroupResizing { bases, .. }
            | Gesture::GroupRotating { bases, .. } => changed_outcome(ctx.scene, &bases),
            Gesture::Resizing { base, .. } | Gesture::Rotating { base, .. } => {
                changed_outcome(ctx.scene, std::slice::from_ref(&base))
            }
            Gesture::Marqueeing { start, current } => {
                let threshold = ctx.config.marquee_threshold;
                if (current.x - start.x).abs() <= threshold
                    && (current.y - start.y).abs() <= threshold
                {
                    GestureOutcome::Ignored
                } else {
                    let rect = Rect::from_points(start, current);
                    *ctx.selection = ctx
                        .scene
                        .ordered()
                        .filter(|o| rect_intersects(o, rect))
                        .map(Object::id)
                        .collect();
                    GestureOutcome::Updated
                }
            }
        };
        log::debug!("Gesture end: {outcome:?}");
        outcome
    }

    /// Append typed text at the caret (end of the last line).
    pub fn insert_text(&mut self, text: &str) -> bool {
        let Some(block) = self.text_draft_mut() else {
            return false;
        };
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            match block.lines.last_mut() {
                Some(line) => line.push_str(first),
                None => block.lines.push(first.to_owned()),
            }
        }
        block.lines.extend(parts.map(str::to_owned));
        true
    }

    pub fn newline(&mut self) -> bool {
        self.insert_text("\n")
    }

    /// Delete the character before the caret, joining lines at a line start.
    pub fn backspace(&mut self) -> bool {
        let Some(block) = self.text_draft_mut() else {
            return false;
        };
        let rows = block.lines.len();
        match block.lines.last_mut() {
            Some(line) if !line.is_empty() => {
                line.pop();
            }
            _ if rows > 1 => {
                block.lines.pop();
            }
            _ => {}
        }
        true
    }

    /// Commit the text box. Blank text is discarded without a snapshot.
    pub fn commit_text(&mut self, ctx: &mut EditContext<'_>) -> GestureOutcome {
        if !self.is_editing_text() {
            return GestureOutcome::Ignored;
        }
        let Gesture::TextEditing { mut draft } = std::mem::take(&mut self.gesture) else {
            return GestureOutcome::Ignored;
        };
        let blank = matches!(&draft.kind, ObjectKind::Text(t) if t.is_blank());
        if blank {
            log::debug!("Discarding empty text box");
            return GestureOutcome::Ignored;
        }
        draft.id = ctx.ids.next_id();
        log::debug!("Committed text {}", draft.id);
        ctx.scene.append(draft);
        GestureOutcome::Committed
    }

    pub fn cancel_text(&mut self) -> bool {
        if self.is_editing_text() {
            self.gesture = Gesture::Idle;
            true
        } else {
            false
        }
    }

    fn text_draft_mut(&mut self) -> Option<&mut TextBlock> {
        match &mut self.gesture {
            Gesture::TextEditing { draft } => match &mut draft.kind {
                ObjectKind::Text(block) => Some(block),
                _ => None,
            },
            _ => None,
        }
    }
}

fn start_drawing(ctx: &EditContext<'_>, point: Point) -> Gesture {
    let settings = ctx.settings;
    let kind = match ctx.tool {
        ToolKind::Text => {
            let mut block = TextBlock::new(point, "")
                .with_font_size(settings.font_size)
                .with_color(settings.color);
            block.font_family = settings.font_family;
            let mut draft = Object::new(DRAFT_ID, ObjectKind::Text(block));
            draft.opacity = settings.opacity;
            return Gesture::TextEditing { draft };
        }
        ToolKind::Shape(kind) => {
            let mut shape = VectorShape::new(kind, point, point)
                .with_color(settings.color)
                .with_size(settings.size)
                .with_fill(settings.fill);
            shape.corner_radius = settings.corner_radius.clamp(0.0, 100.0);
            shape.sides = settings
                .sides
                .map_or(kind.default_sides(), |s| kind.clamp_sides(s));
            ObjectKind::Shape(shape)
        }
        tool => {
            let stroke_tool = tool.stroke_tool().unwrap_or_default();
            ObjectKind::Stroke(
                Stroke::new(vec![point], stroke_tool)
                    .with_color(settings.color)
                    .with_size(settings.size),
            )
        }
    };
    let mut draft = Object::new(DRAFT_ID, kind);
    draft.opacity = settings.opacity;
    Gesture::Drawing {
        start: point,
        draft,
    }
}

fn start_selecting(ctx: &mut EditContext<'_>, point: Point, modifiers: Modifiers) -> Gesture {
    let config = ctx.config;
    let selected: Vec<&Object> = ctx
        .selection
        .iter()
        .filter_map(|id| ctx.scene.find(*id))
        .collect();

    if selected.len() > 1 {
        let unlocked: Vec<Object> = selected
            .iter()
            .filter(|o| !o.locked)
            .map(|o| (*o).clone())
            .collect();
        if let Some(frame) = SelectionFrame::for_objects(selected.iter().copied()) {
            let grabbed = frame.handle_at(point, config.handle_radius, config.rotate_handle_offset);
            match grabbed {
                Some(_) if unlocked.is_empty() => {}
                Some(HandleKind::Rotate) => {
                    let pivot = frame.center();
                    let d = point - pivot;
                    return Gesture::GroupRotating {
                        pivot,
                        start_angle: d.y.atan2(d.x),
                        bases: unlocked,
                    };
                }
                Some(HandleKind::Resize(handle)) => {
                    return Gesture::GroupResizing {
                        start: point,
                        handle,
                        frame: frame.bounds,
                        bases: unlocked,
                    };
                }
                None => {}
            }
        }
    } else if let [only] = selected.as_slice() {
        if !only.locked {
            let frame = SelectionFrame::for_object(only);
            match frame.handle_at(point, config.handle_radius, config.rotate_handle_offset) {
                Some(HandleKind::Rotate) => {
                    return Gesture::Rotating {
                        center: pivot(only),
                        base: (*only).clone(),
                    };
                }
                Some(HandleKind::Resize(handle)) => {
                    return Gesture::Resizing {
                        start: point,
                        handle,
                        base: (*only).clone(),
                    };
                }
                None => {}
            }
        }
    }

    let Some(hit) = find_topmost(ctx.scene, point, config.hit_padding) else {
        ctx.selection.clear();
        return Gesture::Marqueeing {
            start: point,
            current: point,
        };
    };
    let hit_id = hit.id();
    let hit_locked = hit.locked;

    if modifiers.shift {
        if let Some(pos) = ctx.selection.iter().position(|id| *id == hit_id) {
            ctx.selection.remove(pos);
            return Gesture::Idle;
        }
        ctx.selection.push(hit_id);
    } else if !ctx.selection.contains(&hit_id) {
        *ctx.selection = vec![hit_id];
    }

    if hit_locked {
        return Gesture::Idle;
    }
    let bases: Vec<Object> = ctx
        .selection
        .iter()
        .filter_map(|id| ctx.scene.find(*id))
        .filter(|o| !o.locked)
        .cloned()
        .collect();
    Gesture::Dragging {
        start: point,
        bases,
    }
}

fn commit_drawing(ctx: &mut EditContext<'_>, mut draft: Object) -> GestureOutcome {
    match &mut draft.kind {
        ObjectKind::Stroke(stroke) if stroke.tool == StrokeTool::Eraser => {
            let pad = stroke.size;
            let points = stroke.points.clone();
            let removed = ctx
                .scene
                .remove_where(|o| !o.locked && points.iter().any(|p| hit_test(o, *p, pad)));
            if removed.is_empty() {
                return GestureOutcome::Ignored;
            }
            ctx.selection
                .retain(|id| !removed.iter().any(|o| o.id() == *id));
            log::debug!("Eraser removed {} objects", removed.len());
            return GestureOutcome::Committed;
        }
        ObjectKind::Stroke(stroke) => stroke.simplify(STROKE_SIMPLIFY_TOLERANCE),
        ObjectKind::Shape(shape) => {
            let b = shape.bounds();
            if b.width() < 1.0 && b.height() < 1.0 {
                log::debug!("Discarding zero-size {}", shape.kind.name());
                return GestureOutcome::Ignored;
            }
        }
        _ => {}
    }
    draft.id = ctx.ids.next_id();
    log::debug!("Committed {} {}", draft.type_name(), draft.id);
    ctx.scene.append(draft);
    GestureOutcome::Committed
}

/// Committed if any base object differs from its live counterpart.
fn changed_outcome(scene: &Scene, bases: &[Object]) -> GestureOutcome {
    let changed = bases.iter().any(|b| scene.find(b.id()) != Some(b));
    if changed {
        GestureOutcome::Committed
    } else {
        GestureOutcome::Ignored
    }
}

fn guides_for(ctx: &EditContext<'_>, moving: &[ObjectId]) -> Vec<Guide> {
    let Some(moving_bounds) = crate::geometry::union_bounds(
        moving.iter().filter_map(|id| ctx.scene.find(*id)),
    ) else {
        return Vec::new();
    };
    let others: Vec<Rect> = ctx
        .scene
        .ordered()
        .filter(|o| !moving.contains(&o.id()) && !ctx.selection.contains(&o.id()))
        .map(rotated_bounds)
        .collect();
    alignment_guides(moving_bounds, &others, ctx.config.guide_threshold)
}
