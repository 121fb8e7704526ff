//! Pointer-driven box drawing.
//!
//! Boxes are drawn with two clicks: the first click anchors a corner, the
//! pointer then drags a preview, and the second click finalizes the box. In
//! erase and update modes a click acts on the box under the pointer instead.

use crate::constants::MIN_BOX_SIZE;
use crate::model::{BoundingBox, BoxCollection, BoxId, BoxPatch, Rect};
use crate::transform::CoordinateTransform;

/// Interaction mode, chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Draw new boxes, click a box to select it.
    #[default]
    Box,
    /// Click a box to delete it.
    Erase,
    /// Click a box to give it the current label.
    Update,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Box => "Box",
            Mode::Erase => "Erase",
            Mode::Update => "Update",
        }
    }

    pub fn all() -> &'static [Mode] {
        &[Mode::Box, Mode::Erase, Mode::Update]
    }
}

/// Drawing state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// First click placed. Both points are in image pixels.
    Anchored {
        anchor: (i32, i32),
        current: (i32, i32),
    },
}

/// Pointer input, in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    /// Explicit abort (Escape).
    Cancel,
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Nothing happened.
    Ignored,
    /// First corner placed.
    Anchored,
    /// Preview rectangle changed.
    PreviewUpdated,
    /// An existing box was selected.
    Selected(BoxId),
    /// A new box was added.
    Created(BoxId),
    /// The second click produced a box too small to keep.
    Rejected,
    /// The pending anchor was discarded.
    Cancelled,
    /// A box was deleted (erase mode).
    Erased(BoxId),
    /// A box got the current label (update mode).
    Relabeled(BoxId),
}

/// Drawing state for the active image.
#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    mode: Mode,
    phase: Phase,
}

impl DrawingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self.phase, Phase::Anchored { .. })
    }

    /// Switch mode. Always drops a pending anchor and clears box selection,
    /// even when the mode does not change.
    pub fn set_mode(&mut self, mode: Mode, boxes: &mut BoxCollection) {
        self.mode = mode;
        self.phase = Phase::Idle;
        boxes.clear_selection();
        log::debug!("Mode: {}", mode.name());
    }

    /// Drop any pending anchor (new image, project teardown).
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Dispatch a pointer event.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        transform: &CoordinateTransform,
        boxes: &mut BoxCollection,
        active_label: usize,
    ) -> DrawOutcome {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(x, y, transform, boxes, active_label),
            PointerEvent::Move { x, y } => self.pointer_move(x, y, transform),
            PointerEvent::Cancel => self.cancel(),
        }
    }

    pub fn pointer_down(
        &mut self,
        screen_x: i32,
        screen_y: i32,
        transform: &CoordinateTransform,
        boxes: &mut BoxCollection,
        active_label: usize,
    ) -> DrawOutcome {
        match self.mode {
            Mode::Box => self.box_click(screen_x, screen_y, transform, boxes, active_label),
            Mode::Erase => match boxes.hit_test(screen_x, screen_y, transform) {
                Some(id) => {
                    boxes.remove(id);
                    log::info!("Erased box {}", id);
                    DrawOutcome::Erased(id)
                }
                None => DrawOutcome::Ignored,
            },
            Mode::Update => match boxes.hit_test(screen_x, screen_y, transform) {
                Some(id) => {
                    boxes.update(id, &BoxPatch::new().label(active_label));
                    log::info!("Relabeled box {} -> {}", id, active_label);
                    DrawOutcome::Relabeled(id)
                }
                None => DrawOutcome::Ignored,
            },
        }
    }

    fn box_click(
        &mut self,
        screen_x: i32,
        screen_y: i32,
        transform: &CoordinateTransform,
        boxes: &mut BoxCollection,
        active_label: usize,
    ) -> DrawOutcome {
        if !transform.contains_screen_point(screen_x, screen_y) {
            return DrawOutcome::Ignored;
        }
        let Some(point) = transform.to_image(screen_x, screen_y) else {
            return DrawOutcome::Ignored;
        };

        match self.phase {
            Phase::Idle => {
                if let Some(id) = boxes.hit_test(screen_x, screen_y, transform) {
                    boxes.select(Some(id));
                    log::debug!("Selected box {}", id);
                    return DrawOutcome::Selected(id);
                }
                boxes.clear_selection();
                self.phase = Phase::Anchored {
                    anchor: point,
                    current: point,
                };
                log::debug!("Anchored box at {:?}", point);
                DrawOutcome::Anchored
            }
            Phase::Anchored { anchor, .. } => {
                self.phase = Phase::Idle;
                let rect = Rect::from_corners(anchor.0, anchor.1, point.0, point.1);
                if !rect.exceeds(MIN_BOX_SIZE) {
                    log::debug!("Discarded box {:?}: too small", rect);
                    return DrawOutcome::Rejected;
                }
                match BoundingBox::new(rect, active_label) {
                    Some(bbox) => {
                        let id = boxes.add(bbox);
                        log::info!("Created box {} {:?} (label={})", id, rect, active_label);
                        DrawOutcome::Created(id)
                    }
                    None => DrawOutcome::Rejected,
                }
            }
        }
    }

    /// Track the pointer while anchored. The preview corner is clamped to the
    /// image.
    pub fn pointer_move(
        &mut self,
        screen_x: i32,
        screen_y: i32,
        transform: &CoordinateTransform,
    ) -> DrawOutcome {
        if self.mode != Mode::Box {
            return DrawOutcome::Ignored;
        }
        let Phase::Anchored { anchor, .. } = self.phase else {
            return DrawOutcome::Ignored;
        };
        let Some(current) = transform.to_image_clamped(screen_x, screen_y) else {
            return DrawOutcome::Ignored;
        };
        self.phase = Phase::Anchored { anchor, current };
        DrawOutcome::PreviewUpdated
    }

    /// Abort a pending box.
    pub fn cancel(&mut self) -> DrawOutcome {
        if self.is_anchored() {
            self.phase = Phase::Idle;
            log::debug!("Drawing cancelled");
            DrawOutcome::Cancelled
        } else {
            DrawOutcome::Ignored
        }
    }

    /// Preview rectangle in image pixels.
    pub fn preview(&self) -> Option<Rect> {
        match self.phase {
            Phase::Anchored { anchor, current } => Some(Rect::from_corners(
                anchor.0, anchor.1, current.0, current.1,
            )),
            Phase::Idle => None,
        }
    }

    /// Preview rectangle in display pixels, for rendering the rubber band.
    pub fn preview_screen(&self, transform: &CoordinateTransform) -> Option<Rect> {
        let Phase::Anchored { anchor, current } = self.phase else {
            return None;
        };
        let (x1, y1) = transform.to_screen(anchor.0, anchor.1);
        let (x2, y2) = transform.to_screen(current.0, current.1);
        Some(Rect::from_corners(x1, y1, x2, y2))
    }
}
