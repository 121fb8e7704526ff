//! Bounding box entity and pixel rectangle types.

use uuid::Uuid;

/// Unique identifier for a box. Generated when the box enters a collection
/// (drawn, loaded or imported); never persisted.
pub type BoxId = Uuid;

/// An axis-aligned rectangle in canonical image pixels (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle spanning two corner points, normalized so that
    /// `(x, y)` is the minimum corner.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// The part of this rectangle inside a `width` x `height` image, or
    /// `None` if nothing of it is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let left = self.x.clamp(0, width);
        let top = self.y.clamp(0, height);
        let rect = Rect::from_corners(
            left,
            top,
            self.right().clamp(left, width),
            self.bottom().clamp(top, height),
        );
        rect.is_valid().then_some(rect)
    }

    /// Whether both sides are strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Whether both sides strictly exceed `min_size`.
    pub fn exceeds(&self, min_size: i32) -> bool {
        self.width > min_size && self.height > min_size
    }
}

/// Where a box came from. Hosts render predicted boxes in a different color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSource {
    /// Drawn by the user or loaded from an annotation file.
    #[default]
    Manual,
    /// Imported from an external detector.
    Predicted,
}

/// One labeled region of interest on the active image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub id: BoxId,
    pub rect: Rect,
    /// Position in the project's label list. May be stale between a label
    /// deletion and the next reload.
    pub label_index: usize,
    pub selected: bool,
    pub source: BoxSource,
}

impl BoundingBox {
    /// Create a box with a fresh id. Returns `None` unless width and height
    /// are both positive.
    pub fn new(rect: Rect, label_index: usize) -> Option<Self> {
        if !rect.is_valid() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            rect,
            label_index,
            selected: false,
            source: BoxSource::Manual,
        })
    }

    /// Mark this box as a detector prediction.
    pub fn predicted(mut self) -> Self {
        self.source = BoxSource::Predicted;
        self
    }

    /// Bounds as `(x, y, x2, y2)`.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        (self.rect.x, self.rect.y, self.rect.right(), self.rect.bottom())
    }

    /// Apply a partial update. Geometry changes that would make the box empty
    /// are rejected and leave the box untouched.
    pub fn apply(&mut self, patch: &BoxPatch) -> bool {
        let rect = Rect {
            x: patch.x.unwrap_or(self.rect.x),
            y: patch.y.unwrap_or(self.rect.y),
            width: patch.width.unwrap_or(self.rect.width),
            height: patch.height.unwrap_or(self.rect.height),
        };
        if !rect.is_valid() {
            return false;
        }
        self.rect = rect;
        if let Some(label_index) = patch.label_index {
            self.label_index = label_index;
        }
        if let Some(selected) = patch.selected {
            self.selected = selected;
        }
        true
    }
}

/// Partial update for a [`BoundingBox`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxPatch {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub label_index: Option<usize>,
    pub selected: Option<bool>,
}

impl BoxPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole rectangle.
    pub fn rect(mut self, rect: Rect) -> Self {
        self.x = Some(rect.x);
        self.y = Some(rect.y);
        self.width = Some(rect.width);
        self.height = Some(rect.height);
        self
    }

    pub fn label(mut self, label_index: usize) -> Self {
        self.label_index = Some(label_index);
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }
}
