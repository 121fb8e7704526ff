//! Box collection for the active image.

use crate::format::NormalizedBox;
use crate::model::annotation::{BoundingBox, BoxId, BoxPatch};
use crate::transform::CoordinateTransform;

/// Insertion-ordered boxes for exactly one image.
///
/// The collection never hands out mutable access to its storage; snapshots are
/// copies and every mutation goes through a named operation.
#[derive(Debug, Clone, Default)]
pub struct BoxCollection {
    boxes: Vec<BoundingBox>,
}

impl BoxCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box and return its ID.
    pub fn add(&mut self, bbox: BoundingBox) -> BoxId {
        let id = bbox.id;
        log::debug!(
            "Added box {} at {:?} (label={})",
            id,
            bbox.rect,
            bbox.label_index
        );
        self.boxes.push(bbox);
        id
    }

    /// Remove a box by ID. Returns false if no such box exists.
    pub fn remove(&mut self, id: BoxId) -> bool {
        match self.boxes.iter().position(|b| b.id == id) {
            Some(pos) => {
                self.boxes.remove(pos);
                log::debug!("Removed box {}", id);
                true
            }
            None => false,
        }
    }

    /// Get a box by ID.
    pub fn get(&self, id: BoxId) -> Option<&BoundingBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    /// Ordered snapshot of all boxes.
    pub fn get_all(&self) -> Vec<BoundingBox> {
        self.boxes.clone()
    }

    /// Iterate boxes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundingBox> {
        self.boxes.iter()
    }

    /// Boxes carrying the given label.
    pub fn by_label(&self, label_index: usize) -> Vec<BoundingBox> {
        self.boxes
            .iter()
            .filter(|b| b.label_index == label_index)
            .cloned()
            .collect()
    }

    /// Apply a partial update. Returns false if the box does not exist or the
    /// update would leave it with an empty rectangle.
    pub fn update(&mut self, id: BoxId, patch: &BoxPatch) -> bool {
        let Some(bbox) = self.boxes.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        let applied = bbox.apply(patch);
        if !applied {
            log::warn!("Rejected update of box {}: {:?}", id, patch);
        }
        applied
    }

    /// Remove all boxes.
    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn count(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Denormalize persisted records against the image size and add each as a
    /// new box with a fresh ID. Rectangles are clipped to the image; records
    /// with nothing left inside it are skipped. Returns the number of boxes
    /// added.
    pub fn import_normalized(
        &mut self,
        records: &[NormalizedBox],
        image_width: u32,
        image_height: u32,
    ) -> usize {
        let mut added = 0;
        for record in records {
            let rect = record.to_rect(image_width, image_height);
            let bbox = rect
                .clip_to(image_width, image_height)
                .and_then(|clipped| BoundingBox::new(clipped, record.label_index));
            match bbox {
                Some(bbox) => {
                    self.boxes.push(bbox);
                    added += 1;
                }
                None => log::warn!("Skipping empty box {:?} from {:?}", rect, record),
            }
        }
        added
    }

    /// Ordered copy of all boxes for serialization.
    pub fn export_all(&self) -> Vec<BoundingBox> {
        self.get_all()
    }

    /// Select one box (or none), deselecting every other box.
    pub fn select(&mut self, id: Option<BoxId>) {
        for bbox in &mut self.boxes {
            bbox.selected = Some(bbox.id) == id;
        }
    }

    pub fn clear_selection(&mut self) {
        self.select(None);
    }

    /// The selected box, if any.
    pub fn selected(&self) -> Option<BoxId> {
        self.boxes.iter().find(|b| b.selected).map(|b| b.id)
    }

    /// Remove the selected box, returning its ID.
    pub fn remove_selected(&mut self) -> Option<BoxId> {
        let id = self.selected()?;
        self.remove(id);
        Some(id)
    }

    /// Find the topmost box under a display point.
    ///
    /// Boxes are tested newest first so overlaps resolve to the most recently
    /// added box. Containment is checked in display space, edges inclusive.
    pub fn hit_test(
        &self,
        screen_x: i32,
        screen_y: i32,
        transform: &CoordinateTransform,
    ) -> Option<BoxId> {
        self.boxes.iter().rev().find_map(|bbox| {
            let (left, top) = transform.to_screen(bbox.rect.x, bbox.rect.y);
            let (right, bottom) = transform.to_screen(bbox.rect.right(), bbox.rect.bottom());
            let hit = screen_x >= left && screen_x <= right && screen_y >= top && screen_y <= bottom;
            hit.then_some(bbox.id)
        })
    }
}
