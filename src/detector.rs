//! External object detector boundary.
//!
//! The engine does not run inference. A [`Detector`] implementation hands back
//! pixel rectangles with class indices in the detector's own label space, and
//! [`reconcile`] maps those indices into the project's label list, appending
//! any label the project does not know yet.

use std::path::Path;

use thiserror::Error;

use crate::model::{BoundingBox, Rect};

/// Errors reported by a detector implementation.
#[derive(Error, Debug)]
pub enum DetectorError {
    /// The model failed to load or run
    #[error("Detector failed: {message}")]
    Model {
        /// Description from the backend
        message: String,
    },

    /// Model or image file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One detection in image pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Index into the detector's label list.
    pub class_index: usize,
}

impl Detection {
    pub fn new(x: f32, y: f32, width: f32, height: f32, class_index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            class_index,
        }
    }

    /// Build from center form, as most detector backends report boxes.
    pub fn from_center(x_center: f32, y_center: f32, width: f32, height: f32, class_index: usize) -> Self {
        Self::new(
            x_center - width / 2.0,
            y_center - height / 2.0,
            width,
            height,
            class_index,
        )
    }

    /// Pixel rectangle clipped to the image, or `None` if nothing is left.
    pub fn to_rect(&self, image_width: u32, image_height: u32) -> Option<Rect> {
        let (w, h) = (image_width as i32, image_height as i32);
        let left = (self.x as i32).clamp(0, w);
        let top = (self.y as i32).clamp(0, h);
        let right = ((self.x + self.width) as i32).clamp(0, w);
        let bottom = ((self.y + self.height) as i32).clamp(0, h);
        let rect = Rect::new(left, top, right - left, bottom - top);
        rect.is_valid().then_some(rect)
    }
}

/// Where one detector label lands in the project label list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMapping {
    pub detector_index: usize,
    pub project_index: usize,
    pub label: String,
}

/// Map every detector label into `project_labels`.
///
/// Names are compared after trimming. Known names map to their existing
/// index; unknown names are appended and map to the new trailing index. Blank
/// names get no mapping, so their detections are skipped as unknown classes.
/// The returned list is ordered by detector index. `project_labels` is
/// mutated, so callers must persist it.
pub fn reconcile(detector_labels: &[String], project_labels: &mut Vec<String>) -> Vec<IndexMapping> {
    let mut mapping = Vec::with_capacity(detector_labels.len());
    for (detector_index, label) in detector_labels.iter().enumerate() {
        let label = label.trim();
        if label.is_empty() {
            log::warn!("Ignoring blank detector label {}", detector_index);
            continue;
        }
        let project_index = match project_labels.iter().position(|l| l == label) {
            Some(index) => index,
            None => {
                project_labels.push(label.to_string());
                log::info!("Added detector label '{}' to project", label);
                project_labels.len() - 1
            }
        };
        mapping.push(IndexMapping {
            detector_index,
            project_index,
            label: label.to_string(),
        });
    }
    mapping
}

/// Result of converting detections into boxes.
#[derive(Debug, Clone, Default)]
pub struct Imported {
    pub boxes: Vec<BoundingBox>,
    /// Detections dropped for an unknown class or empty geometry.
    pub skipped: usize,
}

/// Convert detections into predicted boxes using a reconciled mapping.
pub fn to_boxes(
    detections: &[Detection],
    mapping: &[IndexMapping],
    image_width: u32,
    image_height: u32,
) -> Imported {
    let mut imported = Imported::default();
    for detection in detections {
        let Some(entry) = mapping.iter().find(|m| m.detector_index == detection.class_index) else {
            log::warn!("Skipping detection with unknown class {}", detection.class_index);
            imported.skipped += 1;
            continue;
        };
        let bbox = detection
            .to_rect(image_width, image_height)
            .and_then(|rect| BoundingBox::new(rect, entry.project_index));
        match bbox {
            Some(bbox) => imported.boxes.push(bbox.predicted()),
            None => {
                log::warn!("Skipping empty detection {:?}", detection);
                imported.skipped += 1;
            }
        }
    }
    imported
}

/// An object detector for single images.
pub trait Detector {
    /// Ordered label names of the model.
    fn labels(&self) -> &[String];

    /// Run detection on one image.
    fn detect(&mut self, image_path: &Path) -> Result<Vec<Detection>, DetectorError>;
}
