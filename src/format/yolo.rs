//! Per-image annotation file codec.
//!
//! One text file per image, one line per box:
//!
//! ```text
//! <label_index>\t<x_center>\t<y_center>\t<width>\t<height>
//! ```
//!
//! Center and size are normalized to `[0, 1]` against the original image size
//! and written with six decimals. Readers accept any whitespace separator.
//! A missing file means "not annotated yet".

use std::path::{Path, PathBuf};

use crate::constants::{ANNOTATION_EXTENSION, COORD_PRECISION};
use crate::format::error::FormatError;
use crate::model::{BoundingBox, Rect};

/// One persisted box, normalized to the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub label_index: usize,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    pub fn new(label_index: usize, x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            label_index,
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Normalize a pixel rectangle against the image size.
    pub fn from_rect(rect: &Rect, label_index: usize, image_width: u32, image_height: u32) -> Self {
        let (img_w, img_h) = (f64::from(image_width), f64::from(image_height));
        let (w, h) = (f64::from(rect.width), f64::from(rect.height));
        Self {
            label_index,
            x_center: (f64::from(rect.x) + w / 2.0) / img_w,
            y_center: (f64::from(rect.y) + h / 2.0) / img_h,
            width: w / img_w,
            height: h / img_h,
        }
    }

    /// Convert back to pixels. Values are truncated, not rounded.
    pub fn to_rect(&self, image_width: u32, image_height: u32) -> Rect {
        let abs_width = self.width * f64::from(image_width);
        let abs_height = self.height * f64::from(image_height);
        let abs_x = self.x_center * f64::from(image_width) - abs_width / 2.0;
        let abs_y = self.y_center * f64::from(image_height) - abs_height / 2.0;
        Rect::new(
            abs_x as i32,
            abs_y as i32,
            abs_width as i32,
            abs_height as i32,
        )
    }

    /// Format as a tab-separated annotation line (no newline).
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{:.prec$}\t{:.prec$}\t{:.prec$}\t{:.prec$}",
            self.label_index,
            self.x_center,
            self.y_center,
            self.width,
            self.height,
            prec = COORD_PRECISION
        )
    }

    /// Parse an annotation line. Extra trailing fields are ignored; `inf` and
    /// `NaN` coordinates make the line invalid.
    pub fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            return None;
        }

        let label_index: usize = parts[0].parse().ok()?;
        let x_center: f64 = parts[1].parse().ok()?;
        let y_center: f64 = parts[2].parse().ok()?;
        let width: f64 = parts[3].parse().ok()?;
        let height: f64 = parts[4].parse().ok()?;
        if ![x_center, y_center, width, height].iter().all(|v| v.is_finite()) {
            return None;
        }

        Some(Self::new(label_index, x_center, y_center, width, height))
    }
}

/// A denormalized box read from disk, before it is given an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub label_index: usize,
    pub rect: Rect,
}

/// Result of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file was written with this many lines.
    Written(usize),
    /// There was nothing to save; any existing file was left untouched.
    SkippedEmpty,
}

/// Path of the annotation file for an image: same stem, `.txt` extension.
pub fn annotation_path(annotation_dir: &Path, image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    annotation_dir.join(format!("{}.{}", stem, ANNOTATION_EXTENSION))
}

/// Write boxes to `path`, replacing its contents.
///
/// An empty `boxes` slice is a no-op: the file is neither created nor
/// truncated, so navigating away from an unannotated view can never wipe a
/// previously saved file.
pub fn save(
    boxes: &[BoundingBox],
    image_width: u32,
    image_height: u32,
    path: &Path,
) -> Result<SaveOutcome, FormatError> {
    if boxes.is_empty() {
        log::debug!("No annotations to save, keeping {:?} as is", path);
        return Ok(SaveOutcome::SkippedEmpty);
    }
    if image_width == 0 || image_height == 0 {
        return Err(FormatError::InvalidDimensions {
            width: image_width,
            height: image_height,
        });
    }

    let mut content = String::new();
    for bbox in boxes {
        let record = NormalizedBox::from_rect(&bbox.rect, bbox.label_index, image_width, image_height);
        content.push_str(&record.to_line());
        content.push('\n');
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;

    log::info!("Saved {} annotations to {:?}", boxes.len(), path);
    Ok(SaveOutcome::Written(boxes.len()))
}

/// Read the normalized records in an annotation file.
///
/// A missing file yields an empty list. Malformed lines are skipped with a
/// warning; the rest of the file is still read.
pub fn read_records(path: &Path) -> Result<Vec<NormalizedBox>, FormatError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match NormalizedBox::parse_line(line) {
            Some(record) => records.push(record),
            None => log::warn!(
                "Skipping malformed line {} in {:?}: {:?}",
                line_no + 1,
                path,
                line
            ),
        }
    }
    Ok(records)
}

/// Read an annotation file and denormalize it against the image size.
pub fn load(path: &Path, image_width: u32, image_height: u32) -> Result<Vec<PixelBox>, FormatError> {
    if image_width == 0 || image_height == 0 {
        return Err(FormatError::InvalidDimensions {
            width: image_width,
            height: image_height,
        });
    }

    Ok(read_records(path)?
        .into_iter()
        .map(|record| PixelBox {
            label_index: record.label_index,
            rect: record.to_rect(image_width, image_height),
        })
        .collect())
}
