//! Persistence formats.
//!
//! ## Files
//!
//! - **Annotation files** ([`yolo`]): one normalized text file per image,
//!   stored in the project's annotation directory.
//! - **Label list** ([`dataset`]): the project's ordered label names, also used
//!   for detector model label files.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spectrai::format::{self, SaveOutcome};
//!
//! let path = format::annotation_path(&annotation_dir, &image_path);
//! match format::save(&boxes, 640, 480, &path)? {
//!     SaveOutcome::Written(n) => println!("wrote {n} boxes"),
//!     SaveOutcome::SkippedEmpty => {}
//! }
//! ```

pub mod dataset;
mod error;
pub mod yolo;

#[cfg(test)]
mod tests;

pub use dataset::{DatasetFile, LabelNames, read_labels, write_labels};
pub use error::FormatError;
pub use yolo::{NormalizedBox, PixelBox, SaveOutcome, annotation_path, load, read_records, save};
