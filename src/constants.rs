//! Global constants for the spectrAI annotation engine

/// Minimum width and height (exclusive, image pixels) for a drawn box.
/// Anything this size or smaller is treated as an accidental micro-drag.
pub const MIN_BOX_SIZE: i32 = 5;

/// Decimal places written for normalized coordinates.
pub const COORD_PRECISION: usize = 6;

/// Extension of per-image annotation files.
pub const ANNOTATION_EXTENSION: &str = "txt";

/// Label list file at the project root.
pub const DATASET_FILE: &str = "dataset.yaml";

/// Project descriptor at the project root.
pub const PROJECT_FILE: &str = "config.json";

/// Image extensions picked up by the image list (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
