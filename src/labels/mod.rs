//! Label registry and the label lifecycle.
//!
//! Appending and renaming only touch the registry. Deleting a label rewrites
//! every annotation file of the project so that indices stay dense; see
//! [`delete_label`].

mod registry;
pub mod reindex;

use std::path::Path;

use thiserror::Error;

use crate::format::FormatError;

pub use registry::LabelRegistry;
pub use reindex::{ReindexSummary, reindex_directory};

/// Errors raised at the label registry boundary.
#[derive(Error, Debug)]
pub enum LabelError {
    /// A project needs at least one label
    #[error("Label list is empty")]
    Empty,

    /// Deleting would leave the project without labels
    #[error("Cannot delete the last remaining label")]
    LastLabel,

    /// Label index does not exist
    #[error("Label index {index} out of range (have {len} labels)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of labels
        len: usize,
    },

    /// Blank label name
    #[error("Label name must not be empty")]
    EmptyName,

    /// Name already used by another label
    #[error("Label '{name}' already exists")]
    Duplicate {
        /// The conflicting name
        name: String,
    },

    /// Annotation directory could not be scanned
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Delete label `index`: rewrite every annotation file in `annotation_dir`,
/// then remove the name from the registry.
///
/// The registry is validated before any file is touched, so a rejected delete
/// has no effect at all. Per-file failures during the rewrite are counted in
/// the summary rather than aborting the pass.
pub fn delete_label(
    registry: &mut LabelRegistry,
    annotation_dir: &Path,
    index: usize,
) -> Result<ReindexSummary, LabelError> {
    registry.check_removable(index)?;
    let summary = reindex_directory(annotation_dir, index)?;
    let name = registry.remove(index)?;
    log::info!(
        "Deleted label {} ({}): {} boxes removed, {} shifted",
        index,
        name,
        summary.removed,
        summary.shifted
    );
    Ok(summary)
}
