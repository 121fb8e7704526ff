//! Rewriting annotation files after a label is deleted.
//!
//! Label indices are positional, so deleting label `k` must drop every box
//! with index `k` and shift every index above `k` down by one, in every
//! annotation file of the project. The rewrite is synchronous; its cost grows
//! with the number of annotation files.

use std::path::{Path, PathBuf};

use crate::constants::ANNOTATION_EXTENSION;
use crate::format::FormatError;

/// Aggregate counts of a reindex pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexSummary {
    /// Boxes dropped because they used the deleted label.
    pub removed: usize,
    /// Boxes whose index was decremented.
    pub shifted: usize,
    /// Files written back.
    pub files_rewritten: usize,
    /// Files that could not be read or written.
    pub files_failed: usize,
}

impl std::ops::AddAssign for ReindexSummary {
    fn add_assign(&mut self, other: Self) {
        self.removed += other.removed;
        self.shifted += other.shifted;
        self.files_rewritten += other.files_rewritten;
        self.files_failed += other.files_failed;
    }
}

/// What happens to one line when label `deleted` goes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Keep the line verbatim (lower index, or no leading index).
    Keep,
    /// Drop the line.
    Remove,
    /// Replace the line with the shifted version.
    Shift(String),
}

/// Decide how a single annotation line changes when label `deleted` is removed.
///
/// Only the leading index token is inspected, so a line with a valid index and
/// damaged coordinates still follows its label. Lines without a leading index
/// are kept byte for byte. A shifted line only has that token replaced.
pub fn reindex_line(line: &str, deleted: usize) -> LineAction {
    let start = line.len() - line.trim_start().len();
    let rest = &line[start..];
    let token_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let Ok(index) = rest[..token_len].parse::<usize>() else {
        return LineAction::Keep;
    };
    match index {
        index if index == deleted => LineAction::Remove,
        index if index > deleted => LineAction::Shift(format!(
            "{}{}{}",
            &line[..start],
            index - 1,
            &rest[token_len..]
        )),
        _ => LineAction::Keep,
    }
}

/// Rewrite the content of one annotation file. Returns the new content and
/// the `(removed, shifted)` counts. Line terminators (`\n` or `\r\n`) are
/// carried over unchanged.
pub fn reindex_content(content: &str, deleted: usize) -> (String, usize, usize) {
    let mut out = String::with_capacity(content.len());
    let mut removed = 0;
    let mut shifted = 0;

    for raw in content.split_inclusive('\n') {
        let line = raw.trim_end_matches(['\r', '\n']);
        match reindex_line(line, deleted) {
            LineAction::Keep => out.push_str(raw),
            LineAction::Remove => removed += 1,
            LineAction::Shift(new_line) => {
                shifted += 1;
                out.push_str(&new_line);
                out.push_str(&raw[line.len()..]);
            }
        }
    }
    (out, removed, shifted)
}

/// Reindex a single file in place. Unchanged files are not rewritten.
pub fn reindex_file(path: &Path, deleted: usize) -> Result<ReindexSummary, FormatError> {
    let content = std::fs::read_to_string(path)?;
    let (new_content, removed, shifted) = reindex_content(&content, deleted);

    let mut summary = ReindexSummary {
        removed,
        shifted,
        ..ReindexSummary::default()
    };
    if removed > 0 || shifted > 0 {
        std::fs::write(path, new_content)?;
        summary.files_rewritten = 1;
        log::debug!(
            "Reindexed {:?}: {} removed, {} shifted",
            path,
            removed,
            shifted
        );
    }
    Ok(summary)
}

/// Annotation files in a directory, sorted by name.
pub fn annotation_files(dir: &Path) -> Result<Vec<PathBuf>, FormatError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ANNOTATION_EXTENSION))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Reindex every annotation file in `dir` for the deletion of label `deleted`.
///
/// A failure on one file is logged and counted; the remaining files are still
/// processed. A missing directory means nothing has been annotated yet.
pub fn reindex_directory(dir: &Path, deleted: usize) -> Result<ReindexSummary, FormatError> {
    if !dir.is_dir() {
        log::debug!("Annotation directory {:?} does not exist, nothing to reindex", dir);
        return Ok(ReindexSummary::default());
    }

    let mut summary = ReindexSummary::default();
    for path in annotation_files(dir)? {
        match reindex_file(&path, deleted) {
            Ok(file_summary) => summary += file_summary,
            Err(e) => {
                log::error!("Failed to reindex {:?}: {}", path, e);
                summary.files_failed += 1;
            }
        }
    }

    log::info!(
        "Reindexed annotations after deleting label {}: {} removed, {} shifted, {} files rewritten",
        deleted,
        summary.removed,
        summary.shifted,
        summary.files_rewritten
    );
    Ok(summary)
}
