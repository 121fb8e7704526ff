//! Ordered label list for the open project.

use crate::labels::LabelError;

/// The project's label names. A label's index is its identity, which is what
/// annotation files store.
///
/// The list is never empty and the current label always points at a valid slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRegistry {
    labels: Vec<String>,
    current: usize,
}

impl LabelRegistry {
    /// Create a registry from an ordered list of unique, non-empty names.
    pub fn new(labels: Vec<String>) -> Result<Self, LabelError> {
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }
        for (i, name) in labels.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(LabelError::EmptyName);
            }
            if labels[..i].contains(name) {
                return Err(LabelError::Duplicate { name: name.clone() });
            }
        }
        Ok(Self { labels, current: 0 })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == name)
    }

    /// Index assigned to newly drawn boxes.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_name(&self) -> &str {
        &self.labels[self.current]
    }

    pub fn set_current(&mut self, index: usize) -> Result<(), LabelError> {
        self.check_index(index)?;
        self.current = index;
        log::debug!("Current label: {} ({})", index, self.labels[index]);
        Ok(())
    }

    /// Append a label and return its index. Existing annotation files are
    /// unaffected since the new index is unused.
    pub fn append(&mut self, name: &str) -> Result<usize, LabelError> {
        let name = Self::validate_name(name)?;
        if self.index_of(&name).is_some() {
            return Err(LabelError::Duplicate { name });
        }
        self.labels.push(name);
        let index = self.labels.len() - 1;
        log::info!("Added label {} ({})", index, self.labels[index]);
        Ok(index)
    }

    /// Rename the label at `index` in place. Annotation files store indices,
    /// so they need no rewrite.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), LabelError> {
        self.check_index(index)?;
        let name = Self::validate_name(name)?;
        if self.index_of(&name).is_some_and(|i| i != index) {
            return Err(LabelError::Duplicate { name });
        }
        log::info!("Renamed label {}: {} -> {}", index, self.labels[index], name);
        self.labels[index] = name;
        Ok(())
    }

    /// Check that the label at `index` may be deleted.
    pub fn check_removable(&self, index: usize) -> Result<(), LabelError> {
        self.check_index(index)?;
        if self.labels.len() == 1 {
            return Err(LabelError::LastLabel);
        }
        Ok(())
    }

    /// Remove the label at `index` from memory only.
    ///
    /// The current label keeps pointing at the same name when it sits after the
    /// removed slot, and is clamped into range otherwise. Callers are
    /// responsible for rewriting annotation files first; see
    /// [`delete_label`](crate::labels::delete_label).
    pub fn remove(&mut self, index: usize) -> Result<String, LabelError> {
        self.check_removable(index)?;
        let name = self.labels.remove(index);
        if self.current > index {
            self.current -= 1;
        }
        self.current = self.current.min(self.labels.len() - 1);
        Ok(name)
    }

    fn check_index(&self, index: usize) -> Result<(), LabelError> {
        if index >= self.labels.len() {
            return Err(LabelError::IndexOutOfRange {
                index,
                len: self.labels.len(),
            });
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<String, LabelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelError::EmptyName);
        }
        Ok(name.to_string())
    }
}
