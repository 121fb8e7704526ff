//! Label list file (`dataset.yaml`).
//!
//! ```yaml
//! path: /data/project
//! train: images/train
//! val: images/val
//! nc: 2
//! names:
//!   0: aromatics
//!   1: esters
//! ```
//!
//! `names` may also be a plain sequence. Keys this module does not know about
//! are kept and written back unchanged.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;

/// Label names as stored in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

impl Default for LabelNames {
    fn default() -> Self {
        LabelNames::Mapping(BTreeMap::new())
    }
}

impl LabelNames {
    /// Ordered label list. Gaps in a mapping are filled with `class_<i>`.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            LabelNames::Sequence(names) => names.clone(),
            LabelNames::Mapping(mapping) => {
                let Some(&max_index) = mapping.keys().next_back() else {
                    return Vec::new();
                };
                (0..=max_index)
                    .map(|i| match mapping.get(&i) {
                        Some(name) if !name.trim().is_empty() => name.clone(),
                        _ => format!("class_{}", i),
                    })
                    .collect()
            }
        }
    }
}

/// Parsed label list file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
    /// Label count.
    #[serde(default)]
    pub nc: usize,
    #[serde(default)]
    pub names: LabelNames,
    /// Any other top-level keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl DatasetFile {
    /// Parse from YAML text.
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self, FormatError> {
        serde_yaml::from_str(yaml).map_err(|e| FormatError::yaml(path, e))
    }

    /// Read and parse a label list file.
    pub fn read(path: &Path) -> Result<Self, FormatError> {
        let yaml = std::fs::read_to_string(path)?;
        let file = Self::from_yaml(&yaml, path)?;
        if file.nc != 0 && file.nc != file.names.to_vec().len() {
            log::warn!(
                "{:?} declares nc={} but lists {} names",
                path,
                file.nc,
                file.names.to_vec().len()
            );
        }
        Ok(file)
    }

    /// Ordered label names.
    pub fn labels(&self) -> Vec<String> {
        self.names.to_vec()
    }

    /// Replace the label list, keeping `nc` in sync.
    pub fn set_labels(&mut self, labels: &[String]) {
        self.names = LabelNames::Mapping(labels.iter().cloned().enumerate().collect());
        self.nc = labels.len();
    }

    /// Serialize and write to `path`.
    pub fn write(&self, path: &Path) -> Result<(), FormatError> {
        let yaml = serde_yaml::to_string(self).map_err(|e| FormatError::yaml(path, e))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

/// Read the ordered label names from a label list file.
pub fn read_labels(path: &Path) -> Result<Vec<String>, FormatError> {
    Ok(DatasetFile::read(path)?.labels())
}

/// Write `labels` to a label list file, preserving the other keys of an
/// existing file.
pub fn write_labels(path: &Path, labels: &[String]) -> Result<(), FormatError> {
    let mut file = if path.exists() {
        DatasetFile::read(path)?
    } else {
        DatasetFile::default()
    };
    file.set_labels(labels);
    file.write(path)?;
    log::info!("Saved {} labels to {:?}", labels.len(), path);
    Ok(())
}
