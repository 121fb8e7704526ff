//! Project descriptor and image list.
//!
//! A project root holds `config.json` (where images, annotations and detector
//! models live) and `dataset.yaml` (the label list).
//!
//! ```json
//! {
//!   "IMAGES_PATH": "images",
//!   "ANNOTATIONS_PATH": "annotations",
//!   "ROOT": "/data/spectra",
//!   "MODEL_PATHS": [
//!     { "name": "IR", "yaml": "models/ir/dataset.yaml", "pt": "models/ir/ir.pt" }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DATASET_FILE, IMAGE_EXTENSIONS, PROJECT_FILE};
use crate::format::{self, FormatError};

/// Errors that can occur while opening a project.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed `config.json`
    #[error("Failed to parse project descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// A required path key is absent or blank
    #[error("Project descriptor is missing {field}")]
    MissingPath {
        /// Key name in `config.json`
        field: &'static str,
    },

    /// Label list could not be read
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// A detector model registered with the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    /// Label list file of the model.
    pub yaml: PathBuf,
    /// Weights file.
    pub pt: PathBuf,
}

impl ModelEntry {
    /// Ordered label names of the model.
    pub fn labels(&self) -> Result<Vec<String>, FormatError> {
        format::read_labels(&self.yaml)
    }

    fn resolve(mut self, root: &Path) -> Self {
        self.yaml = resolve(root, &self.yaml);
        self.pt = resolve(root, &self.pt);
        self
    }
}

/// Raw `config.json` contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(rename = "IMAGES_PATH", default)]
    pub images_path: Option<PathBuf>,
    #[serde(rename = "ANNOTATIONS_PATH", default)]
    pub annotations_path: Option<PathBuf>,
    #[serde(rename = "ROOT", default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(rename = "MODEL_PATHS", default)]
    pub model_paths: Vec<ModelEntry>,
}

impl ProjectConfig {
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// An opened project with every path resolved against its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub label_file: PathBuf,
    pub models: Vec<ModelEntry>,
}

impl Project {
    /// Open the project at `root` by reading its `config.json`.
    pub fn open(root: &Path) -> Result<Self, ProjectError> {
        let descriptor = root.join(PROJECT_FILE);
        let json = std::fs::read_to_string(&descriptor)?;
        let project = Self::from_config(root, ProjectConfig::from_json(&json)?)?;
        log::info!(
            "Opened project {:?}: images={:?} annotations={:?} models={}",
            project.root,
            project.images_dir,
            project.annotations_dir,
            project.models.len()
        );
        Ok(project)
    }

    /// Build a project from parsed descriptor contents.
    ///
    /// `ROOT` in the descriptor overrides `root` when present, which lets a
    /// moved project keep pointing at its data.
    pub fn from_config(root: &Path, config: ProjectConfig) -> Result<Self, ProjectError> {
        let root = match config.root.filter(|p| !p.as_os_str().is_empty()) {
            Some(declared) => resolve(root, &declared),
            None => root.to_path_buf(),
        };
        let images_path = required(config.images_path, "IMAGES_PATH")?;
        let annotations_path = required(config.annotations_path, "ANNOTATIONS_PATH")?;

        Ok(Self {
            images_dir: resolve(&root, &images_path),
            annotations_dir: resolve(&root, &annotations_path),
            label_file: root.join(DATASET_FILE),
            models: config
                .model_paths
                .into_iter()
                .map(|m| m.resolve(&root))
                .collect(),
            root,
        })
    }

    /// Read the project's label list.
    pub fn labels(&self) -> Result<Vec<String>, ProjectError> {
        Ok(format::read_labels(&self.label_file)?)
    }

    pub fn model(&self, name: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Scan the images directory.
    pub fn images(&self) -> Result<ImageList, ProjectError> {
        ImageList::scan(&self.images_dir)
    }

    /// Annotation file for an image of this project.
    pub fn annotation_path_for(&self, image: &Path) -> PathBuf {
        format::annotation_path(&self.annotations_dir, image)
    }
}

fn required(path: Option<PathBuf>, field: &'static str) -> Result<PathBuf, ProjectError> {
    path.filter(|p| !p.as_os_str().is_empty())
        .ok_or(ProjectError::MissingPath { field })
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Check if a path has a supported image extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Navigation direction in the image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Ordered images of a project with a cursor.
#[derive(Debug, Clone, Default)]
pub struct ImageList {
    images: Vec<PathBuf>,
    current_index: usize,
}

impl ImageList {
    /// Discover image files in a folder, non-recursively, sorted by name.
    pub fn scan(folder: &Path) -> Result<Self, ProjectError> {
        let mut images: Vec<PathBuf> = std::fs::read_dir(folder)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();
        images.sort();

        log::info!("Scanned {:?}: found {} images", folder, images.len());
        Ok(Self::from_paths(images))
    }

    pub fn from_paths(images: Vec<PathBuf>) -> Self {
        Self {
            images,
            current_index: 0,
        }
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.current_index).map(PathBuf::as_path)
    }

    /// The image one step away from the cursor, or `None` at either end.
    /// The cursor itself does not move; see [`select`](Self::select).
    pub fn neighbor(&self, direction: Direction) -> Option<&Path> {
        let index = match direction {
            Direction::Next => self.current_index.checked_add(1)?,
            Direction::Previous => self.current_index.checked_sub(1)?,
        };
        self.images.get(index).map(PathBuf::as_path)
    }

    /// Jump to the image with this path.
    pub fn select(&mut self, path: &Path) -> bool {
        match self.images.iter().position(|p| p == path) {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => false,
        }
    }

    /// Progress string like "3/15".
    pub fn progress(&self) -> String {
        if self.images.is_empty() {
            return "0/0".to_string();
        }
        format!("{}/{}", self.current_index + 1, self.images.len())
    }
}
