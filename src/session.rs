//! Annotation session: the state of one open project.
//!
//! [`Session`] owns the label registry, the coordinate transform, the box
//! collection of the active image and the drawing state machine. Hosts feed it
//! pointer events and navigation requests on a single event stream; nothing
//! here is shared or global.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::UserPreferences;
use crate::detector::{self, Detection, Detector, DetectorError};
use crate::drawing::{DrawOutcome, DrawingState, Mode};
use crate::format::{self, FormatError, SaveOutcome};
use crate::labels::{self, LabelError, LabelRegistry, ReindexSummary};
use crate::model::{BoxCollection, BoxId};
use crate::project::{ImageList, Project, ProjectError};
use crate::transform::CoordinateTransform;

pub use crate::project::Direction;

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No project is loaded
    #[error("No project loaded")]
    NoProject,

    /// The operation needs an active image
    #[error("No active image")]
    NoImage,

    /// Image file could not be decoded
    #[error("Failed to read image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

#[derive(Debug)]
struct LoadedProject {
    labels: LabelRegistry,
    annotation_dir: PathBuf,
    label_file: Option<PathBuf>,
    descriptor: Option<Project>,
}

/// Session context for one annotation window.
#[derive(Debug)]
pub struct Session {
    project: Option<LoadedProject>,
    images: ImageList,
    active_image: Option<PathBuf>,
    transform: CoordinateTransform,
    boxes: BoxCollection,
    drawing: DrawingState,
    save_on_navigate: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&UserPreferences::default())
    }
}

impl Session {
    pub fn new(preferences: &UserPreferences) -> Self {
        Self {
            project: None,
            images: ImageList::default(),
            active_image: None,
            transform: CoordinateTransform::new(preferences.stretch_to_fit),
            boxes: BoxCollection::new(),
            drawing: DrawingState::new(),
            save_on_navigate: preferences.save_on_navigate,
        }
    }

    // === Accessors ===

    pub fn labels(&self) -> Option<&LabelRegistry> {
        self.project.as_ref().map(|p| &p.labels)
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref().and_then(|p| p.descriptor.as_ref())
    }

    pub fn annotation_dir(&self) -> Option<&Path> {
        self.project.as_ref().map(|p| p.annotation_dir.as_path())
    }

    pub fn images(&self) -> &ImageList {
        &self.images
    }

    pub fn active_image(&self) -> Option<&Path> {
        self.active_image.as_deref()
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    pub fn boxes(&self) -> &BoxCollection {
        &self.boxes
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn mode(&self) -> Mode {
        self.drawing.mode()
    }

    /// Annotation file of the active image.
    pub fn current_annotation_path(&self) -> Option<PathBuf> {
        let dir = self.annotation_dir()?;
        let image = self.active_image.as_deref()?;
        Some(format::annotation_path(dir, image))
    }

    fn project_mut(&mut self) -> Result<&mut LoadedProject, SessionError> {
        self.project.as_mut().ok_or(SessionError::NoProject)
    }

    // === Project lifecycle ===

    /// Start a session over an annotation directory with the given labels.
    pub fn load_project(&mut self, labels: Vec<String>, annotation_dir: PathBuf) -> Result<(), SessionError> {
        let registry = LabelRegistry::new(labels)?;
        log::info!(
            "Loaded project: {} labels, annotations in {:?}",
            registry.len(),
            annotation_dir
        );
        self.project = Some(LoadedProject {
            labels: registry,
            annotation_dir,
            label_file: None,
            descriptor: None,
        });
        self.images = ImageList::default();
        self.unload_image();
        Ok(())
    }

    /// Persist label changes to this file from now on.
    pub fn set_label_file(&mut self, path: PathBuf) -> Result<(), SessionError> {
        self.project_mut()?.label_file = Some(path);
        Ok(())
    }

    /// Open a project directory (`config.json` + `dataset.yaml`).
    pub fn open_project(&mut self, root: &Path) -> Result<(), SessionError> {
        let project = Project::open(root)?;
        let labels = project.labels()?;
        let images = project.images()?;

        self.close_project();
        self.load_project(labels, project.annotations_dir.clone())?;
        let loaded = self.project_mut()?;
        loaded.label_file = Some(project.label_file.clone());
        loaded.descriptor = Some(project);
        self.images = images;
        Ok(())
    }

    /// Flush the active image and drop all project state.
    pub fn close_project(&mut self) {
        if self.project.is_none() {
            return;
        }
        if self.save_on_navigate {
            if let Err(e) = self.flush() {
                log::error!("Failed to save annotations on close: {}", e);
            }
        }
        self.project = None;
        self.images = ImageList::default();
        self.unload_image();
        log::info!("Closed project");
    }

    // === Display and image ===

    pub fn set_display_size(&mut self, width: u32, height: u32) {
        self.transform.set_display_size(width, height);
    }

    pub fn set_stretch(&mut self, stretch: bool) {
        self.transform.set_stretch(stretch);
    }

    /// Make an image of the given size active with an empty collection.
    pub fn set_active_image(&mut self, width: u32, height: u32) {
        self.transform.set_image(width, height);
        self.boxes.clear();
        self.drawing.reset();
        self.active_image = None;
    }

    fn unload_image(&mut self) {
        self.transform.clear_image();
        self.boxes.clear();
        self.drawing.reset();
        self.active_image = None;
    }

    /// Switch to `path`: flush the previous image, then load the boxes saved
    /// for this one. Returns the number of boxes loaded.
    pub fn show_image(&mut self, path: &Path, width: u32, height: u32) -> Result<usize, SessionError> {
        if self.project.is_none() {
            return Err(SessionError::NoProject);
        }
        if self.save_on_navigate {
            self.flush()?;
        }

        self.set_active_image(width, height);
        self.active_image = Some(path.to_path_buf());
        self.images.select(path);
        let loaded = self.reload_boxes();
        log::info!("Showing {:?} ({}x{}, {} boxes)", path, width, height, loaded);
        Ok(loaded)
    }

    /// Like [`show_image`](Self::show_image), reading the dimensions from the
    /// image file.
    pub fn open_image(&mut self, path: &Path) -> Result<usize, SessionError> {
        let (width, height) = image::image_dimensions(path)?;
        self.show_image(path, width, height)
    }

    /// Move through the image list. Returns `false` at either end.
    ///
    /// With no image shown yet, either direction opens the image under the
    /// cursor. The cursor only moves once the target image has opened.
    pub fn navigate(&mut self, direction: Direction) -> Result<bool, SessionError> {
        let target = if self.active_image.is_some() {
            self.images.neighbor(direction)
        } else {
            self.images.current()
        };
        let Some(path) = target.map(Path::to_path_buf) else {
            return Ok(false);
        };
        self.open_image(&path)?;
        Ok(true)
    }

    /// Replace the collection with the contents of the active image's file.
    /// An unreadable file is logged and leaves the collection empty.
    fn reload_boxes(&mut self) -> usize {
        self.boxes.clear();
        let (Some(path), Some((width, height))) =
            (self.current_annotation_path(), self.transform.image_size())
        else {
            return 0;
        };
        match format::read_records(&path) {
            Ok(records) => self.boxes.import_normalized(&records, width, height),
            Err(e) => {
                log::warn!("Failed to read annotations {:?}: {}", path, e);
                0
            }
        }
    }

    // === Drawing ===

    pub fn set_mode(&mut self, mode: Mode) {
        self.drawing.set_mode(mode, &mut self.boxes);
    }

    pub fn set_current_label(&mut self, index: usize) -> Result<(), SessionError> {
        self.project_mut()?.labels.set_current(index)?;
        Ok(())
    }

    pub fn pointer_down(&mut self, x: i32, y: i32) -> DrawOutcome {
        let Some(project) = self.project.as_ref() else {
            return DrawOutcome::Ignored;
        };
        let label = project.labels.current();
        self.drawing
            .pointer_down(x, y, &self.transform, &mut self.boxes, label)
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) -> DrawOutcome {
        self.drawing.pointer_move(x, y, &self.transform)
    }

    pub fn cancel_drawing(&mut self) -> DrawOutcome {
        self.drawing.cancel()
    }

    /// Delete the selected box, if any.
    pub fn delete_selected(&mut self) -> Option<BoxId> {
        let id = self.boxes.remove_selected()?;
        log::info!("Deleted box {}", id);
        Some(id)
    }

    /// Remove every box of the active image. The file is only touched on the
    /// next save, and an empty save is skipped.
    pub fn clear_boxes(&mut self) {
        self.boxes.clear();
        self.drawing.reset();
    }

    // === Detection ===

    /// Import detector results into the active image. Unknown detector labels
    /// are appended to the project. Returns the number of boxes added.
    pub fn import_detections(
        &mut self,
        detections: &[Detection],
        detector_labels: &[String],
    ) -> Result<usize, SessionError> {
        let (width, height) = self.transform.image_size().ok_or(SessionError::NoImage)?;
        let project = self.project.as_mut().ok_or(SessionError::NoProject)?;

        let mut names = project.labels.labels().to_vec();
        let known = names.len();
        let mapping = detector::reconcile(detector_labels, &mut names);
        if names.len() > known {
            let mut labels = project.labels.clone();
            for name in &names[known..] {
                labels.append(name)?;
            }
            Self::persist_labels(project.label_file.as_deref(), &labels)?;
            project.labels = labels;
        }

        let imported = detector::to_boxes(detections, &mapping, width, height);
        let count = imported.boxes.len();
        for bbox in imported.boxes {
            self.boxes.add(bbox);
        }
        log::info!(
            "Imported {} detections ({} skipped, {} new labels)",
            count,
            imported.skipped,
            names.len() - known
        );
        Ok(count)
    }

    /// Run `detector` on the active image and import its results.
    pub fn run_detector(&mut self, detector: &mut dyn Detector) -> Result<usize, SessionError> {
        let path = self.active_image.clone().ok_or(SessionError::NoImage)?;
        let detections = detector.detect(&path)?;
        let labels = detector.labels().to_vec();
        self.import_detections(&detections, &labels)
    }

    // === Persistence ===

    /// Save the active collection to `path`. An empty collection is skipped.
    pub fn save_current_annotations(&self, path: &Path) -> Result<SaveOutcome, SessionError> {
        let (width, height) = self.transform.image_size().ok_or(SessionError::NoImage)?;
        Ok(format::save(&self.boxes.export_all(), width, height, path)?)
    }

    /// Save the active collection to its annotation file.
    pub fn save_current(&self) -> Result<SaveOutcome, SessionError> {
        let path = self.current_annotation_path().ok_or(SessionError::NoImage)?;
        self.save_current_annotations(&path)
    }

    /// Save if there is an active image with a backing file.
    fn flush(&self) -> Result<(), SessionError> {
        if self.active_image.is_some() && self.project.is_some() {
            self.save_current()?;
        }
        Ok(())
    }

    // === Labels ===

    pub fn add_label(&mut self, name: &str) -> Result<usize, SessionError> {
        let project = self.project_mut()?;
        let mut labels = project.labels.clone();
        let index = labels.append(name)?;
        Self::persist_labels(project.label_file.as_deref(), &labels)?;
        project.labels = labels;
        Ok(index)
    }

    pub fn rename_label(&mut self, index: usize, name: &str) -> Result<(), SessionError> {
        let project = self.project_mut()?;
        let mut labels = project.labels.clone();
        labels.rename(index, name)?;
        Self::persist_labels(project.label_file.as_deref(), &labels)?;
        project.labels = labels;
        Ok(())
    }

    /// Delete a label and rewrite every annotation file.
    ///
    /// The active collection is saved first so unsaved boxes take part in the
    /// rewrite, and is reloaded from its file afterwards.
    pub fn delete_label(&mut self, index: usize) -> Result<ReindexSummary, SessionError> {
        self.project
            .as_ref()
            .ok_or(SessionError::NoProject)?
            .labels
            .check_removable(index)?;
        self.flush()?;

        let project = self.project_mut()?;
        let annotation_dir = project.annotation_dir.clone();
        let summary = labels::delete_label(&mut project.labels, &annotation_dir, index)?;
        Self::persist_labels(project.label_file.as_deref(), &project.labels)?;

        self.drawing.reset();
        if self.active_image.is_some() {
            self.reload_boxes();
        } else if !self.boxes.is_empty() {
            log::warn!(
                "Active boxes have no backing file; label indices may be stale after deleting label {}",
                index
            );
        }
        Ok(summary)
    }

    /// Write the label list when the project has a label file.
    fn persist_labels(label_file: Option<&Path>, labels: &LabelRegistry) -> Result<(), FormatError> {
        if let Some(path) = label_file {
            format::write_labels(path, labels.labels())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DATASET_FILE, PROJECT_FILE};
    use crate::format::read_labels;
    use crate::model::Rect;
    use std::fs;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn session_with(dir: &Path, names: &[&str]) -> Session {
        let mut session = Session::default();
        session.load_project(strings(names), dir.to_path_buf()).unwrap();
        session.set_display_size(200, 200);
        session
    }

    fn draw(session: &mut Session, x1: i32, y1: i32, x2: i32, y2: i32) -> BoxId {
        assert_eq!(session.pointer_down(x1, y1), DrawOutcome::Anchored);
        match session.pointer_down(x2, y2) {
            DrawOutcome::Created(id) => id,
            other => panic!("expected a box, got {:?}", other),
        }
    }

    /// Minimal project with three images and a label file.
    fn project_dir(root: &Path) {
        fs::create_dir(root.join("images")).unwrap();
        fs::create_dir(root.join("annotations")).unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            image::RgbImage::new(100, 50).save(root.join("images").join(name)).unwrap();
        }
        fs::write(
            root.join(PROJECT_FILE),
            r#"{"IMAGES_PATH": "images", "ANNOTATIONS_PATH": "annotations", "MODEL_PATHS": []}"#,
        )
        .unwrap();
        fs::write(root.join(DATASET_FILE), "nc: 2\nnames:\n  0: aromatics\n  1: esters\n").unwrap();
    }

    struct FixedDetector {
        labels: Vec<String>,
        detections: Vec<Detection>,
    }

    impl Detector for FixedDetector {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn detect(&mut self, _image_path: &Path) -> Result<Vec<Detection>, DetectorError> {
            Ok(self.detections.clone())
        }
    }

    #[test]
    fn test_draw_and_save_on_navigate() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_with(temp.path(), &["aromatics", "esters"]);

        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();
        session.set_current_label(1).unwrap();
        draw(&mut session, 10, 10, 60, 40);

        // Switching images flushes the previous one
        session.show_image(Path::new("img_1.png"), 200, 200).unwrap();
        assert!(session.boxes().is_empty());

        let records = format::read_records(&temp.path().join("img_0.txt")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label_index, 1);

        // And coming back restores it
        assert_eq!(session.show_image(Path::new("img_0.png"), 200, 200).unwrap(), 1);
        let bbox = &session.boxes().get_all()[0];
        assert_eq!(bbox.rect, Rect::new(10, 10, 50, 30));
    }

    #[test]
    fn test_empty_image_does_not_clobber_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("img_0.txt");
        fs::write(&path, "0\t0.5\t0.5\t0.2\t0.2\n").unwrap();

        let mut session = session_with(temp.path(), &["aromatics"]);
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();
        session.clear_boxes();
        assert_eq!(session.save_current().unwrap(), SaveOutcome::SkippedEmpty);
        session.show_image(Path::new("img_1.png"), 200, 200).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "0\t0.5\t0.5\t0.2\t0.2\n");
    }

    #[test]
    fn test_delete_label_reloads_active_image() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dir = temp.path();
        fs::write(dir.join("other.txt"), "2\t0.5\t0.5\t0.2\t0.2\n1\t0.5\t0.5\t0.2\t0.2\n").unwrap();
        let label_file = dir.join(DATASET_FILE);

        let mut session = session_with(dir, &["aromatics", "esters", "ketones"]);
        session.set_label_file(label_file.clone()).unwrap();
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();

        // Unsaved boxes take part in the rewrite
        session.set_current_label(1).unwrap();
        draw(&mut session, 10, 10, 60, 60);
        session.set_current_label(2).unwrap();
        draw(&mut session, 100, 100, 150, 150);

        let summary = session.delete_label(1).unwrap();
        assert_eq!((summary.removed, summary.shifted), (2, 2));

        let labels: Vec<usize> = session.boxes().iter().map(|b| b.label_index).collect();
        assert_eq!(labels, vec![1]);
        assert_eq!(session.labels().unwrap().labels(), ["aromatics", "ketones"]);
        assert_eq!(session.labels().unwrap().current_name(), "ketones");
        assert_eq!(read_labels(&label_file).unwrap(), ["aromatics", "ketones"]);
    }

    #[test]
    fn test_delete_last_label_rejected_before_flush() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_with(temp.path(), &["aromatics"]);
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();
        draw(&mut session, 10, 10, 60, 60);

        assert!(matches!(
            session.delete_label(0),
            Err(SessionError::Label(LabelError::LastLabel))
        ));
        assert!(!temp.path().join("img_0.txt").exists());
        assert_eq!(session.boxes().count(), 1);
    }

    #[test]
    fn test_add_and_rename_persist() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let label_file = temp.path().join(DATASET_FILE);
        let mut session = session_with(temp.path(), &["aromatics"]);
        session.set_label_file(label_file.clone()).unwrap();

        assert_eq!(session.add_label("esters").unwrap(), 1);
        session.rename_label(0, "phenol").unwrap();
        assert_eq!(read_labels(&label_file).unwrap(), ["phenol", "esters"]);
        assert!(session.add_label("esters").is_err());
    }

    #[test]
    fn test_import_detections() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let label_file = temp.path().join(DATASET_FILE);
        let mut session = session_with(temp.path(), &["aromatics", "esters"]);
        session.set_label_file(label_file.clone()).unwrap();

        let detections = [Detection::new(10.0, 10.0, 20.0, 20.0, 1)];
        assert!(matches!(
            session.import_detections(&detections, &strings(&["esters", "ketones"])),
            Err(SessionError::NoImage)
        ));

        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();
        let count = session
            .import_detections(&detections, &strings(&["esters", "ketones"]))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(session.boxes().get_all()[0].label_index, 2);
        assert_eq!(read_labels(&label_file).unwrap(), ["aromatics", "esters", "ketones"]);
    }

    #[test]
    fn test_import_detections_trims_labels_and_persists() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let label_file = temp.path().join(DATASET_FILE);
        let mut session = session_with(temp.path(), &["aromatics"]);
        session.set_label_file(label_file.clone()).unwrap();
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();

        let detections = [
            Detection::new(10.0, 10.0, 20.0, 20.0, 1),
            Detection::new(50.0, 50.0, 20.0, 20.0, 2),
        ];
        let count = session
            .import_detections(&detections, &strings(&["ketones", " aromatics", ""]))
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(session.boxes().get_all()[0].label_index, 0);
        assert_eq!(session.labels().unwrap().labels(), ["aromatics", "ketones"]);
        assert_eq!(read_labels(&label_file).unwrap(), ["aromatics", "ketones"]);
    }

    #[test]
    fn test_failed_label_write_leaves_registry_unchanged() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_with(temp.path(), &["aromatics"]);
        session
            .set_label_file(temp.path().join("missing").join(DATASET_FILE))
            .unwrap();
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();

        let detections = [Detection::new(10.0, 10.0, 20.0, 20.0, 0)];
        assert!(matches!(
            session.import_detections(&detections, &strings(&["ketones"])),
            Err(SessionError::Format(FormatError::Io(_)))
        ));
        assert!(session.add_label("esters").is_err());
        assert!(session.rename_label(0, "phenol").is_err());

        assert_eq!(session.labels().unwrap().labels(), ["aromatics"]);
        assert!(session.boxes().is_empty());
    }

    #[test]
    fn test_run_detector() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_with(temp.path(), &["aromatics"]);
        let mut detector = FixedDetector {
            labels: strings(&["aromatics"]),
            detections: vec![Detection::from_center(50.0, 50.0, 20.0, 20.0, 0)],
        };

        assert!(matches!(session.run_detector(&mut detector), Err(SessionError::NoImage)));
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();
        assert_eq!(session.run_detector(&mut detector).unwrap(), 1);
        assert_eq!(session.boxes().get_all()[0].rect, Rect::new(40, 40, 20, 20));
    }

    #[test]
    fn test_select_and_delete() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_with(temp.path(), &["aromatics"]);
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();
        let id = draw(&mut session, 10, 10, 60, 60);

        assert_eq!(session.delete_selected(), None);
        assert_eq!(session.pointer_down(20, 20), DrawOutcome::Selected(id));
        assert_eq!(session.delete_selected(), Some(id));
        assert!(session.boxes().is_empty());
    }

    #[test]
    fn test_operations_need_project() {
        let mut session = Session::default();
        assert!(matches!(session.add_label("x"), Err(SessionError::NoProject)));
        assert!(matches!(session.delete_label(0), Err(SessionError::NoProject)));
        assert!(matches!(
            session.show_image(Path::new("a.png"), 10, 10),
            Err(SessionError::NoProject)
        ));
        assert_eq!(session.pointer_down(5, 5), DrawOutcome::Ignored);
    }

    #[test]
    fn test_open_project_and_navigate() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        project_dir(root);

        let mut session = Session::default();
        session.open_project(root).unwrap();
        session.set_display_size(100, 50);
        assert_eq!(session.labels().unwrap().labels(), ["aromatics", "esters"]);

        // First navigation opens the first image
        assert!(session.navigate(Direction::Previous).unwrap());
        assert_eq!(session.active_image(), Some(root.join("images").join("a.png").as_path()));
        assert_eq!(session.transform().image_size(), Some((100, 50)));

        draw(&mut session, 10, 10, 40, 40);
        assert!(session.navigate(Direction::Next).unwrap());
        assert!(root.join("annotations").join("a.txt").exists());

        assert!(session.navigate(Direction::Next).unwrap());
        assert!(!session.navigate(Direction::Next).unwrap());
        assert_eq!(session.images().progress(), "3/3");
    }

    #[test]
    fn test_first_navigation_opens_first_image() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        project_dir(root);

        let mut session = Session::default();
        session.open_project(root).unwrap();

        assert!(session.navigate(Direction::Next).unwrap());
        assert_eq!(session.active_image(), Some(root.join("images").join("a.png").as_path()));
        assert_eq!(session.images().progress(), "1/3");

        assert!(session.navigate(Direction::Next).unwrap());
        assert_eq!(session.active_image(), Some(root.join("images").join("b.png").as_path()));
    }

    #[test]
    fn test_unreadable_image_keeps_cursor() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        project_dir(root);
        fs::write(root.join("images").join("b.png"), b"not a png").unwrap();

        let mut session = Session::default();
        session.open_project(root).unwrap();
        assert!(session.navigate(Direction::Next).unwrap());

        assert!(session.navigate(Direction::Next).is_err());
        assert_eq!(session.images().current_index(), 0);
        assert_eq!(session.active_image(), Some(root.join("images").join("a.png").as_path()));
        assert_eq!(session.transform().image_size(), Some((100, 50)));
    }

    #[test]
    fn test_out_of_range_records_do_not_break_hit_testing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(
            temp.path().join("img_0.txt"),
            "0\t1e10\t0.5\t0.1\t0.1\n0\tinf\t0.5\t0.1\t0.1\n",
        )
        .unwrap();

        let mut session = session_with(temp.path(), &["aromatics"]);
        assert_eq!(session.show_image(Path::new("img_0.png"), 200, 200).unwrap(), 0);
        assert_eq!(session.pointer_down(50, 50), DrawOutcome::Anchored);
    }

    #[test]
    fn test_mode_switch_clears_selection() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_with(temp.path(), &["aromatics"]);
        session.show_image(Path::new("img_0.png"), 200, 200).unwrap();
        let id = draw(&mut session, 10, 10, 60, 60);
        session.pointer_down(20, 20);
        assert_eq!(session.boxes().selected(), Some(id));

        session.set_mode(Mode::Erase);
        assert_eq!(session.boxes().selected(), None);
        assert_eq!(session.pointer_down(20, 20), DrawOutcome::Erased(id));
    }
}
