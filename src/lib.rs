//! spectrAI - annotation state engine
//!
//! Bounding-box annotation of spectrum images for object detector training.
//! The crate holds everything below the UI: fitting images into a canvas,
//! the two-click drawing gesture, per-image box collections, the normalized
//! text annotation format and the label lifecycle that keeps every annotation
//! file consistent when labels are deleted.
//!
//! Hosts drive a [`Session`] with pointer events and navigation requests.

pub mod config;
pub mod constants;
pub mod detector;
pub mod drawing;
pub mod format;
pub mod labels;
pub mod model;
pub mod project;
pub mod session;
pub mod transform;

pub use session::{Direction, Session, SessionError};
