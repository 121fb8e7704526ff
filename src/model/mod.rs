//! Data models for the annotation engine.

mod annotation;
mod collection;

pub use annotation::{BoundingBox, BoxId, BoxPatch, BoxSource, Rect};
pub use collection::BoxCollection;
