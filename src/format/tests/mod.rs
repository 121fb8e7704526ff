//! Unit tests for the persisted file formats.
//!
//! These tests exercise the codecs against real files in temporary
//! directories.

mod roundtrip_tests;
mod yolo_tests;
