//! Save -> load round-trip tests.

use crate::format::{load, save};
use crate::model::{BoundingBox, Rect};

fn assert_within_one_pixel(original: &Rect, loaded: &Rect) {
    for (a, b) in [
        (original.x, loaded.x),
        (original.y, loaded.y),
        (original.width, loaded.width),
        (original.height, loaded.height),
    ] {
        assert!((a - b).abs() <= 1, "{:?} vs {:?}", original, loaded);
    }
}

fn round_trip(rects: &[Rect], width: u32, height: u32) {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("image.txt");

    let boxes: Vec<BoundingBox> = rects
        .iter()
        .enumerate()
        .map(|(i, r)| BoundingBox::new(*r, i % 3).unwrap())
        .collect();
    save(&boxes, width, height, &path).expect("save");

    let loaded = load(&path, width, height).expect("load");
    assert_eq!(loaded.len(), boxes.len());
    for (original, loaded) in boxes.iter().zip(&loaded) {
        assert_eq!(original.label_index, loaded.label_index);
        assert_within_one_pixel(&original.rect, &loaded.rect);
    }
}

#[test]
fn test_round_trip_even_sizes() {
    round_trip(
        &[Rect::new(100, 120, 80, 200), Rect::new(300, 200, 150, 100)],
        640,
        480,
    );
}

#[test]
fn test_round_trip_odd_sizes() {
    round_trip(
        &[Rect::new(1, 2, 7, 9), Rect::new(500, 3, 113, 331), Rect::new(0, 0, 1, 1)],
        1023,
        767,
    );
}

#[test]
fn test_round_trip_touching_far_edges() {
    round_trip(&[Rect::new(0, 0, 1919, 1079), Rect::new(1900, 1060, 19, 19)], 1920, 1080);
}

#[test]
fn test_round_trip_preserves_order() {
    let rects: Vec<Rect> = (0..20).map(|i| Rect::new(i * 13, i * 7, 11 + i, 17 + i)).collect();
    round_trip(&rects, 800, 600);
}
