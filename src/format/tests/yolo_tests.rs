//! Tests for the per-image annotation codec.

use std::fs;

use crate::format::{FormatError, NormalizedBox, PixelBox, SaveOutcome, load, read_records, save};
use crate::model::{BoundingBox, Rect};

fn bbox(x: i32, y: i32, w: i32, h: i32, label: usize) -> BoundingBox {
    BoundingBox::new(Rect::new(x, y, w, h), label).unwrap()
}

#[test]
fn test_save_writes_one_line_per_box() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("photo001.txt");

    let boxes = [bbox(100, 120, 80, 200, 0), bbox(300, 200, 150, 100, 1)];
    let outcome = save(&boxes, 640, 480, &path).expect("save");
    assert_eq!(outcome, SaveOutcome::Written(2));

    let content = fs::read_to_string(&path).expect("read back");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    // (100 + 40) / 640, (120 + 100) / 480, 80 / 640, 200 / 480
    assert_eq!(lines[0], "0\t0.218750\t0.458333\t0.125000\t0.416667");
    assert!(lines[1].starts_with("1\t"));
    assert!(content.ends_with('\n'));
}

#[test]
fn test_save_empty_keeps_existing_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("keep.txt");
    let original = "2 0.5 0.5 0.1 0.1\nnot a box line\n";
    fs::write(&path, original).expect("seed file");

    let outcome = save(&[], 640, 480, &path).expect("save");
    assert_eq!(outcome, SaveOutcome::SkippedEmpty);
    assert_eq!(fs::read(&path).expect("read back"), original.as_bytes());
}

#[test]
fn test_save_empty_does_not_create_file() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("new.txt");

    save(&[], 640, 480, &path).expect("save");
    assert!(!path.exists());
}

#[test]
fn test_save_rejects_zero_dimensions() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("bad.txt");

    let err = save(&[bbox(0, 0, 10, 10, 0)], 0, 480, &path).unwrap_err();
    assert!(matches!(err, FormatError::InvalidDimensions { width: 0, height: 480 }));
    assert!(!path.exists());
}

#[test]
fn test_load_missing_file_is_empty() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let boxes = load(&temp.path().join("absent.txt"), 640, 480).expect("load");
    assert!(boxes.is_empty());
}

#[test]
fn test_load_skips_malformed_lines() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("mixed.txt");
    fs::write(
        &path,
        "0\t0.5\t0.5\t0.25\t0.5\n\
         garbage\n\
         1 0.5 0.5\n\
         x 0.5 0.5 0.1 0.1\n\
         \n\
         3 0.25 0.25 0.5 0.5\n",
    )
    .expect("write file");

    let boxes = load(&path, 100, 100).expect("load");
    assert_eq!(
        boxes,
        vec![
            PixelBox {
                label_index: 0,
                rect: Rect::new(37, 25, 25, 50),
            },
            PixelBox {
                label_index: 3,
                rect: Rect::new(0, 0, 50, 50),
            },
        ]
    );
}

#[test]
fn test_parse_rejects_non_finite_coordinates() {
    assert!(NormalizedBox::parse_line("0\tinf\t0.5\t0.1\t0.1").is_none());
    assert!(NormalizedBox::parse_line("0 0.5 NaN 0.1 0.1").is_none());
    assert!(NormalizedBox::parse_line("0 0.5 0.5 -inf 0.1").is_none());
    assert!(NormalizedBox::parse_line("0 0.5 0.5 0.1 0.1").is_some());
}

#[test]
fn test_load_truncates_not_rounds() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("trunc.txt");
    // width 0.0199 * 100 = 1.99 -> 1
    fs::write(&path, "0 0.5 0.5 0.0199 0.0399\n").expect("write file");

    let boxes = load(&path, 100, 100).expect("load");
    assert_eq!(boxes[0].rect.width, 1);
    assert_eq!(boxes[0].rect.height, 3);
}

#[test]
fn test_read_records_keeps_stale_indices() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("stale.txt");
    fs::write(&path, "42 0.5 0.5 0.1 0.1\n").expect("write file");

    let records = read_records(&path).expect("read");
    assert_eq!(records, vec![NormalizedBox::new(42, 0.5, 0.5, 0.1, 0.1)]);
}
