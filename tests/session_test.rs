//! End-to-end editing scenarios through the Editor.

use std::path::{Path, PathBuf};
use tempfile::tempdir;
use vehicle_annot_rust::{sidecar, AnnotConfig, AnnotError, Editor, Rect, SaveDecision};

fn open_editor(dir: &Path, name: &str) -> (Editor, PathBuf) {
    let image = dir.join(name);
    std::fs::write(&image, b"img").unwrap();
    let mut editor = Editor::new(AnnotConfig::default());
    editor.open(&image, 1920, 1080).unwrap();
    (editor, image)
}

/// Plate deletion cascades, plate renames follow the suffix, and nothing of
/// the old OCR name survives.
#[test]
fn test_plate_lifecycle() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut editor, image) = open_editor(dir.path(), "img.jpg");

    editor.create_box("Letta_plate", Rect::new(100, 100, 200, 140)).unwrap();
    editor.set_plate_text("AB123CD", true).unwrap();

    // rename: OCR follows to the new suffix
    editor.set_class(0, "Letta_plate_1").unwrap();
    {
        let store = editor.store().unwrap();
        assert_eq!(store.ocr_records().len(), 1);
        assert_eq!(store.ocr_records()[0].class, "OCR_1");
        assert_eq!(store.ocr_records()[0].text(), "AB123CD");
    }

    editor.save().unwrap();
    let loaded = sidecar::load(&sidecar::sidecar_path(&image)).unwrap();
    assert_eq!(loaded.ocr_records.len(), 1);
    assert_eq!(loaded.ocr_records[0].class, "OCR_1");

    // delete the plate: the record goes with it
    editor.delete_box(0).unwrap();
    assert!(editor.store().unwrap().ocr_records().is_empty());

    editor.save().unwrap();
    let loaded = sidecar::load(&sidecar::sidecar_path(&image)).unwrap();
    assert!(loaded.ocr_records.is_empty());
    assert!(loaded.boxes.is_empty());
}

/// N edits, N undos, back to the very first state; one redo replays the last
/// undone step exactly.
#[test]
fn test_undo_redo_depth() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut editor, _) = open_editor(dir.path(), "img.jpg");

    editor.create_box("car", Rect::new(0, 0, 100, 100)).unwrap();
    editor.move_box(0, 20, 0).unwrap();
    editor.resize_box(0, vehicle_annot_rust::Handle::Se, 150, 150).unwrap();
    editor.set_class(0, "truck").unwrap();

    let final_state = editor.store().unwrap().boxes().to_vec();

    for _ in 0..4 {
        editor.undo().unwrap();
    }
    assert!(editor.store().unwrap().boxes().is_empty());
    assert!(matches!(editor.undo(), Err(AnnotError::NoHistory(_))));

    for _ in 0..4 {
        editor.redo().unwrap();
    }
    assert_eq!(editor.store().unwrap().boxes().to_vec(), final_state);
}

/// A rejected create (below minimum size) is a complete no-op.
#[test]
fn test_minimum_size_rejection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut editor, _) = open_editor(dir.path(), "img.jpg");

    // width 3 < minimum 5
    let err = editor.create_box("car", Rect::new(5, 5, 2, 2)).unwrap_err();
    assert!(matches!(err, AnnotError::Validation(_)));
    assert!(editor.store().unwrap().boxes().is_empty());
    assert!(!editor.is_dirty());
}

/// Editing plate text with a non-plate (or no) selection is a linkage error
/// and changes nothing.
#[test]
fn test_plate_text_requires_plate_selection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut editor, _) = open_editor(dir.path(), "img.jpg");

    editor.create_box("car", Rect::new(0, 0, 100, 100)).unwrap();
    assert!(matches!(
        editor.set_plate_text("XX999XX", false),
        Err(AnnotError::Linkage)
    ));
    assert!(editor.store().unwrap().ocr_records().is_empty());
}

/// The folder class filter sees new classes only after the save invalidates
/// the index.
#[test]
fn test_class_filter_follows_saves() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut editor, image) = open_editor(dir.path(), "img_001.jpg");

    let images = vehicle_annot_rust::scanner::scan_folder(dir.path()).unwrap();
    editor.set_images(images);

    assert!(!editor.image_has_class("img_001.jpg", "car"));

    editor.create_box("car", Rect::new(0, 0, 100, 100)).unwrap();
    editor.save().unwrap();
    assert!(editor.image_has_class("img_001.jpg", "car"));
    assert!(editor.image_has_class("img_001.jpg", "CAR"));
    assert!(!editor.image_has_class("img_001.jpg", "bus"));

    // still saved under the expected sidecar path
    assert!(sidecar::sidecar_path(&image).exists());
}

/// Promote two generic plates; they get sequential tracked names and their
/// own records, and both survive a save/load cycle.
#[test]
fn test_promote_and_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (mut editor, image) = open_editor(dir.path(), "img.jpg");

    editor.create_box("plate", Rect::new(0, 0, 60, 30)).unwrap();
    editor.create_box("plate", Rect::new(100, 0, 160, 30)).unwrap();

    assert_eq!(editor.promote_to_plate(0).unwrap(), "Letta_plate");
    assert_eq!(editor.promote_to_plate(1).unwrap(), "Letta_plate_1");

    editor.select(Some(1)).unwrap();
    editor.set_plate_text("ZZ111ZZ", false).unwrap();
    editor.close(SaveDecision::Save).unwrap();

    let loaded = sidecar::load(&sidecar::sidecar_path(&image)).unwrap();
    assert_eq!(loaded.boxes.len(), 2);
    assert_eq!(loaded.ocr_records.len(), 2);
    let ocr1 = loaded
        .ocr_records
        .iter()
        .find(|r| r.class == "OCR_1")
        .expect("OCR_1 missing");
    assert_eq!(ocr1.value, vec!["ZZ111ZZ"]);
}
