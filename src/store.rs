//! Mutable box list for one open image.
//!
//! All editing operations live here: create, move, resize, delete, reclass,
//! selection. Plate-class edits cascade into the linked OCR records so no
//! orphan can survive an editing session. Undo wrapping is the caller's job
//! (see `session`); the store itself only mutates state and flags it dirty.

use crate::error::{AnnotError, Result};
use crate::geometry::Rect;
use crate::linkage;
use crate::model::{BoundingBox, ImageAnnotationState, OcrRecord};

/// Corner grabbed during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Nw,
    Ne,
    Se,
    Sw,
}

/// Pixel offset applied to a pasted copy so it does not sit exactly on the
/// original.
const PASTE_OFFSET: i32 = 12;

#[derive(Debug)]
pub struct BoxStore {
    state: ImageAnnotationState,
    img_width: i32,
    img_height: i32,
    min_box_size: i32,
}

impl BoxStore {
    pub fn new(state: ImageAnnotationState, img_width: i32, img_height: i32, min_box_size: i32) -> Self {
        BoxStore { state, img_width, img_height, min_box_size }
    }

    pub fn state(&self) -> &ImageAnnotationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ImageAnnotationState {
        &mut self.state
    }

    pub fn into_state(self) -> ImageAnnotationState {
        self.state
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.state.boxes
    }

    pub fn ocr_records(&self) -> &[OcrRecord] {
        &self.state.ocr_records
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty
    }

    fn get(&self, index: usize) -> Result<&BoundingBox> {
        self.state.boxes.get(index).ok_or(AnnotError::IndexOutOfRange(index))
    }

    /// Select a box (or clear the selection). Not an edit: does not touch the
    /// dirty flag.
    pub fn select(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(i) = index {
            self.get(i)?;
        }
        self.state.selected = index;
        Ok(())
    }

    /// Append a normalized box of `class` and select it. Rejected when either
    /// dimension is below the minimum size.
    pub fn create(&mut self, class: &str, rect: Rect) -> Result<usize> {
        let rect = rect.normalized();
        if rect.width() < self.min_box_size || rect.height() < self.min_box_size {
            return Err(AnnotError::Validation(format!(
                "box {}x{} below minimum size {}",
                rect.width(),
                rect.height(),
                self.min_box_size
            )));
        }

        self.state.boxes.push(BoundingBox::new(class, rect));
        let index = self.state.boxes.len() - 1;
        self.state.selected = Some(index);
        self.state.dirty = true;
        Ok(index)
    }

    /// Translate a box by `(dx, dy)`, clamped to the image. When clamping
    /// would shrink the box and the unclamped size fits the image, the box is
    /// re-anchored at the touched border so its size is preserved.
    pub fn move_box(&mut self, index: usize, dx: i32, dy: i32) -> Result<()> {
        let (w, h) = (self.img_width, self.img_height);
        let r = self.get(index)?.coords.normalized();
        let (bw, bh) = (r.width(), r.height());

        let mut x1 = (r.x1 + dx).max(0);
        let mut y1 = (r.y1 + dy).max(0);
        let mut x2 = (r.x2 + dx).min(w);
        let mut y2 = (r.y2 + dy).min(h);

        if x2 - x1 != bw && bw <= w {
            if x1 == 0 {
                x2 = bw;
            } else if x2 == w {
                x1 = w - bw;
            }
        }
        if y2 - y1 != bh && bh <= h {
            if y1 == 0 {
                y2 = bh;
            } else if y2 == h {
                y1 = h - bh;
            }
        }

        self.state.boxes[index].coords = Rect::new(x1, y1, x2, y2);
        self.state.dirty = true;
        Ok(())
    }

    /// Drag one corner to `(new_x, new_y)`. Only the two coordinates owned by
    /// that corner change; the update is rejected (box left untouched) when
    /// the result would be below the minimum size.
    pub fn resize(&mut self, index: usize, handle: Handle, new_x: i32, new_y: i32) -> Result<()> {
        let mut r = self.get(index)?.coords;

        match handle {
            Handle::Nw => {
                r.x1 = new_x;
                r.y1 = new_y;
            }
            Handle::Ne => {
                r.x2 = new_x;
                r.y1 = new_y;
            }
            Handle::Se => {
                r.x2 = new_x;
                r.y2 = new_y;
            }
            Handle::Sw => {
                r.x1 = new_x;
                r.y2 = new_y;
            }
        }

        if r.width() < self.min_box_size || r.height() < self.min_box_size {
            return Err(AnnotError::Validation(format!(
                "resize to {}x{} below minimum size {}",
                r.width(),
                r.height(),
                self.min_box_size
            )));
        }

        self.state.boxes[index].coords = r;
        self.state.dirty = true;
        Ok(())
    }

    /// Remove a box. Deleting a plate box also deletes its linked OCR record.
    /// The selection is re-clamped into range, or cleared when the list
    /// empties.
    pub fn delete(&mut self, index: usize) -> Result<()> {
        let class = self.get(index)?.class.clone();

        if let Some(ocr_class) = linkage::ocr_class_for_plate(&class) {
            linkage::remove_record(&mut self.state.ocr_records, &ocr_class);
        }

        self.state.boxes.remove(index);
        self.state.clamp_selection();
        self.state.dirty = true;
        Ok(())
    }

    /// Relabel a box. Plate transitions cascade:
    /// - plate → plate (different suffix): the linked OCR record is renamed
    /// - plate → non-plate: the linked OCR record is deleted
    /// - anything else: plain relabel
    pub fn set_class(&mut self, index: usize, new_class: &str) -> Result<()> {
        let old_class = self.get(index)?.class.clone();

        if let Some(old_ocr) = linkage::ocr_class_for_plate(&old_class) {
            match linkage::ocr_class_for_plate(new_class) {
                Some(new_ocr) => {
                    for rec in &mut self.state.ocr_records {
                        if rec.class.eq_ignore_ascii_case(&old_ocr) {
                            rec.class = new_ocr.clone();
                        }
                    }
                }
                None => {
                    linkage::remove_record(&mut self.state.ocr_records, &old_ocr);
                }
            }
        }

        self.state.boxes[index].class = new_class.to_string();
        self.state.dirty = true;
        Ok(())
    }

    /// Reclass a box to the next available plate name and create its empty
    /// OCR record. Returns the assigned plate class.
    pub fn promote_to_plate(&mut self, index: usize) -> Result<String> {
        self.get(index)?;
        let (plate_class, _ocr_class) =
            linkage::next_available_names(&self.state.boxes, &self.state.ocr_records);
        self.set_class(index, &plate_class)?;
        linkage::find_or_create(&mut self.state.ocr_records, &plate_class);
        Ok(plate_class)
    }

    /// Paste a copy of a box, slightly offset and clamped to the image, and
    /// select it. Plate boxes are pasted under the next free plate name so
    /// the copy never aliases the original's OCR record.
    pub fn duplicate(&mut self, index: usize) -> Result<usize> {
        let source = self.get(index)?.clone();
        let r = source.coords.normalized();

        let dx = if r.x2 + PASTE_OFFSET <= self.img_width { PASTE_OFFSET } else { 0 };
        let dy = if r.y2 + PASTE_OFFSET <= self.img_height { PASTE_OFFSET } else { 0 };
        let shifted = Rect::new(r.x1 + dx, r.y1 + dy, r.x2 + dx, r.y2 + dy);

        if linkage::is_plate_class(&source.class) {
            let (plate_class, _) =
                linkage::next_available_names(&self.state.boxes, &self.state.ocr_records);
            let new_index = self.create(&plate_class, shifted)?;
            linkage::find_or_create(&mut self.state.ocr_records, &plate_class);
            Ok(new_index)
        } else {
            self.create(&source.class, shifted)
        }
    }

    /// True when the box at `index` is a tracked plate.
    pub fn is_plate_box(&self, index: usize) -> bool {
        self.state
            .boxes
            .get(index)
            .map_or(false, |b| linkage::is_plate_class(&b.class))
    }

    /// The OCR record bound to the box at `index`, if it is a plate box with
    /// a loaded record. The shell uses this to enable the text entry surface.
    pub fn bound_record(&self, index: usize) -> Option<&OcrRecord> {
        let class = &self.state.boxes.get(index)?.class;
        linkage::find_record(&self.state.ocr_records, class)
    }

    /// Update the text and validation flag of the record bound to the
    /// *selected* box, creating the record if it is missing. Fails with
    /// `Linkage` when the selection is not a plate box.
    pub fn set_plate_text(&mut self, text: &str, validated: bool) -> Result<()> {
        let class = match self.state.selected_box() {
            Some(b) if linkage::is_plate_class(&b.class) => b.class.clone(),
            _ => return Err(AnnotError::Linkage),
        };
        let rec = linkage::find_or_create(&mut self.state.ocr_records, &class)
            .ok_or(AnnotError::Linkage)?;
        rec.set_text(text);
        rec.validated = validated;
        self.state.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BoxStore {
        BoxStore::new(ImageAnnotationState::default(), 1920, 1080, 5)
    }

    #[test]
    fn test_create_selects_new_box() {
        let mut s = store();
        let i = s.create("car", Rect::new(100, 100, 10, 10)).unwrap();
        assert_eq!(i, 0);
        assert_eq!(s.selected(), Some(0));
        // stored normalized
        assert_eq!(s.boxes()[0].coords, Rect::new(10, 10, 100, 100));
        assert!(s.is_dirty());
    }

    #[test]
    fn test_create_rejects_small_box() {
        let mut s = store();
        let err = s.create("car", Rect::new(5, 5, 2, 2)).unwrap_err();
        assert!(matches!(err, AnnotError::Validation(_)));
        assert!(s.boxes().is_empty());
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_move_simple() {
        let mut s = store();
        s.create("car", Rect::new(100, 100, 200, 200)).unwrap();
        s.move_box(0, 50, -30).unwrap();
        assert_eq!(s.boxes()[0].coords, Rect::new(150, 70, 250, 170));
    }

    #[test]
    fn test_move_reanchors_at_border() {
        let mut s = store();
        s.create("car", Rect::new(100, 100, 200, 200)).unwrap();
        // pushing far past the left edge keeps the 100px width
        s.move_box(0, -500, 0).unwrap();
        assert_eq!(s.boxes()[0].coords, Rect::new(0, 100, 100, 200));
        // and far past the bottom-right corner
        s.move_box(0, 5000, 5000).unwrap();
        assert_eq!(s.boxes()[0].coords, Rect::new(1820, 980, 1920, 1080));
    }

    #[test]
    fn test_resize_corner_ownership() {
        let mut s = store();
        s.create("car", Rect::new(100, 100, 200, 200)).unwrap();
        s.resize(0, Handle::Ne, 250, 50).unwrap();
        assert_eq!(s.boxes()[0].coords, Rect::new(100, 50, 250, 200));
        s.resize(0, Handle::Sw, 80, 220).unwrap();
        assert_eq!(s.boxes()[0].coords, Rect::new(80, 50, 250, 220));
    }

    #[test]
    fn test_resize_rejects_collapse() {
        let mut s = store();
        s.create("car", Rect::new(100, 100, 200, 200)).unwrap();
        let err = s.resize(0, Handle::Se, 102, 200).unwrap_err();
        assert!(matches!(err, AnnotError::Validation(_)));
        // untouched
        assert_eq!(s.boxes()[0].coords, Rect::new(100, 100, 200, 200));
    }

    #[test]
    fn test_delete_clamps_selection() {
        let mut s = store();
        s.create("car", Rect::new(0, 0, 50, 50)).unwrap();
        s.create("bus", Rect::new(60, 60, 120, 120)).unwrap();
        assert_eq!(s.selected(), Some(1));

        s.delete(1).unwrap();
        assert_eq!(s.selected(), Some(0));
        s.delete(0).unwrap();
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_delete_plate_cascades_ocr() {
        let mut s = store();
        s.create("Letta_plate", Rect::new(0, 0, 50, 20)).unwrap();
        s.set_plate_text("AB123CD", true).unwrap();
        assert_eq!(s.ocr_records().len(), 1);

        s.delete(0).unwrap();
        assert!(s.ocr_records().is_empty());
    }

    #[test]
    fn test_set_class_plate_to_plate_renames_record() {
        let mut s = store();
        s.create("Letta_plate", Rect::new(0, 0, 50, 20)).unwrap();
        s.set_plate_text("AB123CD", false).unwrap();

        s.set_class(0, "Letta_plate_1").unwrap();
        assert_eq!(s.ocr_records().len(), 1);
        assert_eq!(s.ocr_records()[0].class, "OCR_1");
        assert_eq!(s.ocr_records()[0].text(), "AB123CD");
    }

    #[test]
    fn test_set_class_plate_to_other_drops_record() {
        let mut s = store();
        s.create("Letta_plate", Rect::new(0, 0, 50, 20)).unwrap();
        s.set_plate_text("AB123CD", false).unwrap();

        s.set_class(0, "car").unwrap();
        assert!(s.ocr_records().is_empty());
        assert_eq!(s.boxes()[0].class, "car");
    }

    #[test]
    fn test_promote_to_plate_sequence() {
        let mut s = store();
        s.create("plate", Rect::new(0, 0, 50, 20)).unwrap();
        s.create("plate", Rect::new(100, 0, 150, 20)).unwrap();

        let first = s.promote_to_plate(0).unwrap();
        assert_eq!(first, "Letta_plate");
        let second = s.promote_to_plate(1).unwrap();
        assert_eq!(second, "Letta_plate_1");

        let classes: Vec<_> = s.ocr_records().iter().map(|r| r.class.clone()).collect();
        assert_eq!(classes, vec!["OCR", "OCR_1"]);
    }

    #[test]
    fn test_set_plate_text_requires_plate_selection() {
        let mut s = store();
        s.create("car", Rect::new(0, 0, 50, 50)).unwrap();
        let err = s.set_plate_text("XX", false).unwrap_err();
        assert!(matches!(err, AnnotError::Linkage));

        s.select(None).unwrap();
        assert!(matches!(s.set_plate_text("XX", false), Err(AnnotError::Linkage)));
    }

    #[test]
    fn test_duplicate_offsets_copy() {
        let mut s = store();
        s.create("car", Rect::new(0, 0, 50, 50)).unwrap();
        let i = s.duplicate(0).unwrap();
        assert_eq!(i, 1);
        assert_eq!(s.boxes()[1].coords, Rect::new(12, 12, 62, 62));
        assert_eq!(s.selected(), Some(1));
    }

    #[test]
    fn test_duplicate_plate_gets_fresh_name() {
        let mut s = store();
        s.create("Letta_plate", Rect::new(0, 0, 60, 30)).unwrap();
        s.set_plate_text("AA000AA", true).unwrap();

        let i = s.duplicate(0).unwrap();
        assert_eq!(s.boxes()[i].class, "Letta_plate_1");
        // the copy has its own empty record, the original's is untouched
        assert_eq!(s.ocr_records().len(), 2);
        assert_eq!(s.bound_record(0).unwrap().text(), "AA000AA");
        assert_eq!(s.bound_record(i).unwrap().text(), "");
    }

    #[test]
    fn test_index_out_of_range() {
        let mut s = store();
        assert!(matches!(s.move_box(3, 1, 1), Err(AnnotError::IndexOutOfRange(3))));
        assert!(matches!(s.delete(0), Err(AnnotError::IndexOutOfRange(0))));
        assert!(matches!(s.select(Some(9)), Err(AnnotError::IndexOutOfRange(9))));
    }
}
