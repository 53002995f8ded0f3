//! Data model for one image's annotations.
//!
//! Shared between the interactive editor (store/session), the persistence
//! layer and the batch merger:
//! - BoundingBox: class-tagged rectangle, identified by list index
//! - OcrRecord: plate text carrier, no geometry
//! - ImageAnnotationState: everything live for the currently open image

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A class-tagged rectangle. Its index in the per-image list is its identity;
/// indices shift when an earlier box is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub class: String,
    pub coords: Rect,
}

impl BoundingBox {
    pub fn new(class: impl Into<String>, coords: Rect) -> Self {
        BoundingBox { class: class.into(), coords }
    }
}

fn default_value() -> Vec<String> {
    vec![String::new()]
}

/// Plate text attached to a plate box via the class-name convention
/// (`Letta_plate` ↔ `OCR`, `Letta_plate_N` ↔ `OCR_N`). Carries no geometry.
///
/// `value[0]` is the recognized text; stored sidecars may omit `value` or
/// `validated` entirely, so both default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRecord {
    pub class: String,
    #[serde(default = "default_value")]
    pub value: Vec<String>,
    #[serde(default)]
    pub validated: bool,
}

impl OcrRecord {
    /// Fresh empty record for a newly promoted plate box.
    pub fn empty(class: impl Into<String>) -> Self {
        OcrRecord {
            class: class.into(),
            value: vec![String::new()],
            validated: false,
        }
    }

    /// The recognized text, if any.
    pub fn text(&self) -> &str {
        self.value.first().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.value.is_empty() {
            self.value.push(text);
        } else {
            self.value[0] = text;
        }
    }
}

/// Live state for the currently open image. Created on load, discarded on
/// navigation once the save-confirmation decision has been resolved.
#[derive(Debug, Clone, Default)]
pub struct ImageAnnotationState {
    pub boxes: Vec<BoundingBox>,
    pub ocr_records: Vec<OcrRecord>,
    /// Sidecar entries that are neither geometry nor OCR; preserved verbatim
    /// so a newer writer never drops them.
    pub extra_entries: Vec<serde_json::Value>,
    pub selected: Option<usize>,
    pub save_count: u64,
    pub dirty: bool,
}

impl ImageAnnotationState {
    pub fn selected_box(&self) -> Option<&BoundingBox> {
        self.selected.and_then(|i| self.boxes.get(i))
    }

    /// Keep `selected` inside the list, or clear it when the list is empty.
    pub fn clamp_selection(&mut self) {
        match self.selected {
            Some(_) if self.boxes.is_empty() => self.selected = None,
            Some(i) if i >= self.boxes.len() => self.selected = Some(self.boxes.len() - 1),
            _ => {}
        }
    }
}

/// Outcome of the save-confirmation prompt shown by the shell before a dirty
/// state is discarded. The core only defines the decision; presenting it is
/// the shell's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    Save,
    Discard,
    Cancel,
}
