//! Sidecar JSON persistence: one `.json` per image, next to it.
//!
//! On-disk schema, kept stable for round-tripping with older tools:
//!
//! ```json
//! {"boxes": [{"class": "car", "coords": [x1, y1, x2, y2]},
//!            {"class": "OCR", "value": ["AB123CD"], "validated": true}],
//!  "save_count": 3}
//! ```
//!
//! A single array holds both geometry and OCR entries; an entry is OCR iff
//! its lowercased class starts with "ocr", else geometry iff it carries a
//! 4-element `coords` list, else it is preserved verbatim. Writes are atomic
//! (temp file, fsync, rename) so a crash never leaves a half-written sidecar.

use crate::error::{AnnotError, Result};
use crate::linkage;
use crate::model::{BoundingBox, ImageAnnotationState, OcrRecord};
use serde_json::{json, Value};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Image path with its extension replaced by `.json`.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

/// Parsed content of one sidecar file.
#[derive(Debug, Clone, Default)]
pub struct LoadedSidecar {
    pub boxes: Vec<BoundingBox>,
    pub ocr_records: Vec<OcrRecord>,
    /// Entries that are neither geometry nor OCR, kept verbatim.
    pub extra_entries: Vec<Value>,
    pub save_count: u64,
}

impl LoadedSidecar {
    pub fn into_state(self) -> ImageAnnotationState {
        ImageAnnotationState {
            boxes: self.boxes,
            ocr_records: self.ocr_records,
            extra_entries: self.extra_entries,
            selected: None,
            save_count: self.save_count,
            dirty: false,
        }
    }
}

fn is_geometry_entry(entry: &Value) -> bool {
    entry
        .get("coords")
        .and_then(Value::as_array)
        .map_or(false, |c| c.len() == 4 && c.iter().all(Value::is_i64))
}

/// Read the sidecar for an image. A missing file is an empty result; a file
/// that exists but does not parse is `Corruption` — the caller shows the
/// error and works from an empty state, and the file itself is never touched
/// on the strength of a failed read.
pub fn load(sidecar: &Path) -> Result<LoadedSidecar> {
    if !sidecar.exists() {
        return Ok(LoadedSidecar::default());
    }

    let content = std::fs::read_to_string(sidecar)?;
    let data: Value = serde_json::from_str(&content).map_err(|source| AnnotError::Corruption {
        path: sidecar.to_path_buf(),
        source,
    })?;

    let mut loaded = LoadedSidecar {
        save_count: data.get("save_count").and_then(Value::as_u64).unwrap_or(0),
        ..Default::default()
    };

    let entries = data.get("boxes").and_then(Value::as_array);
    for entry in entries.into_iter().flatten() {
        let class = entry.get("class").and_then(Value::as_str).unwrap_or("");

        if linkage::is_ocr_class(class) {
            match serde_json::from_value::<OcrRecord>(entry.clone()) {
                Ok(rec) => loaded.ocr_records.push(rec),
                Err(_) => loaded.extra_entries.push(entry.clone()),
            }
        } else if is_geometry_entry(entry) {
            match serde_json::from_value::<BoundingBox>(entry.clone()) {
                Ok(b) => loaded.boxes.push(b),
                Err(_) => loaded.extra_entries.push(entry.clone()),
            }
        } else {
            loaded.extra_entries.push(entry.clone());
        }
    }

    Ok(loaded)
}

/// The previous save count, treating absent or unreadable sidecars as 0.
fn current_save_count(sidecar: &Path) -> u64 {
    load(sidecar).map(|l| l.save_count).unwrap_or(0)
}

/// Write the sidecar atomically and return the new save count.
///
/// Only OCR records referenced by a currently-present plate box are written;
/// orphans are dropped. The write goes to `<path>.tmp` with flush + fsync
/// first, then renames over the target, so on any failure the original file
/// is untouched and the temp file is removed.
pub fn save(
    sidecar: &Path,
    boxes: &[BoundingBox],
    ocr_records: &[OcrRecord],
    extra_entries: &[Value],
) -> Result<u64> {
    let required: Vec<String> = boxes
        .iter()
        .filter_map(|b| linkage::ocr_class_for_plate(&b.class))
        .collect();

    let mut entries: Vec<Value> = Vec::new();
    for b in boxes {
        entries.push(serde_json::to_value(b)?);
    }
    for rec in ocr_records {
        if required.iter().any(|r| r.eq_ignore_ascii_case(&rec.class)) {
            entries.push(serde_json::to_value(rec)?);
        }
    }
    entries.extend_from_slice(extra_entries);

    let save_count = current_save_count(sidecar) + 1;
    let data = json!({ "boxes": entries, "save_count": save_count });
    let serialized = serde_json::to_string_pretty(&data)?;

    let temp_path = sidecar.with_extension("json.tmp");
    let result = write_durable(&temp_path, serialized.as_bytes())
        .and_then(|_| std::fs::rename(&temp_path, sidecar).map_err(AnnotError::from));

    if let Err(err) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err);
    }

    Ok(save_count)
}

fn write_durable(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}
