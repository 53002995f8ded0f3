//! Plate ↔ OCR class-name convention.
//!
//! A confirmed license plate box is classed `Letta_plate` (or `Letta_plate_N`
//! when one image holds several); its text lives in a separate OCR record
//! classed `OCR` (or `OCR_N`). This module owns the transform between the two
//! namespaces and the lookup of a box's bound record.

use crate::model::{BoundingBox, OcrRecord};
use lazy_static::lazy_static;
use regex::Regex;

pub const PLATE_CLASS: &str = "Letta_plate";
pub const OCR_CLASS: &str = "OCR";

lazy_static! {
    /// Tolerant reader for stored variants: the sidecar may carry any casing.
    static ref RE_PLATE: Regex = Regex::new(r"(?i)^letta_plate(?:_(\d+))?$").unwrap();
    /// OCR pseudo-entries are recognized by prefix, matching the on-disk
    /// discriminant rule.
    static ref RE_OCR_STARTS: Regex = Regex::new(r"(?i)^ocr").unwrap();
}

/// True for `Letta_plate` and `Letta_plate_N`, any casing.
pub fn is_plate_class(class: &str) -> bool {
    RE_PLATE.is_match(class)
}

/// True for any class that would be treated as an OCR entry on disk.
pub fn is_ocr_class(class: &str) -> bool {
    RE_OCR_STARTS.is_match(class)
}

/// Numeric suffix of a plate class: `Letta_plate` → `None` (base),
/// `Letta_plate_3` → `Some(3)`. Returns `None` for non-plate classes too, so
/// callers must check `is_plate_class` first when the distinction matters.
fn plate_suffix(class: &str) -> Option<u32> {
    RE_PLATE
        .captures(class)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// The OCR class paired with a plate class: `Letta_plate` → `OCR`,
/// `Letta_plate_N` → `OCR_N`. `None` when `class` is not a plate class.
pub fn ocr_class_for_plate(class: &str) -> Option<String> {
    if !is_plate_class(class) {
        return None;
    }
    Some(match plate_suffix(class) {
        None => OCR_CLASS.to_string(),
        Some(n) => format!("{}_{}", OCR_CLASS, n),
    })
}

/// Next unused plate/OCR name pair. Scans both the geometry boxes and the
/// loaded OCR records (some sidecars carry OCR entries whose plate was edited
/// elsewhere) for numeric suffixes; the base name counts as suffix 0.
pub fn next_available_names(boxes: &[BoundingBox], records: &[OcrRecord]) -> (String, String) {
    let mut max_suffix: Option<u32> = None;

    let mut consider = |class: &str, base_is_plate: bool| {
        let matched = if base_is_plate {
            is_plate_class(class)
        } else {
            // exact OCR names only; prefix matches like "ocr_text" don't
            // reserve a slot
            class.eq_ignore_ascii_case(OCR_CLASS)
                || class
                    .to_ascii_lowercase()
                    .strip_prefix("ocr_")
                    .map(|rest| rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty())
                    .unwrap_or(false)
        };
        if matched {
            let suffix = class
                .rsplit('_')
                .next()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(0);
            max_suffix = Some(max_suffix.map_or(suffix, |m: u32| m.max(suffix)));
        }
    };

    for b in boxes {
        consider(&b.class, true);
    }
    for r in records {
        consider(&r.class, false);
    }

    match max_suffix {
        None => (PLATE_CLASS.to_string(), OCR_CLASS.to_string()),
        Some(n) => (
            format!("{}_{}", PLATE_CLASS, n + 1),
            format!("{}_{}", OCR_CLASS, n + 1),
        ),
    }
}

/// The record bound to `plate_class`, if one is loaded. Case-insensitive on
/// the stored side.
pub fn find_record<'a>(records: &'a [OcrRecord], plate_class: &str) -> Option<&'a OcrRecord> {
    let target = ocr_class_for_plate(plate_class)?;
    records.iter().find(|r| r.class.eq_ignore_ascii_case(&target))
}

pub fn find_record_mut<'a>(
    records: &'a mut [OcrRecord],
    plate_class: &str,
) -> Option<&'a mut OcrRecord> {
    let target = ocr_class_for_plate(plate_class)?;
    records
        .iter_mut()
        .find(|r| r.class.eq_ignore_ascii_case(&target))
}

/// The bound record for `plate_class`, created empty (value `[""]`, not
/// validated) when missing. No-op returning `None` for non-plate classes.
pub fn find_or_create<'a>(
    records: &'a mut Vec<OcrRecord>,
    plate_class: &str,
) -> Option<&'a mut OcrRecord> {
    let target = ocr_class_for_plate(plate_class)?;
    let pos = records
        .iter()
        .position(|r| r.class.eq_ignore_ascii_case(&target));
    let idx = match pos {
        Some(i) => i,
        None => {
            records.push(OcrRecord::empty(target));
            records.len() - 1
        }
    };
    Some(&mut records[idx])
}

/// Drop every record whose class matches `ocr_class` (case-insensitive).
pub fn remove_record(records: &mut Vec<OcrRecord>, ocr_class: &str) {
    records.retain(|r| !r.class.eq_ignore_ascii_case(ocr_class));
}
