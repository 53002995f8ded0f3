//! Legacy filename-encoded box lists.
//!
//! Before the sidecar format, annotations were carried in the image file name
//! itself as repeated `class_x1_y1_x2_y2` segments, e.g.
//! `car_10_20_110_220_plate_40_180_90_200.jpg`. This codec exists only for
//! importing (and re-exporting) that format; it is independent of the sidecar
//! schema.

use crate::geometry::Rect;
use crate::model::BoundingBox;
use std::path::Path;

/// Classes the decoder recognizes when no explicit list is supplied. Class
/// tokens contain no underscore in this encoding.
pub const DEFAULT_KNOWN_CLASSES: &[&str] = &[
    "car", "motorcycle", "truck", "bus", "bicycle", "plate", "van", "person",
    "handbag", "backpack", "suitcase",
];

/// Extract boxes from a file name. Tokenizes the stem on `_`; a known class
/// token followed by 4 numeric tokens is consumed as one box, anything else
/// is skipped. Unparseable names simply yield an empty list.
pub fn decode(file_name: &str, known_classes: &[String]) -> Vec<BoundingBox> {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let parts: Vec<&str> = stem.split('_').collect();
    let mut boxes = Vec::new();
    let mut i = 0;

    while i < parts.len() {
        let token = parts[i];
        let is_class = known_classes.iter().any(|c| c == token);

        if is_class && i + 4 < parts.len() {
            let coords: Vec<i32> = parts[i + 1..i + 5]
                .iter()
                .filter_map(|p| p.parse().ok())
                .collect();
            if coords.len() == 4 {
                boxes.push(BoundingBox::new(
                    token,
                    Rect::new(coords[0], coords[1], coords[2], coords[3]),
                ));
                i += 5;
                continue;
            }
        }
        i += 1;
    }

    boxes
}

/// Inverse of `decode`: the name segment for a box list, coordinates
/// normalized. Returns an empty string for an empty list.
pub fn encode(boxes: &[BoundingBox]) -> String {
    boxes
        .iter()
        .map(|b| {
            let r = b.coords.normalized();
            format!("{}_{}_{}_{}_{}", b.class, r.x1, r.y1, r.x2, r.y2)
        })
        .collect::<Vec<_>>()
        .join("_")
}
