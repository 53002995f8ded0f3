//! Advisory pairwise overlap detection over one image's boxes.
//!
//! Drives the status indicator only; no result here ever blocks an edit or a
//! save.

use crate::linkage;
use crate::model::BoundingBox;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlapReport {
    /// Indices of every box that participates in at least one flagged pair.
    pub indices: HashSet<usize>,
    /// Some pair has exactly identical coordinates.
    pub exact_duplicate: bool,
    /// Some pair reaches the IoU threshold without being identical.
    pub high_overlap: bool,
}

impl OverlapReport {
    pub fn is_clean(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Compare every unordered pair of geometry boxes. Identical coordinates flag
/// both indices as an exact duplicate regardless of the threshold; otherwise
/// a pair is flagged when `IoU >= iou_threshold`.
///
/// OCR-classed entries should never appear in `boxes` since the store keeps
/// geometry and OCR apart, but they are skipped here anyway in case a legacy
/// sidecar leaks one through.
pub fn compute_overlaps(boxes: &[BoundingBox], iou_threshold: f64) -> OverlapReport {
    let mut report = OverlapReport::default();

    for i in 0..boxes.len() {
        if linkage::is_ocr_class(&boxes[i].class) {
            continue;
        }
        for j in (i + 1)..boxes.len() {
            if linkage::is_ocr_class(&boxes[j].class) {
                continue;
            }

            let a = boxes[i].coords;
            let b = boxes[j].coords;

            if a == b {
                report.indices.insert(i);
                report.indices.insert(j);
                report.exact_duplicate = true;
                continue;
            }

            if a.iou(&b) >= iou_threshold {
                report.indices.insert(i);
                report.indices.insert(j);
                report.high_overlap = true;
            }
        }
    }

    report
}
