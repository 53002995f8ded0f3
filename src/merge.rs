//! Batch merging of duplicate/fragmented detector output.
//!
//! Detectors frequently split one vehicle into several overlapping or
//! adjacent boxes of the same class. IoU alone misses adjacent fragments that
//! barely overlap, so two boxes are linked when either their IoU exceeds the
//! threshold or their centers are closer than a fraction of the smaller
//! diagonal. Transitively linked boxes form a component and collapse into one
//! envelope box.
//!
//! Runs offline over raw detections, before any interactive editing.

use crate::model::BoundingBox;

#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Classes the merger is allowed to collapse; everything else passes
    /// through unchanged.
    pub mergeable_classes: Vec<String>,
    /// Strict lower bound: boxes link when IoU is above this.
    pub iou_threshold: f64,
    /// Fraction of the smaller diagonal under which centers count as close.
    pub center_factor: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            mergeable_classes: vec!["motorcycle".into(), "bicycle".into()],
            iou_threshold: 0.12,
            center_factor: 0.25,
        }
    }
}

impl MergeConfig {
    fn is_mergeable(&self, class: &str) -> bool {
        self.mergeable_classes.iter().any(|c| c == class)
    }
}

/// Union-find over box indices within one class.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        DisjointSet { parent: (0..n).collect() }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            let parent = self.parent[i];
            let root = self.find(parent);
            self.parent[i] = root;
        }
        self.parent[i]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Merge near-duplicate same-class boxes. Returns the merged list and the
/// number of boxes eliminated (`Σ (component size − 1)` over components
/// larger than one).
pub fn merge_boxes(boxes: &[BoundingBox], config: &MergeConfig) -> (Vec<BoundingBox>, usize) {
    if boxes.is_empty() {
        return (Vec::new(), 0);
    }

    let mut final_boxes = Vec::new();
    let mut merged_count = 0;

    for target_class in &config.mergeable_classes {
        let class_boxes: Vec<&BoundingBox> =
            boxes.iter().filter(|b| &b.class == target_class).collect();
        if class_boxes.is_empty() {
            continue;
        }

        let n = class_boxes.len();
        let mut dsu = DisjointSet::new(n);

        for i in 0..n {
            for j in (i + 1)..n {
                let a = class_boxes[i].coords;
                let b = class_boxes[j].coords;
                if a.iou(&b) > config.iou_threshold
                    || a.centers_close(&b, config.center_factor)
                {
                    dsu.union(i, j);
                }
            }
        }

        // collapse each component into its envelope
        let mut components: Vec<Vec<usize>> = Vec::new();
        let mut root_slot = vec![usize::MAX; n];
        for i in 0..n {
            let root = dsu.find(i);
            if root_slot[root] == usize::MAX {
                root_slot[root] = components.len();
                components.push(Vec::new());
            }
            components[root_slot[root]].push(i);
        }

        for members in components {
            if members.len() > 1 {
                merged_count += members.len() - 1;
            }
            let mut rects = members.iter().map(|&i| class_boxes[i].coords.normalized());
            let first = match rects.next() {
                Some(r) => r,
                None => continue,
            };
            let envelope = rects.fold(first, |acc, r| acc.envelope(&r));
            final_boxes.push(BoundingBox::new(target_class.clone(), envelope));
        }
    }

    // pass-through boxes, unchanged and in their original relative order
    final_boxes.extend(
        boxes
            .iter()
            .filter(|b| !config.is_mergeable(&b.class))
            .cloned(),
    );

    (final_boxes, merged_count)
}
