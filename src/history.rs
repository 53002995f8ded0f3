//! Per-image undo/redo stacks of deep state snapshots.
//!
//! Keyed by image identity so history survives navigating away and back.
//! Linear history: any ordinary edit clears the redo stack; redo is only ever
//! repopulated by `undo`.

use crate::error::{AnnotError, Result};
use crate::model::{BoundingBox, OcrRecord};
use std::collections::HashMap;

pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Deep copy of the restorable part of an image's state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub boxes: Vec<BoundingBox>,
    pub ocr_records: Vec<OcrRecord>,
    pub selected: Option<usize>,
    pub action: String,
}

#[derive(Debug, Default)]
struct ImageHistory {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

#[derive(Debug)]
pub struct HistoryManager {
    stacks: HashMap<String, ImageHistory>,
    depth: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl HistoryManager {
    pub fn new(depth: usize) -> Self {
        HistoryManager { stacks: HashMap::new(), depth: depth.max(1) }
    }

    fn entry(&mut self, image_key: &str) -> &mut ImageHistory {
        self.stacks.entry(image_key.to_string()).or_default()
    }

    /// Record the pre-mutation state. Clears redo (linear history) and drops
    /// the oldest entry once the stack exceeds the configured depth.
    pub fn push_undo(&mut self, image_key: &str, snapshot: Snapshot) {
        let depth = self.depth;
        let hist = self.entry(image_key);
        hist.undo.push(snapshot);
        hist.redo.clear();
        if hist.undo.len() > depth {
            hist.undo.remove(0);
        }
    }

    /// Pop the last undo snapshot, stashing `live` (the current state) on the
    /// redo stack so the step can be replayed.
    pub fn undo(&mut self, image_key: &str, live: Snapshot) -> Result<Snapshot> {
        let hist = self.entry(image_key);
        let snapshot = hist.undo.pop().ok_or(AnnotError::NoHistory("undo"))?;
        hist.redo.push(live);
        Ok(snapshot)
    }

    /// Symmetric to `undo`, using the redo stack.
    pub fn redo(&mut self, image_key: &str, live: Snapshot) -> Result<Snapshot> {
        let hist = self.entry(image_key);
        let snapshot = hist.redo.pop().ok_or(AnnotError::NoHistory("redo"))?;
        hist.undo.push(live);
        Ok(snapshot)
    }

    pub fn can_undo(&self, image_key: &str) -> bool {
        self.stacks.get(image_key).map_or(false, |h| !h.undo.is_empty())
    }

    pub fn can_redo(&self, image_key: &str) -> bool {
        self.stacks.get(image_key).map_or(false, |h| !h.redo.is_empty())
    }
}
