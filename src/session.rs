//! Editing session over one folder of images.
//!
//! `Editor` is what the shell drives: it owns the per-image histories, the
//! folder class index and the configuration, plus the state of the one image
//! currently open. Every mutating edit is wrapped in an undo snapshot taken
//! from the pre-mutation state; failed operations (validation rejects,
//! out-of-range indices) leave both the state and the history untouched.

use crate::cache::MetadataCache;
use crate::config::AnnotConfig;
use crate::error::{AnnotError, Result};
use crate::geometry::Rect;
use crate::history::{HistoryManager, Snapshot};
use crate::model::{ImageAnnotationState, OcrRecord, SaveDecision};
use crate::overlap::{self, OverlapReport};
use crate::scanner::ImageInfo;
use crate::sidecar;
use crate::store::{BoxStore, Handle};
use std::path::{Path, PathBuf};

/// How the currently open image's sidecar came in.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Annotations loaded from the sidecar.
    Loaded,
    /// No sidecar yet; editing starts empty.
    Fresh,
    /// The sidecar exists but is unreadable. Editing starts empty and the
    /// file on disk was not touched; the message is shown to the user.
    Corrupt(String),
}

struct OpenImage {
    key: String,
    sidecar_path: PathBuf,
    store: BoxStore,
}

pub struct Editor {
    config: AnnotConfig,
    history: HistoryManager,
    cache: MetadataCache,
    images: Vec<ImageInfo>,
    current: Option<OpenImage>,
}

impl Editor {
    pub fn new(config: AnnotConfig) -> Self {
        let history = HistoryManager::new(config.history_depth);
        Editor {
            config,
            history,
            cache: MetadataCache::new(),
            images: Vec::new(),
            current: None,
        }
    }

    /// The folder's image list, as produced by the scanner. Backs the
    /// class-filter queries.
    pub fn set_images(&mut self, images: Vec<ImageInfo>) {
        self.images = images;
        self.cache.invalidate();
    }

    /// Class-filter query for navigation: does `file_name` contain `class`?
    pub fn image_has_class(&mut self, file_name: &str, class: &str) -> bool {
        self.cache.has_class(&self.images, file_name, class)
    }

    /// Open an image for editing. The previous image must already be closed
    /// (its dirty state resolved through `close`).
    pub fn open(&mut self, image_path: &Path, img_width: i32, img_height: i32) -> Result<LoadStatus> {
        if let Some(open) = &self.current {
            if open.store.is_dirty() {
                return Err(AnnotError::Validation(format!(
                    "image {} has unsaved changes",
                    open.key
                )));
            }
        }

        let sidecar_path = sidecar::sidecar_path(image_path);
        let key = image_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let (state, status) = match sidecar::load(&sidecar_path) {
            Ok(loaded) => {
                let status = if loaded.boxes.is_empty()
                    && loaded.ocr_records.is_empty()
                    && loaded.save_count == 0
                {
                    LoadStatus::Fresh
                } else {
                    LoadStatus::Loaded
                };
                (loaded.into_state(), status)
            }
            Err(err @ AnnotError::Corruption { .. }) => {
                (ImageAnnotationState::default(), LoadStatus::Corrupt(err.to_string()))
            }
            Err(err) => return Err(err),
        };

        self.current = Some(OpenImage {
            key,
            sidecar_path,
            store: BoxStore::new(state, img_width, img_height, self.config.min_box_size),
        });
        Ok(status)
    }

    fn open_image(&self) -> Result<&OpenImage> {
        self.current
            .as_ref()
            .ok_or_else(|| AnnotError::Validation("no image is open".into()))
    }

    fn open_image_mut(&mut self) -> Result<&mut OpenImage> {
        self.current
            .as_mut()
            .ok_or_else(|| AnnotError::Validation("no image is open".into()))
    }

    pub fn store(&self) -> Option<&BoxStore> {
        self.current.as_ref().map(|o| &o.store)
    }

    pub fn is_dirty(&self) -> bool {
        self.current.as_ref().map_or(false, |o| o.store.is_dirty())
    }

    fn snapshot(open: &OpenImage, action: &str) -> Snapshot {
        let state = open.store.state();
        Snapshot {
            boxes: state.boxes.clone(),
            ocr_records: state.ocr_records.clone(),
            selected: state.selected,
            action: action.to_string(),
        }
    }

    /// Run one mutating edit with undo wrapping: the pre-mutation snapshot is
    /// recorded only when the edit succeeds, so rejected operations leave the
    /// history exactly as it was.
    fn edit<T>(
        &mut self,
        action: &str,
        f: impl FnOnce(&mut BoxStore) -> Result<T>,
    ) -> Result<T> {
        let open = self
            .current
            .as_mut()
            .ok_or_else(|| AnnotError::Validation("no image is open".into()))?;

        let before = Self::snapshot(open, action);
        let value = f(&mut open.store)?;
        self.history.push_undo(&open.key, before);
        Ok(value)
    }

    // --- editing operations, each one undo step ---

    pub fn create_box(&mut self, class: &str, rect: Rect) -> Result<usize> {
        let class = class.to_string();
        self.edit("create box", move |s| s.create(&class, rect))
    }

    pub fn move_box(&mut self, index: usize, dx: i32, dy: i32) -> Result<()> {
        self.edit("move box", |s| s.move_box(index, dx, dy))
    }

    pub fn resize_box(&mut self, index: usize, handle: Handle, x: i32, y: i32) -> Result<()> {
        self.edit("resize box", |s| s.resize(index, handle, x, y))
    }

    pub fn delete_box(&mut self, index: usize) -> Result<()> {
        self.edit("delete box", |s| s.delete(index))
    }

    pub fn set_class(&mut self, index: usize, class: &str) -> Result<()> {
        let class = class.to_string();
        self.edit("change class", move |s| s.set_class(index, &class))
    }

    pub fn promote_to_plate(&mut self, index: usize) -> Result<String> {
        self.edit("promote to plate", |s| s.promote_to_plate(index))
    }

    pub fn duplicate_box(&mut self, index: usize) -> Result<usize> {
        self.edit("paste box", |s| s.duplicate(index))
    }

    pub fn set_plate_text(&mut self, text: &str, validated: bool) -> Result<()> {
        let text = text.to_string();
        self.edit("edit plate text", move |s| s.set_plate_text(&text, validated))
    }

    /// Selection changes are not edits: no history entry, no dirty flag.
    pub fn select(&mut self, index: Option<usize>) -> Result<()> {
        self.open_image_mut()?.store.select(index)
    }

    // --- history ---

    pub fn undo(&mut self) -> Result<String> {
        let open = self
            .current
            .as_mut()
            .ok_or_else(|| AnnotError::Validation("no image is open".into()))?;

        let live = Self::snapshot(open, "");
        let snapshot = self.history.undo(&open.key, live)?;
        Self::restore(open, &snapshot);
        Ok(snapshot.action)
    }

    pub fn redo(&mut self) -> Result<String> {
        let open = self
            .current
            .as_mut()
            .ok_or_else(|| AnnotError::Validation("no image is open".into()))?;

        let live = Self::snapshot(open, "");
        let snapshot = self.history.redo(&open.key, live)?;
        Self::restore(open, &snapshot);
        Ok(snapshot.action)
    }

    fn restore(open: &mut OpenImage, snapshot: &Snapshot) {
        let state = open.store.state_mut();
        state.boxes = snapshot.boxes.clone();
        state.ocr_records = snapshot.ocr_records.clone();
        state.selected = snapshot.selected;
        state.clamp_selection();
        state.dirty = true;
    }

    // --- advisory overlap report for the status indicator ---

    pub fn overlaps(&self) -> Result<OverlapReport> {
        let open = self.open_image()?;
        Ok(overlap::compute_overlaps(
            open.store.boxes(),
            self.config.overlap_iou,
        ))
    }

    // --- persistence ---

    /// Save the open image's annotations. Orphan OCR records are dropped by
    /// the persistence layer; on success the dirty flag clears, the save
    /// count advances and the folder class index is invalidated.
    pub fn save(&mut self) -> Result<u64> {
        let open = self.open_image_mut()?;

        let count = {
            let state = open.store.state();
            sidecar::save(
                &open.sidecar_path,
                &state.boxes,
                &state.ocr_records,
                &state.extra_entries,
            )?
        };

        let state = open.store.state_mut();
        state.save_count = count;
        state.dirty = false;
        self.cache.invalidate();
        Ok(count)
    }

    /// Resolve the open image before navigating away. Returns `true` when the
    /// image was closed; `Cancel` (and a failed save) keeps it open with its
    /// state intact.
    pub fn close(&mut self, decision: SaveDecision) -> Result<bool> {
        if self.current.is_none() {
            return Ok(true);
        }

        if self.is_dirty() {
            match decision {
                SaveDecision::Cancel => return Ok(false),
                SaveDecision::Save => {
                    self.save()?;
                }
                SaveDecision::Discard => {}
            }
        }

        self.current = None;
        Ok(true)
    }

    /// "Is box X a plate box" for the shell's OCR surface enablement.
    pub fn is_plate_box(&self, index: usize) -> bool {
        self.current
            .as_ref()
            .map_or(false, |o| o.store.is_plate_box(index))
    }

    /// The OCR record bound to box `index`, for display.
    pub fn bound_record(&self, index: usize) -> Option<&OcrRecord> {
        self.current.as_ref().and_then(|o| o.store.bound_record(index))
    }
}
