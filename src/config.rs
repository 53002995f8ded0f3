use crate::error::{AnnotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Session configuration. All of the thresholds that the editor and the batch
/// merger rely on are plain fields here instead of hard-coded literals;
/// components receive the values they need explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotConfig {
    /// Boxes narrower or shorter than this are rejected on create/resize.
    pub min_box_size: i32,
    /// IoU at or above this flags a pair in the advisory overlap report.
    pub overlap_iou: f64,
    /// IoU strictly above this links two same-class boxes in batch merging.
    pub merge_iou: f64,
    /// Center-distance factor (fraction of the smaller diagonal) for batch
    /// merging.
    pub merge_center_factor: f64,
    /// Undo/redo stack depth per image.
    pub history_depth: usize,
    /// Classes offered by the editor.
    pub classes: Vec<String>,
    /// Classes the batch merger is allowed to collapse.
    pub mergeable_classes: Vec<String>,
}

impl Default for AnnotConfig {
    fn default() -> Self {
        Self {
            min_box_size: 5,
            overlap_iou: 0.8,
            merge_iou: 0.12,
            merge_center_factor: 0.25,
            history_depth: 50,
            classes: vec![
                "car".into(),
                "motorcycle".into(),
                "truck".into(),
                "bus".into(),
                "bicycle".into(),
                "van".into(),
                "plate".into(),
                "Letta_plate".into(),
                "scooter".into(),
                "hat".into(),
            ],
            mergeable_classes: vec!["motorcycle".into(), "bicycle".into()],
        }
    }
}

impl AnnotConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Explicit-path variant, used by tests and the `--config` flag.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AnnotConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AnnotError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("vehicle-annot").join("config.json"))
    }
}
