//! Folder-wide class index for fast filtering.
//!
//! Reading every sidecar on every filter keystroke is too slow for large
//! folders, so the classes present in each image are indexed once and kept in
//! memory until a save invalidates them. Rebuilds are lazy: the next query
//! after an invalidation pays the cost.

use crate::scanner::ImageInfo;
use crate::sidecar;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct MetadataCache {
    /// file name -> lowercased classes found in its sidecar
    entries: HashMap<String, HashSet<String>>,
    valid: bool,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the index stale. Called after every successful save into the
    /// active folder.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// One full pass over the folder's images. Unreadable or missing sidecars
    /// index as an empty set rather than failing the whole rebuild.
    pub fn rebuild(&mut self, images: &[ImageInfo]) {
        self.entries.clear();

        for img in images {
            let classes = match sidecar::load(&sidecar::sidecar_path(&img.path)) {
                Ok(loaded) => loaded
                    .boxes
                    .iter()
                    .map(|b| b.class.to_lowercase())
                    .chain(loaded.ocr_records.iter().map(|r| r.class.to_lowercase()))
                    .collect(),
                Err(_) => HashSet::new(),
            };
            self.entries.insert(img.file_name.clone(), classes);
        }

        self.valid = true;
    }

    /// O(1) once built; triggers a rebuild when the index is stale. An empty
    /// `class` filter accepts every image.
    pub fn has_class(&mut self, images: &[ImageInfo], file_name: &str, class: &str) -> bool {
        if !self.valid {
            self.rebuild(images);
        }

        if class.is_empty() {
            return true;
        }

        self.entries
            .get(file_name)
            .map_or(false, |classes| classes.contains(&class.to_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::BoundingBox;
    use std::path::Path;
    use tempfile::tempdir;

    fn image(dir: &Path, name: &str) -> ImageInfo {
        let path = dir.join(name);
        std::fs::write(&path, b"img").unwrap();
        ImageInfo { path, file_name: name.to_string() }
    }

    #[test]
    fn test_rebuild_indexes_lowercased_classes() {
        let dir = tempdir().unwrap();
        let img = image(dir.path(), "a.jpg");
        let boxes = vec![BoundingBox::new("Letta_plate", Rect::new(0, 0, 10, 10))];
        sidecar::save(&sidecar::sidecar_path(&img.path), &boxes, &[], &[]).unwrap();

        let images = vec![img];
        let mut cache = MetadataCache::new();
        assert!(cache.has_class(&images, "a.jpg", "letta_plate"));
        assert!(cache.has_class(&images, "a.jpg", "LETTA_PLATE"));
        assert!(!cache.has_class(&images, "a.jpg", "car"));
    }

    #[test]
    fn test_missing_sidecar_is_empty_set() {
        let dir = tempdir().unwrap();
        let images = vec![image(dir.path(), "bare.jpg")];
        let mut cache = MetadataCache::new();
        assert!(!cache.has_class(&images, "bare.jpg", "car"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_corrupt_sidecar_is_empty_set() {
        let dir = tempdir().unwrap();
        let img = image(dir.path(), "bad.jpg");
        std::fs::write(sidecar::sidecar_path(&img.path), "{ broken").unwrap();

        let images = vec![img];
        let mut cache = MetadataCache::new();
        assert!(!cache.has_class(&images, "bad.jpg", "car"));
    }

    #[test]
    fn test_empty_filter_accepts_all() {
        let dir = tempdir().unwrap();
        let images = vec![image(dir.path(), "a.jpg")];
        let mut cache = MetadataCache::new();
        assert!(cache.has_class(&images, "a.jpg", ""));
        assert!(cache.has_class(&images, "unknown.jpg", ""));
    }

    #[test]
    fn test_invalidation_triggers_rebuild() {
        let dir = tempdir().unwrap();
        let img = image(dir.path(), "a.jpg");
        let json_path = sidecar::sidecar_path(&img.path);
        let images = vec![img];

        let mut cache = MetadataCache::new();
        assert!(!cache.has_class(&images, "a.jpg", "car"));

        // a save lands new content, then invalidates the cache
        let boxes = vec![BoundingBox::new("car", Rect::new(0, 0, 10, 10))];
        sidecar::save(&json_path, &boxes, &[], &[]).unwrap();
        assert!(!cache.has_class(&images, "a.jpg", "car")); // still stale

        cache.invalidate();
        assert!(cache.has_class(&images, "a.jpg", "car"));
    }
}
