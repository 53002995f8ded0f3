use crate::error::{AnnotError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|&e| e.eq_ignore_ascii_case(ext))
}

fn scan(folder: &Path, max_depth: usize) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(AnnotError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_image_extension(&ext.to_string_lossy()) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                images.push(ImageInfo { path: path.to_path_buf(), file_name });
            }
        }
    }

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// Image files directly inside `folder`, sorted by file name.
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    scan(folder, 1)
}

/// Image files anywhere under `folder`, sorted by file name. Used by the
/// batch commands which work over class subfolders.
pub fn scan_folder_recursive(folder: &Path) -> Result<Vec<ImageInfo>> {
    scan(folder, usize::MAX)
}
