use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no plate box is bound to the OCR editing surface")]
    Linkage,

    #[error("annotation sidecar is corrupt: {path}: {source}")]
    Corruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("nothing to {0}")]
    NoHistory(&'static str),

    #[error("box index {0} out of range")]
    IndexOutOfRange(usize),

    #[error("folder not found: {0}")]
    FolderNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnnotError>;
