//! Vehicle image annotation engine.
//!
//! The data core behind an interactive labeling tool for vehicle images:
//! class-tagged bounding boxes with linked license-plate OCR text, persisted
//! per image as a JSON sidecar, plus the batch clustering step that merges
//! duplicate or fragmented detections. Rendering, input bindings and model
//! inference live outside this crate.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod filename;
pub mod geometry;
pub mod history;
pub mod linkage;
pub mod merge;
pub mod model;
pub mod overlap;
pub mod scanner;
pub mod session;
pub mod sidecar;
pub mod store;

pub use config::AnnotConfig;
pub use error::{AnnotError, Result};
pub use geometry::Rect;
pub use model::{BoundingBox, ImageAnnotationState, OcrRecord, SaveDecision};
pub use session::{Editor, LoadStatus};
pub use store::{BoxStore, Handle};
