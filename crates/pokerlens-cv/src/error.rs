//! Typed failures that the pipeline contains at region scope

use pokerlens_core::RegionKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("unreadable image {path:?}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("{kind} region image is empty")]
    EmptyRegion { kind: RegionKind },

    #[error("template directory not found: {path:?}")]
    TemplateDir { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}
