//! Error types for figure, scene and painting operations.

use std::path::PathBuf;

/// Errors surfaced by the drawing engine and its persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid color for `{key}`: {value}")]
    InvalidColor { key: String, value: String },

    #[error("invalid number for `{key}`: {value}")]
    InvalidNumber { key: String, value: String },

    #[error("invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },

    #[error("unsupported {field}: `{value}`")]
    UnsupportedStyle { field: &'static str, value: String },

    #[error("malformed painting record: {0}")]
    MalformedPainting(String),

    #[error("invalid image name: {0}")]
    InvalidImageName(String),

    #[error("no record at {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
