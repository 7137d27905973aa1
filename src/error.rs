use thiserror::Error;

/// A document could not be loaded. The scene is untouched when this is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("document contains {0} workspace objects, expected one")]
    DuplicateWorkspace(usize),
    #[error("editor session has been disposed")]
    Disposed,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to fetch image: {0}")]
    Fetch(String),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid data URI")]
    InvalidDataUri,
    #[error("editor session ended before the image arrived")]
    SessionEnded,
    #[error("target object is gone or is not an image")]
    NoTarget,
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("workspace has no area to export")]
    EmptyWorkspace,
    #[error("workspace of {width}x{height} exceeds the export pixel budget")]
    TooLarge { width: f64, height: f64 },
    #[error("editor session has been disposed")]
    Disposed,
}
