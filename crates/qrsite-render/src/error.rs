use std::path::PathBuf;

/// Errors that can occur while rendering or scanning an artifact.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The payload does not fit in a single artifact.
    #[error("payload too large for renderer ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The symbol encoder rejected the payload.
    #[error("QR encoding failed: {0}")]
    Encode(String),

    /// The image could not be written or read.
    #[error("image error for {path}: {message}")]
    Image { path: PathBuf, message: String },

    /// No symbol was detected in the image.
    #[error("no QR code found in {path}")]
    NoCode { path: PathBuf },

    /// A symbol was detected but could not be decoded.
    #[error("failed to decode QR code in {path}: {message}")]
    Scan { path: PathBuf, message: String },

    /// Failed to write an artifact file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read an artifact file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred while listing artifacts.
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
