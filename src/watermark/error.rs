use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a whole batch before any image is touched.
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Watermark file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Could not load or convert watermark file {}: {source}", .path.display())]
    WatermarkLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("WebP error: {0}")]
    WebP(#[from] crate::webp_encoder::WebPError),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

/// A single image that could not be watermarked. The batch keeps going.
#[derive(Debug, Error)]
#[error("Error processing {}: {reason}", .path.display())]
pub struct ImageFailure {
    pub path: PathBuf,
    #[source]
    pub reason: ProcessError,
}
