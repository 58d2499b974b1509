use image::{DynamicImage, ImageReader, ImageResult, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::error::{ImageFailure, WatermarkError};
use super::placement::Position;
use super::processor::{self, display_name};

pub const DEFAULT_QUALITY: u8 = 95;

/// Everything one batch run needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub images: Vec<PathBuf>,
    pub watermark: PathBuf,
    pub output_dir: PathBuf,
    pub position: Position,
    pub quality: u8,
    /// Checked between images; an image already in progress always finishes.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl BatchRequest {
    pub fn new(
        images: Vec<PathBuf>,
        watermark: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        position: Position,
    ) -> Self {
        Self {
            images,
            watermark: watermark.into(),
            output_dir: output_dir.into(),
            position,
            quality: DEFAULT_QUALITY,
            cancel: None,
        }
    }

    /// Encoder quality for JPEG and WebP outputs, clamped to 1-100.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Number of images in the request.
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<ImageFailure>,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.succeeded == self.total
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.total,
            attempted: self.attempted,
            succeeded: self.succeeded,
            failed: self.failures.len(),
            cancelled: self.cancelled,
            outputs: self.outputs.clone(),
            failures: self
                .failures
                .iter()
                .map(|failure| FailureSummary {
                    path: failure.path.clone(),
                    reason: failure.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable view of a `BatchOutcome`.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Serialize)]
pub struct FailureSummary {
    pub path: PathBuf,
    pub reason: String,
}

/// Decode the watermark once and convert it to RGBA.
///
/// The container is sniffed from the file content, so a PNG saved without an
/// extension (or under the wrong one) still loads.
pub fn load_watermark(path: &Path) -> Result<RgbaImage, WatermarkError> {
    if !path.exists() {
        return Err(WatermarkError::MissingFile(path.to_path_buf()));
    }

    let watermark = decode_sniffed(path)
        .map_err(|source| WatermarkError::WatermarkLoad {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    debug!(
        "Loaded watermark {:?}: {}x{}",
        path,
        watermark.width(),
        watermark.height()
    );
    Ok(watermark)
}

fn decode_sniffed(path: &Path) -> ImageResult<DynamicImage> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

/// Run a whole batch. Only a missing or undecodable watermark is an error;
/// per-image problems end up in `BatchOutcome::failures`.
pub fn run_batch(request: &BatchRequest) -> Result<BatchOutcome, WatermarkError> {
    let watermark = load_watermark(&request.watermark)?;

    let total = request.images.len();
    let mut outcome = BatchOutcome {
        total,
        ..Default::default()
    };

    info!(
        "Starting batch processing for {} images (position {}, quality {})",
        total, request.position, request.quality
    );

    for (index, image_path) in request.images.iter().enumerate() {
        if request.is_cancelled() {
            warn!(
                "Batch cancelled after {}/{} images",
                outcome.attempted, total
            );
            outcome.cancelled = true;
            break;
        }

        info!(
            "Processing image {}/{}: {} ...",
            index + 1,
            total,
            display_name(image_path)
        );
        outcome.attempted += 1;

        match processor::process_one(
            image_path,
            &watermark,
            &request.output_dir,
            request.position,
            request.quality,
        ) {
            Ok(processed) => {
                outcome.succeeded += 1;
                outcome.outputs.push(processed.output);
            }
            Err(failure) => {
                warn!(" >> Failed to process {}", display_name(image_path));
                outcome.failures.push(failure);
            }
        }
    }

    info!(
        "Batch processing finished. {}/{} images processed successfully.",
        outcome.succeeded, total
    );
    Ok(outcome)
}

/// Function-style entry point: returns how many images were written.
///
/// Unknown `position` labels are treated as `"Bottom-Right"`.
pub fn batch_watermark(
    image_paths: &[PathBuf],
    watermark_path: &Path,
    output_dir: &Path,
    position: &str,
    quality: u8,
) -> Result<usize, WatermarkError> {
    let request = BatchRequest::new(
        image_paths.to_vec(),
        watermark_path,
        output_dir,
        Position::parse(position),
    )
    .with_quality(quality);

    run_batch(&request).map(|outcome| outcome.succeeded)
}
