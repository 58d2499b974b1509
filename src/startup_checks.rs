use crate::BatchRequest;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{Level, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("No input images given")]
    NoInputImages,

    #[error("Output directory does not exist: {0:?}")]
    OutputDirectoryMissing(PathBuf),

    #[error("Output path is not a directory: {0:?}")]
    OutputNotADirectory(PathBuf),

    #[error("Watermark file does not exist: {0:?}")]
    WatermarkMissing(PathBuf),

    #[error("Watermark is not a .png file: {0:?}")]
    WatermarkNotPng(PathBuf),

    #[error("Input image does not exist: {0:?}")]
    InputImageMissing(PathBuf),
}

impl StartupCheckError {
    /// Critical errors stop the run before the engine is invoked.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::NoInputImages
                | StartupCheckError::OutputDirectoryMissing(_)
                | StartupCheckError::OutputNotADirectory(_)
                | StartupCheckError::WatermarkMissing(_)
        )
    }

    /// Level a failed check is reported at; non-critical checks are advisories.
    pub fn severity(&self) -> Level {
        if self.is_critical() {
            Level::ERROR
        } else {
            Level::WARN
        }
    }
}

/// Log every failed check at its severity. Returns true when the run must stop.
pub fn report_startup_errors(errors: &[StartupCheckError]) -> bool {
    for check in errors {
        if check.severity() == Level::ERROR {
            tracing::error!("Startup check failed: {}", check);
        } else {
            warn!("Startup check warning: {}", check);
        }
    }
    errors.iter().any(StartupCheckError::is_critical)
}

/// Validate a request the way the export button was gated: inputs present,
/// watermark present, output folder an existing directory.
pub fn perform_startup_checks(request: &BatchRequest) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    if request.images.is_empty() {
        errors.push(StartupCheckError::NoInputImages);
    }

    for image in &request.images {
        if !image.exists() {
            warn!("Input image does not exist: {:?}", image);
            errors.push(StartupCheckError::InputImageMissing(image.clone()));
        }
    }

    check_output_directory(&request.output_dir, &mut errors);

    if !request.watermark.exists() {
        errors.push(StartupCheckError::WatermarkMissing(request.watermark.clone()));
    } else if !has_png_extension(&request.watermark) {
        warn!(
            "Watermark {:?} is not a PNG; transparency may be lost",
            request.watermark
        );
        errors.push(StartupCheckError::WatermarkNotPng(request.watermark.clone()));
    } else {
        info!("Watermark file found: {:?}", request.watermark);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_output_directory(output_dir: &Path, errors: &mut Vec<StartupCheckError>) {
    match std::fs::metadata(output_dir) {
        Ok(metadata) if metadata.is_dir() => {
            info!("Output directory exists: {:?}", output_dir);
        }
        Ok(_) => errors.push(StartupCheckError::OutputNotADirectory(
            output_dir.to_path_buf(),
        )),
        Err(_) => errors.push(StartupCheckError::OutputDirectoryMissing(
            output_dir.to_path_buf(),
        )),
    }
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Drop repeated input paths, keeping the first occurrence and the order.
pub fn dedupe_inputs(images: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    images
        .into_iter()
        .filter(|image| seen.insert(image.clone()))
        .collect()
}
