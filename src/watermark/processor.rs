use image::{DynamicImage, ImageReader, RgbaImage, imageops};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::error::{ImageFailure, ProcessError};
use super::formats;
use super::naming;
use super::placement::{DEFAULT_MARGIN, Position, compute_position};
use super::types::{EncodingPolicy, OutputFormat, SourceFormat};

/// A successfully written output.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_format: SourceFormat,
    pub output_format: OutputFormat,
}

/// Watermark one image and write it into `output_dir`.
///
/// Every failure, including a panic inside a decoder or encoder, comes back
/// as an `ImageFailure` carrying the image path so a batch can carry on.
pub fn process_one(
    image_path: &Path,
    watermark: &RgbaImage,
    output_dir: &Path,
    position: Position,
    quality: u8,
) -> Result<ProcessedImage, ImageFailure> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        watermark_image(image_path, watermark, output_dir, position, quality)
    }))
    .unwrap_or_else(|payload| Err(ProcessError::Unexpected(panic_message(payload))));

    result.map_err(|reason| {
        error!("Error processing {}: {}", display_name(image_path), reason);
        ImageFailure {
            path: image_path.to_path_buf(),
            reason,
        }
    })
}

fn watermark_image(
    image_path: &Path,
    watermark: &RgbaImage,
    output_dir: &Path,
    position: Position,
    quality: u8,
) -> Result<ProcessedImage, ProcessError> {
    let (base, source_format) = open_with_format(image_path)?;
    debug!(
        "Opened {:?}: {}x{}, {:?}, original format: {}",
        image_path,
        base.width(),
        base.height(),
        base.color(),
        source_format
    );

    // Always a fresh buffer, even for RGBA sources; the decoded image stays untouched
    let mut canvas = base.to_rgba8();
    drop(base);

    let (x, y) = compute_position(
        canvas.width(),
        canvas.height(),
        watermark.width(),
        watermark.height(),
        position,
        DEFAULT_MARGIN,
    );
    debug!("Placing watermark at ({}, {}) for {}", x, y, position);
    imageops::overlay(&mut canvas, watermark, i64::from(x), i64::from(y));

    let policy = EncodingPolicy::for_source(&source_format);
    match &source_format {
        SourceFormat::Gif => warn!(
            "Original format of {} was GIF. Saving watermarked image as PNG to preserve transparency.",
            display_name(image_path)
        ),
        SourceFormat::Unrecognized(Some(name)) => warn!(
            "Unsupported input format '{}' for {}. Saving as PNG.",
            name,
            display_name(image_path)
        ),
        SourceFormat::Unrecognized(None) => warn!(
            "Could not determine original format of {}. Saving as PNG.",
            display_name(image_path)
        ),
        _ => {}
    }

    let stem = naming::output_stem(image_path);
    let (output, file) =
        naming::create_output_file(output_dir, &stem, policy.output.extension())?;
    info!("Saving as {:?} to: {:?}", policy.output, output);

    let pending = PendingOutput::new(&output);
    formats::save(DynamicImage::ImageRgba8(canvas), file, policy, quality)?;
    pending.commit();

    Ok(ProcessedImage {
        source: image_path.to_path_buf(),
        output,
        source_format,
        output_format: policy.output,
    })
}

/// A claimed output file that is removed on drop unless committed, so neither
/// an encoder error nor a panic leaves a truncated file under the claimed name.
struct PendingOutput<'a> {
    path: &'a Path,
    committed: bool,
}

impl<'a> PendingOutput<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingOutput<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(self.path) {
            debug!("Could not remove partial output {:?}: {}", self.path, e);
        }
    }
}

/// Decode an image, sniffing the container from its content first and its
/// extension second.
pub fn open_with_format(path: &Path) -> Result<(DynamicImage, SourceFormat), ProcessError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = SourceFormat::from_image_format(reader.format());
    let image = reader.decode()?;
    Ok((image, format))
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
