pub mod bmp;
pub mod jpeg;
pub mod png;
pub mod tiff;
pub mod webp;

use image::DynamicImage;
use std::fs::File;
use tracing::debug;

use super::error::ProcessError;
use super::types::{EncodingPolicy, OutputFormat};

/// Write a composited RGBA image into `file` following `policy`.
pub fn save(
    composite: DynamicImage,
    file: File,
    policy: EncodingPolicy,
    quality: u8,
) -> Result<(), ProcessError> {
    let image = if policy.keeps_alpha {
        composite
    } else {
        DynamicImage::ImageRgb8(composite.to_rgb8())
    };

    if policy.uses_quality {
        debug!("Encoding {:?} at quality {}", policy.output, quality);
    }

    match policy.output {
        OutputFormat::Png => png::save(&image, file),
        OutputFormat::Jpeg => jpeg::save(&image, file, quality),
        OutputFormat::Tiff => tiff::save(&image, file),
        OutputFormat::Bmp => bmp::save(&image, file),
        OutputFormat::WebP => webp::save(&image, file, f32::from(quality)),
    }
}
