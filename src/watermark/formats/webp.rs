use image::DynamicImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, error};

use crate::watermark::ProcessError;
use crate::webp_encoder::{WebPEncoder, WebPError};

/// Save image as lossy WebP, keeping transparency
pub fn save(image: &DynamicImage, file: File, quality: f32) -> Result<(), ProcessError> {
    let rgba_image = image.to_rgba8();
    let (width, height) = rgba_image.dimensions();

    let webp_data = match WebPEncoder::new(width, height, rgba_image.as_raw()) {
        Ok(encoder) => match encoder.encode(quality) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    "WebP encoding error: {}, falling back to basic webp crate",
                    e
                );
                encode_fallback(rgba_image.as_raw(), width, height, quality)?
            }
        },
        Err(e) => {
            error!(
                "Failed to create WebP encoder: {}, falling back to basic webp crate",
                e
            );
            encode_fallback(rgba_image.as_raw(), width, height, quality)?
        }
    };

    let mut writer = BufWriter::new(file);
    writer.write_all(&webp_data)?;
    writer.flush()?;
    debug!("WebP written: {} bytes", webp_data.len());
    Ok(())
}

/// Fallback through the basic webp crate
fn encode_fallback(
    rgba_data: &[u8],
    width: u32,
    height: u32,
    quality: f32,
) -> Result<Vec<u8>, WebPError> {
    let encoder = ::webp::Encoder::from_rgba(rgba_data, width, height);
    let encoded = encoder
        .encode_simple(false, quality)
        .map_err(|e| {
            debug!("webp crate encoder failed: {:?}", e);
            WebPError::EncodingFailed
        })?;
    Ok(encoded.to_vec())
}
