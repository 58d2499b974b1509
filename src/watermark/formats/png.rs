use image::DynamicImage;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::watermark::ProcessError;

/// Save image as PNG with the smallest-output encoder settings
pub fn save(image: &DynamicImage, file: File) -> Result<(), ProcessError> {
    let mut writer = BufWriter::new(file);
    let encoder =
        PngEncoder::new_with_quality(&mut writer, CompressionType::Best, FilterType::Adaptive);
    image.write_with_encoder(encoder)?;
    writer.flush()?;
    Ok(())
}
