use image::{DynamicImage, ImageEncoder, codecs::jpeg::JpegEncoder};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::watermark::ProcessError;

/// Save image as JPEG
pub fn save(image: &DynamicImage, file: File, quality: u8) -> Result<(), ProcessError> {
    // JPEG doesn't support alpha channel
    let rgb_image = image.to_rgb8();
    let mut writer = BufWriter::new(file);

    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    writer.flush()?;
    Ok(())
}
