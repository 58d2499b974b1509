use image::{DynamicImage, ImageEncoder, codecs::bmp::BmpEncoder};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::watermark::ProcessError;

pub fn save(image: &DynamicImage, file: File) -> Result<(), ProcessError> {
    let rgb_image = image.to_rgb8();
    let mut writer = BufWriter::new(file);

    BmpEncoder::new(&mut writer).write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    writer.flush()?;
    Ok(())
}
