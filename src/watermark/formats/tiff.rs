use ::tiff::encoder::{TiffEncoder, colortype, compression::Lzw};
use image::DynamicImage;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::watermark::ProcessError;

/// Save image as an LZW-compressed RGBA TIFF.
///
/// The `image` crate's TIFF encoder only writes uncompressed strips, so this
/// goes through the `tiff` encoder directly.
pub fn save(image: &DynamicImage, file: File) -> Result<(), ProcessError> {
    let rgba_image = image.to_rgba8();
    let mut writer = BufWriter::new(file);

    {
        let mut encoder = TiffEncoder::new(&mut writer)?;
        encoder.write_image_with_compression::<colortype::RGBA8, _>(
            rgba_image.width(),
            rgba_image.height(),
            Lzw::default(),
            rgba_image.as_raw(),
        )?;
    }

    writer.flush()?;
    Ok(())
}
