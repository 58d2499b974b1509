use std::ffi::c_void;
use thiserror::Error;

/// Lossy WebP encoder over libwebp-sys that keeps the alpha plane.
pub struct WebPEncoder<'a> {
    width: u32,
    height: u32,
    rgba_data: &'a [u8],
}

#[derive(Debug, Error)]
pub enum WebPError {
    #[error("WebP encoding failed")]
    EncodingFailed,

    #[error("Invalid image dimensions")]
    InvalidDimensions,

    #[error("Invalid image data")]
    InvalidData,
}

impl<'a> WebPEncoder<'a> {
    /// Wrap tightly packed RGBA8 pixels.
    pub fn new(width: u32, height: u32, rgba_data: &'a [u8]) -> Result<Self, WebPError> {
        if width == 0 || height == 0 || width > i32::MAX as u32 / 4 || height > i32::MAX as u32 {
            return Err(WebPError::InvalidDimensions);
        }

        let expected_size = width as usize * height as usize * 4;
        if rgba_data.len() != expected_size {
            return Err(WebPError::InvalidData);
        }

        Ok(WebPEncoder {
            width,
            height,
            rgba_data,
        })
    }

    /// Encode lossily at `quality` (0-100).
    pub fn encode(&self, quality: f32) -> Result<Vec<u8>, WebPError> {
        unsafe {
            let mut config =
                libwebp_sys::WebPConfig::new().map_err(|_| WebPError::EncodingFailed)?;

            config.quality = quality;
            config.lossless = 0;
            config.method = 6; // Best compression method

            if libwebp_sys::WebPValidateConfig(&config) == 0 {
                return Err(WebPError::EncodingFailed);
            }

            let mut picture =
                libwebp_sys::WebPPicture::new().map_err(|_| WebPError::EncodingFailed)?;

            picture.width = self.width as i32;
            picture.height = self.height as i32;
            picture.use_argb = 0; // YUV(A) for lossy

            if libwebp_sys::WebPPictureImportRGBA(
                &mut picture,
                self.rgba_data.as_ptr(),
                (self.width * 4) as i32,
            ) == 0
            {
                libwebp_sys::WebPPictureFree(&mut picture);
                return Err(WebPError::EncodingFailed);
            }

            let mut memory_writer = WebPMemoryWriter::new();
            picture.writer = Some(webp_memory_write);
            picture.custom_ptr = &mut memory_writer as *mut _ as *mut c_void;

            let encode_result = libwebp_sys::WebPEncode(&config, &mut picture);

            libwebp_sys::WebPPictureFree(&mut picture);

            if encode_result == 0 {
                return Err(WebPError::EncodingFailed);
            }

            Ok(memory_writer.into_data())
        }
    }
}

struct WebPMemoryWriter {
    data: Vec<u8>,
}

impl WebPMemoryWriter {
    fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn write(&mut self, data: &[u8]) -> bool {
        self.data.extend_from_slice(data);
        true
    }

    fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// libwebp writer callback appending into the `WebPMemoryWriter` behind
/// `custom_ptr`.
unsafe extern "C" fn webp_memory_write(
    data: *const u8,
    data_size: usize,
    picture: *const libwebp_sys::WebPPicture,
) -> i32 {
    unsafe {
        if data.is_null() || picture.is_null() {
            return 0;
        }

        let writer = (*picture).custom_ptr as *mut WebPMemoryWriter;
        if writer.is_null() {
            return 0;
        }

        let slice = std::slice::from_raw_parts(data, data_size);
        if (*writer).write(slice) { 1 } else { 0 }
    }
}
