use image::ImageFormat;
use std::fmt;

/// Container format an input image was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Gif,
    Tiff,
    Bmp,
    WebP,
    /// Decodable, but outside the formats we have a policy for. `None` when
    /// the container could not be determined at all.
    Unrecognized(Option<String>),
}

impl SourceFormat {
    pub fn from_image_format(format: Option<ImageFormat>) -> Self {
        match format {
            Some(ImageFormat::Png) => SourceFormat::Png,
            Some(ImageFormat::Jpeg) => SourceFormat::Jpeg,
            Some(ImageFormat::Gif) => SourceFormat::Gif,
            Some(ImageFormat::Tiff) => SourceFormat::Tiff,
            Some(ImageFormat::Bmp) => SourceFormat::Bmp,
            Some(ImageFormat::WebP) => SourceFormat::WebP,
            Some(other) => SourceFormat::Unrecognized(Some(format!("{:?}", other).to_uppercase())),
            None => SourceFormat::Unrecognized(None),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Png => f.write_str("PNG"),
            SourceFormat::Jpeg => f.write_str("JPEG"),
            SourceFormat::Gif => f.write_str("GIF"),
            SourceFormat::Tiff => f.write_str("TIFF"),
            SourceFormat::Bmp => f.write_str("BMP"),
            SourceFormat::WebP => f.write_str("WEBP"),
            SourceFormat::Unrecognized(Some(name)) => write!(f, "{} (unsupported)", name),
            SourceFormat::Unrecognized(None) => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Tiff,
    Bmp,
    WebP,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Bmp => "bmp",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }
}

/// How a composited image is written back, keyed by its source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingPolicy {
    pub output: OutputFormat,
    /// `false` means the RGBA composite is flattened to RGB before encoding.
    pub keeps_alpha: bool,
    /// Whether the batch quality setting reaches the encoder.
    pub uses_quality: bool,
}

impl EncodingPolicy {
    const fn new(output: OutputFormat, keeps_alpha: bool, uses_quality: bool) -> Self {
        Self {
            output,
            keeps_alpha,
            uses_quality,
        }
    }

    pub fn for_source(source: &SourceFormat) -> Self {
        match source {
            SourceFormat::Jpeg => Self::new(OutputFormat::Jpeg, false, true),
            SourceFormat::Png => Self::new(OutputFormat::Png, true, false),
            // GIF transparency does not survive re-encoding reliably
            SourceFormat::Gif => Self::new(OutputFormat::Png, true, false),
            SourceFormat::Tiff => Self::new(OutputFormat::Tiff, true, false),
            SourceFormat::Bmp => Self::new(OutputFormat::Bmp, false, false),
            SourceFormat::WebP => Self::new(OutputFormat::WebP, true, true),
            SourceFormat::Unrecognized(_) => Self::new(OutputFormat::Png, true, false),
        }
    }
}
