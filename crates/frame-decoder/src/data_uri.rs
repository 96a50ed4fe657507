//! Data-URI parsing and decoding
//!
//! Browser clients send frames as `canvas.toDataURL(...)` strings:
//! `data:image/jpeg;base64,/9j/4AAQ...`. Only the part after the first comma
//! carries image bytes; the header is informational.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, ImageReader, Limits, RgbImage};
use std::io::Cursor;
use tracing::trace;

use crate::frame::VideoFrame;
use crate::DecodeError;

/// Largest accepted frame edge (pixels)
pub const MAX_FRAME_DIMENSION: u32 = 4096;

/// Decoder allocation cap (bytes)
const MAX_DECODE_ALLOC: u64 = 128 * 1024 * 1024;

/// Borrowed view of a `<header>,<body>` data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// MIME type named by the header, if any (e.g. `image/jpeg`)
    pub mime: Option<&'a str>,
    /// Whether the header declares a base64 body
    pub base64: bool,
    /// Encoded body
    pub body: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split a payload into header and body
    pub fn parse(payload: &'a str) -> Result<Self, DecodeError> {
        let (header, body) = payload
            .split_once(',')
            .ok_or_else(|| DecodeError::MalformedUri("missing ',' separator".into()))?;

        let header = header.trim();
        let header = header.strip_prefix("data:").unwrap_or(header);
        let mut parts = header.split(';');
        let mime = parts.next().filter(|m| !m.is_empty());
        let base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));

        let body = body.trim();
        if body.is_empty() {
            return Err(DecodeError::MalformedUri("empty body".into()));
        }

        Ok(Self { mime, base64, body })
    }

    /// Decode the base64 body into raw bytes
    pub fn bytes(&self) -> Result<Vec<u8>, DecodeError> {
        Ok(STANDARD.decode(self.body)?)
    }
}

/// Decode a data-URI frame payload into an RGB frame
///
/// The body is always decoded as base64; the header is not consulted.
pub fn decode_data_uri(payload: &str, sequence: u64) -> Result<VideoFrame, DecodeError> {
    let uri = DataUri::parse(payload)?;
    let bytes = uri.bytes()?;
    let rgb = decode_image(&bytes)?.to_rgb8();

    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    trace!(
        sequence,
        mime = uri.mime.unwrap_or("unknown"),
        width,
        height,
        "Decoded frame"
    );

    Ok(VideoFrame::from_rgb(rgb, sequence))
}

/// Decode raster bytes, rejecting frames larger than a camera would produce
fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_FRAME_DIMENSION);
    limits.max_image_height = Some(MAX_FRAME_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);

    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.limits(limits);
    Ok(reader.decode()?)
}

/// Encode an RGB image as a `data:<mime>;base64,<body>` string
pub fn encode_data_uri(image: &RgbImage, format: ImageFormat) -> Result<String, DecodeError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone()).write_to(&mut Cursor::new(&mut bytes), format)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}
