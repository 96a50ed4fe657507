//! Frame Decoder
//!
//! Turns the still images streamed by browser clients into RGB frames:
//! - Data-URI parsing (`data:image/jpeg;base64,<body>`)
//! - Base64 body decoding
//! - Raster decoding (JPEG, PNG, WebP, ...) to packed RGB

pub mod data_uri;
pub mod frame;

pub use data_uri::{decode_data_uri, encode_data_uri, DataUri, MAX_FRAME_DIMENSION};
pub use frame::VideoFrame;

use thiserror::Error;

/// Frame decoding error types
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed data URI: {0}")]
    MalformedUri(String),

    #[error("Invalid base64 body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Undecodable image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}
