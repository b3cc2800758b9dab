//! QR code generation: the raster encoder and the standalone endpoint.

pub mod encoder;
pub mod handlers;
pub mod models;

pub use encoder::{encode, CodeImage, CodeOptions, ErrorCorrection, Palette, Rgb};

use thiserror::Error;

/// Errors that can occur while turning a payload into a code image.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("cannot encode an empty payload")]
    EmptyPayload,
    #[error("payload of {len} bytes exceeds QR capacity at error correction level {level}")]
    PayloadTooLong { len: usize, level: &'static str },
    #[error("invalid code width: {0}")]
    InvalidWidth(u32),
    #[error("invalid color '{0}', expected #RGB, #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
    #[error("QR encoding failed: {0}")]
    Qr(String),
    #[error("failed to encode PNG: {0}")]
    Png(#[from] png::EncodingError),
    #[error("failed to decode PNG: {0}")]
    PngDecode(#[from] png::DecodingError),
    #[error("unsupported raster: {0}")]
    UnsupportedRaster(String),
}
