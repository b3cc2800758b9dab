//! QR raster encoder.
//!
//! Turns a payload string into a square PNG. The module grid comes from the
//! `qrcode` crate; scaling and coloring happen here so the output is fully
//! determined by the payload and the options.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

use super::EncodingError;

/// Pixels per module used when the requested width is too small to fit the
/// symbol at one pixel per module.
const FALLBACK_SCALE: f64 = 4.0;

/// Error correction level of the generated symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl ErrorCorrection {
    fn ec_level(self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::Quartile => EcLevel::Q,
            Self::High => EcLevel::H,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "L",
            Self::Medium => "M",
            Self::Quartile => "Q",
            Self::High => "H",
        }
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. Alpha is accepted and dropped.
    pub fn from_hex(value: &str) -> Result<Self, EncodingError> {
        let invalid = || EncodingError::InvalidColor(value.to_string());
        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let doubled = format!("{c}{c}");
                    rgb[i] = channel(&doubled)?;
                }
                Ok(Rgb(rgb))
            }
            6 | 8 => Ok(Rgb([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),
            _ => Err(invalid()),
        }
    }

    /// ITU-R BT.601 luma, used when a grey value is needed.
    pub fn luma(self) -> u8 {
        let [r, g, b] = self.0;
        ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
    }
}

/// Dark and light module colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub dark: Rgb,
    pub light: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            dark: Rgb::BLACK,
            light: Rgb::WHITE,
        }
    }
}

impl Palette {
    /// Build a palette from optional hex strings, defaulting each side.
    pub fn from_hex(dark: Option<&str>, light: Option<&str>) -> Result<Self, EncodingError> {
        let defaults = Self::default();
        Ok(Self {
            dark: dark.map(Rgb::from_hex).transpose()?.unwrap_or(defaults.dark),
            light: light.map(Rgb::from_hex).transpose()?.unwrap_or(defaults.light),
        })
    }
}

/// Raster options for [`encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct CodeOptions {
    pub width_px: u32,
    pub margin_modules: u32,
    pub error_correction: ErrorCorrection,
    pub palette: Palette,
}

impl Default for CodeOptions {
    fn default() -> Self {
        Self::certificate()
    }
}

impl CodeOptions {
    /// Options for the code embedded in a certificate.
    pub fn certificate() -> Self {
        Self {
            width_px: 200,
            margin_modules: 2,
            error_correction: ErrorCorrection::default(),
            palette: Palette::default(),
        }
    }

    /// Options for the standalone code endpoint: larger, explicit palette.
    pub fn standalone() -> Self {
        Self {
            width_px: 300,
            margin_modules: 2,
            error_correction: ErrorCorrection::default(),
            palette: Palette {
                dark: Rgb([0x00, 0x00, 0x00]),
                light: Rgb([0xFF, 0xFF, 0xFF]),
            },
        }
    }
}

/// PNG-encoded code image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl CodeImage {
    /// Inline `data:` URL carrying the PNG.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }

    /// Decode the PNG back into tightly packed 8-bit RGB pixels.
    pub fn decode_rgb(&self) -> Result<Vec<u8>, EncodingError> {
        let mut decoder = png::Decoder::new(Cursor::new(self.png.as_slice()));
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        if info.bit_depth != png::BitDepth::Eight {
            return Err(EncodingError::UnsupportedRaster(format!(
                "bit depth {:?}",
                info.bit_depth
            )));
        }

        match info.color_type {
            png::ColorType::Rgb => Ok(buf),
            png::ColorType::Rgba => Ok(buf
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect()),
            png::ColorType::Grayscale => Ok(buf.iter().flat_map(|&g| [g, g, g]).collect()),
            png::ColorType::GrayscaleAlpha => Ok(buf
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0]])
                .collect()),
            other => Err(EncodingError::UnsupportedRaster(format!(
                "color type {:?}",
                other
            ))),
        }
    }
}

/// Encode `payload` as a QR code raster.
pub fn encode(payload: &str, opts: &CodeOptions) -> Result<CodeImage, EncodingError> {
    if payload.is_empty() {
        return Err(EncodingError::EmptyPayload);
    }
    if opts.width_px == 0 {
        return Err(EncodingError::InvalidWidth(opts.width_px));
    }

    let code = QrCode::with_error_correction_level(payload.as_bytes(), opts.error_correction.ec_level())
        .map_err(|e| match e {
            qrcode::types::QrError::DataTooLong => EncodingError::PayloadTooLong {
                len: payload.len(),
                level: opts.error_correction.as_str(),
            },
            other => EncodingError::Qr(other.to_string()),
        })?;

    let modules = code.width();
    let colors = code.to_colors();
    let (side, pixels) = rasterize(&colors, modules, opts);

    let png = encode_png(&pixels, side)?;
    Ok(CodeImage {
        width: side,
        height: side,
        png,
    })
}

/// Map the module grid onto a square RGB buffer.
fn rasterize(colors: &[Color], modules: usize, opts: &CodeOptions) -> (u32, Vec<u8>) {
    let total_modules = (modules + 2 * opts.margin_modules as usize) as f64;
    let scale = if opts.width_px as f64 >= total_modules {
        opts.width_px as f64 / total_modules
    } else {
        FALLBACK_SCALE
    };

    let side = (total_modules * scale).floor() as usize;
    let margin = opts.margin_modules as f64 * scale;
    let dark = opts.palette.dark.0;
    let light = opts.palette.light.0;

    let mut pixels = Vec::with_capacity(side * side * 3);
    for row in 0..side {
        for col in 0..side {
            let (r, c) = (row as f64, col as f64);
            let inside = r >= margin
                && c >= margin
                && r < side as f64 - margin
                && c < side as f64 - margin;

            let px = if inside {
                let src_row = (((r - margin) / scale).floor() as usize).min(modules - 1);
                let src_col = (((c - margin) / scale).floor() as usize).min(modules - 1);
                match colors[src_row * modules + src_col] {
                    Color::Dark => dark,
                    Color::Light => light,
                }
            } else {
                light
            };
            pixels.extend_from_slice(&px);
        }
    }

    (side as u32, pixels)
}

fn encode_png(pixels: &[u8], side: u32) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, side, side);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixels)?;
        writer.finish()?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_deterministic() {
        let opts = CodeOptions::certificate();
        let a = encode("http://localhost:5000/uploads/railway-item-1.pdf", &opts).unwrap();
        let b = encode("http://localhost:5000/uploads/railway-item-1.pdf", &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_respects_width() {
        let image = encode("http://example.com/x.pdf", &CodeOptions::standalone()).unwrap();
        assert_eq!(image.width, image.height);
        assert!(image.width <= 300 && image.width >= 290);
        assert!(image.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_small_width_falls_back_to_fixed_scale() {
        let opts = CodeOptions {
            width_px: 10,
            ..CodeOptions::certificate()
        };
        let image = encode("hello", &opts).unwrap();
        // version 1 symbol: 21 modules + 2 * 2 margin, 4 px each
        assert_eq!(image.width, 100);
    }

    #[test]
    fn test_payload_too_long_is_rejected() {
        let payload = "a".repeat(3000);
        let err = encode(&payload, &CodeOptions::certificate()).unwrap_err();
        assert!(matches!(err, EncodingError::PayloadTooLong { len: 3000, level: "M" }));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let err = encode("", &CodeOptions::certificate()).unwrap_err();
        assert!(matches!(err, EncodingError::EmptyPayload));
    }

    #[test]
    fn test_palette_is_applied() {
        let opts = CodeOptions {
            palette: Palette::from_hex(Some("#123456"), Some("#abcdef")).unwrap(),
            ..CodeOptions::certificate()
        };
        let image = encode("palette", &opts).unwrap();
        let rgb = image.decode_rgb().unwrap();
        // top-left pixel is quiet zone
        assert_eq!(&rgb[0..3], &[0xab, 0xcd, 0xef]);
        assert!(rgb.chunks_exact(3).any(|px| px == [0x12, 0x34, 0x56]));
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#fff").unwrap(), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("#000000FF").unwrap(), Rgb::BLACK);
        assert!(Rgb::from_hex("000000").is_err());
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gggggg").is_err());
    }

    #[test]
    fn test_data_url_prefix() {
        let image = encode("data-url", &CodeOptions::standalone()).unwrap();
        assert!(image.to_data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
