//! Steganographic embedding substrate: capacity planning, the raster types
//! the codec reads and writes, and the symmetric embed/extract pair.
//!
//! Payload bits live in the low-order bits of selected pixel channels, so
//! they only survive lossless image handling. Anything lossy between
//! embedding and scanning (JPEG recompression, resampling) destroys the
//! payload; that is a system-level contract, not something this module can
//! detect beyond the integrity token mismatch it causes.

pub mod embed;
pub mod extract;

pub use embed::embed;
pub use extract::extract;

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SigilError, PAYLOAD_LEN_BITS};

/// Channels of an RGBA pixel that may carry payload bits. Alpha never does.
const MAX_CARRIER_CHANNELS: u8 = 3;

/// Embedding configuration: which channels carry bits, and how many per
/// channel.
///
/// Both sides of the channel must use the same configuration; it is not
/// recoverable from the image itself. The defaults (3 channels, 1 bit each)
/// keep the sigil visually indistinguishable from its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Number of leading channels used per pixel (1–3: R, RG, or RGB).
    pub channels_used: u8,
    /// Low-order bits written per selected channel (1–8).
    pub bits_per_channel: u8,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            channels_used: 3,
            bits_per_channel: 1,
        }
    }
}

impl EmbedConfig {
    /// Validate a configuration.
    pub fn new(channels_used: u8, bits_per_channel: u8) -> Result<Self> {
        if channels_used == 0 || channels_used > MAX_CARRIER_CHANNELS {
            return Err(SigilError::UnsupportedImageFormat(format!(
                "channels_used must be 1-{MAX_CARRIER_CHANNELS}, got {channels_used}"
            )));
        }
        if bits_per_channel == 0 || bits_per_channel > 8 {
            return Err(SigilError::UnsupportedImageFormat(format!(
                "bits_per_channel must be 1-8, got {bits_per_channel}"
            )));
        }
        Ok(Self {
            channels_used,
            bits_per_channel,
        })
    }

    /// Total payload bits a `width` x `height` carrier holds under this
    /// configuration, length header included.
    pub fn capacity_bits(&self, width: u32, height: u32) -> u64 {
        width as u64 * height as u64 * self.channels_used as u64 * self.bits_per_channel as u64
    }

    /// Capacity left for the payload itself once the length header is
    /// accounted for.
    pub fn max_payload_bits(&self, width: u32, height: u32) -> u64 {
        self.capacity_bits(width, height)
            .saturating_sub(PAYLOAD_LEN_BITS)
    }
}

/// Decode image bytes into an 8-bit RGBA buffer.
///
/// Accepts 8-bit RGB and RGBA sources; anything else (16-bit, grayscale,
/// palette expansions the decoder reports differently) is rejected rather
/// than silently converted, because channel depth conversions rewrite the
/// low-order bits the payload lives in.
pub(crate) fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| SigilError::UnsupportedImageFormat(e.to_string()))?;
    match decoded {
        DynamicImage::ImageRgba8(img) => Ok(img),
        DynamicImage::ImageRgb8(img) => Ok(DynamicImage::ImageRgb8(img).to_rgba8()),
        other => Err(SigilError::UnsupportedImageFormat(format!(
            "expected 8-bit RGB or RGBA pixels, got {:?}",
            other.color()
        ))),
    }
}

/// Encode an RGBA buffer as lossless PNG bytes.
pub(crate) fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    DynamicImage::ImageRgba8(img.clone())
        .write_with_encoder(encoder)
        .map_err(|e| SigilError::UnsupportedImageFormat(e.to_string()))?;
    Ok(bytes)
}

/// The emblem image used as the embedding substrate. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct SealTemplate {
    pixels: RgbaImage,
}

impl SealTemplate {
    /// Load a template from lossless image bytes (PNG).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            pixels: decode_rgba(bytes)?,
        })
    }

    /// Wrap an existing RGBA buffer.
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Carrier capacity of this template under `config`, header included.
    pub fn capacity_bits(&self, config: &EmbedConfig) -> u64 {
        config.capacity_bits(self.width(), self.height())
    }

    /// Payload capacity of this template under `config`, header excluded.
    pub fn max_payload_bits(&self, config: &EmbedConfig) -> u64 {
        config.max_payload_bits(self.width(), self.height())
    }
}

/// A template whose pixels carry exactly one payload's bits.
///
/// No side metadata: the payload is recoverable from the pixels plus the
/// embedding configuration alone.
#[derive(Debug, Clone)]
pub struct EmbeddedSeal {
    pub(crate) pixels: RgbaImage,
}

impl EmbeddedSeal {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The seal as lossless PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_geometry() {
        // 64x64, 3 channels, 1 bit per channel.
        let config = EmbedConfig::default();
        assert_eq!(config.capacity_bits(64, 64), 12_288);
        assert_eq!(config.max_payload_bits(64, 64), 12_256);
    }

    #[test]
    fn capacity_scales_with_configuration() {
        let config = EmbedConfig::new(2, 4).unwrap();
        assert_eq!(config.capacity_bits(10, 10), 10 * 10 * 2 * 4);
    }

    #[test]
    fn max_payload_saturates_for_tiny_templates() {
        let config = EmbedConfig::default();
        // 3x3 at 3 channels x 1 bit = 27 bits, less than the 32-bit header.
        assert_eq!(config.max_payload_bits(3, 3), 0);
    }

    #[test]
    fn config_bounds_enforced() {
        assert!(EmbedConfig::new(0, 1).is_err());
        assert!(EmbedConfig::new(4, 1).is_err());
        assert!(EmbedConfig::new(3, 0).is_err());
        assert!(EmbedConfig::new(3, 9).is_err());
        assert!(EmbedConfig::new(1, 8).is_ok());
    }

    #[test]
    fn png_roundtrip_preserves_pixels() {
        let mut img = RgbaImage::new(4, 4);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = image::Rgba([x as u8 * 17, y as u8 * 31, 0xA5, 0xFF]);
        }
        let png = encode_png(&img).unwrap();
        let back = decode_rgba(&png).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn garbage_bytes_rejected() {
        assert!(matches!(
            SealTemplate::from_bytes(&[0x00, 0x01, 0x02]),
            Err(SigilError::UnsupportedImageFormat(_))
        ));
    }
}
