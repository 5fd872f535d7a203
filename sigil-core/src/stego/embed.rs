//! Writes a payload bitstream into a seal template's pixels.
//!
//! Bit-order contract, mirrored exactly by [`extract`](super::extract):
//! pixels in row-major order; within each pixel the leading
//! `channels_used` channels in index order (alpha is never a carrier); per
//! channel the lowest `bits_per_channel` bits are cleared and set to the
//! next stream bits, most significant first. Once the stream is exhausted,
//! every remaining low-order bit keeps its original value; extraction
//! stops at the length the header declares and never looks at them.

use tracing::debug;

use crate::bits::Bitstream;
use crate::error::{Result, SigilError};
use crate::stego::{EmbedConfig, EmbeddedSeal, SealTemplate};

/// Embed `stream` (header + payload) into a copy of `template`.
///
/// The capacity check duplicates the one the payload codec already ran; a
/// stream produced by other means still may not exceed the carrier.
pub fn embed(
    template: &SealTemplate,
    stream: &Bitstream,
    config: &EmbedConfig,
) -> Result<EmbeddedSeal> {
    let capacity = template.capacity_bits(config);
    if stream.len_bits() > capacity {
        return Err(SigilError::InsufficientCapacity {
            needed: stream.len_bits(),
            capacity,
        });
    }

    debug!(
        bits = stream.len_bits(),
        capacity,
        width = template.width(),
        height = template.height(),
        "embedding payload bitstream"
    );

    let mut pixels = template.pixels().clone();
    let bpc = config.bits_per_channel;
    let mask: u8 = (1u16 << bpc).wrapping_sub(1) as u8;

    let mut reader = stream.reader();
    'pixels: for pixel in pixels.pixels_mut() {
        for channel in 0..config.channels_used as usize {
            let remaining = reader.remaining();
            if remaining == 0 {
                break 'pixels;
            }
            let take = (bpc as u64).min(remaining) as u8;
            let chunk = reader.read_bits(take)? as u8;
            // A partial final chunk occupies the top of the cleared group.
            let value = chunk << (bpc - take);
            pixel.0[channel] = (pixel.0[channel] & !mask) | value;
        }
    }

    Ok(EmbeddedSeal { pixels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitWriter;
    use image::{Rgba, RgbaImage};

    fn template(width: u32, height: u32, fill: [u8; 4]) -> SealTemplate {
        SealTemplate::from_image(RgbaImage::from_pixel(width, height, Rgba(fill)))
    }

    fn stream_of(bits: &[u8]) -> Bitstream {
        let mut w = BitWriter::new();
        for &b in bits {
            w.write_bits(b as u32, 1);
        }
        w.finish()
    }

    #[test]
    fn writes_row_major_channel_order() {
        let tpl = template(2, 1, [0xFF; 4]);
        let config = EmbedConfig::default();
        // Six bits: fills R,G,B of pixel (0,0) then pixel (1,0).
        let seal = embed(&tpl, &stream_of(&[1, 0, 1, 0, 1, 0]), &config).unwrap();

        assert_eq!(seal.pixels().get_pixel(0, 0).0, [0xFF, 0xFE, 0xFF, 0xFF]);
        assert_eq!(seal.pixels().get_pixel(1, 0).0, [0xFE, 0xFF, 0xFE, 0xFF]);
    }

    #[test]
    fn alpha_channel_untouched() {
        let tpl = template(4, 4, [0x00, 0x00, 0x00, 0x7F]);
        let config = EmbedConfig::default();
        let seal = embed(&tpl, &stream_of(&[1; 48]), &config).unwrap();
        for pixel in seal.pixels().pixels() {
            assert_eq!(pixel.0[3], 0x7F);
        }
    }

    #[test]
    fn bits_beyond_stream_keep_original_values() {
        let tpl = template(4, 1, [0b1010_1011; 4]);
        let config = EmbedConfig::default();
        // Two bits only; the remaining ten carrier slots stay untouched.
        let seal = embed(&tpl, &stream_of(&[0, 0]), &config).unwrap();

        assert_eq!(seal.pixels().get_pixel(0, 0).0[0], 0b1010_1010);
        assert_eq!(seal.pixels().get_pixel(0, 0).0[1], 0b1010_1010);
        assert_eq!(seal.pixels().get_pixel(0, 0).0[2], 0b1010_1011);
        assert_eq!(*seal.pixels().get_pixel(1, 0), *tpl.pixels().get_pixel(1, 0));
    }

    #[test]
    fn multi_bit_chunks_are_msb_first() {
        let tpl = template(1, 1, [0x00; 4]);
        let config = EmbedConfig::new(1, 4).unwrap();
        let mut w = BitWriter::new();
        w.write_bits(0b1011, 4);
        let seal = embed(&tpl, &w.finish(), &config).unwrap();
        assert_eq!(seal.pixels().get_pixel(0, 0).0[0], 0b0000_1011);
    }

    #[test]
    fn partial_final_chunk_sits_in_top_bits() {
        let tpl = template(1, 1, [0b1111_1111; 4]);
        let config = EmbedConfig::new(1, 4).unwrap();
        // Two bits into a 4-bit group: group cleared, bits at the top.
        let seal = embed(&tpl, &stream_of(&[1, 0]), &config).unwrap();
        assert_eq!(seal.pixels().get_pixel(0, 0).0[0], 0b1111_1000);
    }

    #[test]
    fn oversized_stream_rejected() {
        let tpl = template(2, 2, [0x00; 4]);
        let config = EmbedConfig::default(); // 12 bits capacity
        let result = embed(&tpl, &stream_of(&[1; 13]), &config);
        assert!(matches!(
            result,
            Err(SigilError::InsufficientCapacity {
                needed: 13,
                capacity: 12
            })
        ));
    }

    #[test]
    fn template_is_not_mutated() {
        let tpl = template(2, 2, [0xFF; 4]);
        let config = EmbedConfig::default();
        let _ = embed(&tpl, &stream_of(&[0; 12]), &config).unwrap();
        for pixel in tpl.pixels().pixels() {
            assert_eq!(pixel.0, [0xFF; 4]);
        }
    }
}
