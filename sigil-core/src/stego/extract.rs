//! Reads a payload bitstream back out of a seal region.
//!
//! Inverse walk of [`embed`](super::embed): the same row-major pixel order,
//! the same channel subset, the same MSB-first chunks. The length header is
//! read first; extraction then reads exactly the declared number of payload
//! bits and stops. Pixels and channels past that point are never inspected,
//! which makes extraction indifferent to noise or untouched template bits in
//! the rest of the region.

use image::RgbaImage;
use tracing::debug;

use crate::bits::{BitWriter, Bitstream};
use crate::error::{Result, SigilError, PAYLOAD_LEN_BITS};
use crate::stego::EmbedConfig;

/// Sequential bit source over a seal region's carrier bits.
struct CarrierBits<'a> {
    region: &'a RgbaImage,
    config: &'a EmbedConfig,
    pixel: usize,
    channel: u8,
    bit: u8,
}

impl<'a> CarrierBits<'a> {
    fn new(region: &'a RgbaImage, config: &'a EmbedConfig) -> Self {
        Self {
            region,
            config,
            pixel: 0,
            channel: 0,
            bit: 0,
        }
    }

    fn next_bit(&mut self) -> Option<u8> {
        let pixel_count = (self.region.width() * self.region.height()) as usize;
        if self.pixel >= pixel_count {
            return None;
        }
        let x = (self.pixel as u32) % self.region.width();
        let y = (self.pixel as u32) / self.region.width();
        let byte = self.region.get_pixel(x, y).0[self.channel as usize];
        let bpc = self.config.bits_per_channel;
        let bit = (byte >> (bpc - 1 - self.bit)) & 1;

        self.bit += 1;
        if self.bit == bpc {
            self.bit = 0;
            self.channel += 1;
            if self.channel == self.config.channels_used {
                self.channel = 0;
                self.pixel += 1;
            }
        }
        Some(bit)
    }

    fn read_bits(&mut self, count: u8) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.next_bit()? as u32;
        }
        Some(value)
    }
}

/// Extract the embedded bitstream (header + payload) from a seal region.
///
/// Fails with [`SigilError::TruncatedPayload`] if the region is too small to
/// hold the length header, or smaller than the payload the header declares.
pub fn extract(region: &RgbaImage, config: &EmbedConfig) -> Result<Bitstream> {
    let capacity = config.capacity_bits(region.width(), region.height());
    if capacity < PAYLOAD_LEN_BITS {
        return Err(SigilError::TruncatedPayload {
            declared: PAYLOAD_LEN_BITS,
            available: capacity,
        });
    }

    let mut source = CarrierBits::new(region, config);
    let declared = source
        .read_bits(PAYLOAD_LEN_BITS as u8)
        .ok_or(SigilError::TruncatedPayload {
            declared: PAYLOAD_LEN_BITS,
            available: capacity,
        })? as u64;

    if declared > capacity - PAYLOAD_LEN_BITS {
        return Err(SigilError::TruncatedPayload {
            declared,
            available: capacity - PAYLOAD_LEN_BITS,
        });
    }

    debug!(
        declared,
        capacity,
        width = region.width(),
        height = region.height(),
        "extracting payload bitstream"
    );

    let mut writer = BitWriter::new();
    writer.write_bits(declared as u32, PAYLOAD_LEN_BITS as u8);
    let mut left = declared;
    while left > 0 {
        let take = left.min(32) as u8;
        let value = source.read_bits(take).ok_or(SigilError::TruncatedPayload {
            declared,
            available: declared - left,
        })?;
        writer.write_bits(value, take);
        left -= take as u64;
    }

    Ok(writer.finish())
}
