//! Locates the seal region on a card and drives extraction, decoding, and
//! integrity verification.
//!
//! The pipeline is linear: crop, extract, decode, verify. None of the
//! failures are transient, so nothing is retried. Structural failures (the
//! card cannot contain the expected seal region, or the image is not in a
//! representation the codec accepts) are returned as errors: the card was
//! not scanned correctly. Content failures (truncation, malformed or
//! unsupported payloads, integrity mismatch) are reported inside the
//! [`DecodedResult`]: the card is invalid or tampered.

use image::RgbaImage;
use tracing::{debug, info};

use crate::card::{seal_origin, SealPlacement};
use crate::error::{Result, SigilError};
use crate::integrity::{self, TokenKeyProvider};
use crate::payload::{self, MemberPayload};
use crate::stego::{decode_rgba, extract, EmbedConfig};

/// Outcome of scanning one card image. Recomputed fresh per scan, never
/// cached across images.
#[derive(Debug)]
pub struct DecodedResult {
    /// The decoded record, when decoding got far enough to produce one.
    /// Present even on an integrity mismatch so callers can log the fields.
    pub payload: Option<MemberPayload>,
    /// True only if a payload was decoded and its integrity token checks out.
    pub valid: bool,
    /// Why the card did not validate, when it did not.
    pub failure: Option<SigilError>,
}

impl DecodedResult {
    fn valid(payload: MemberPayload) -> Self {
        Self {
            payload: Some(payload),
            valid: true,
            failure: None,
        }
    }

    fn invalid(payload: Option<MemberPayload>, failure: SigilError) -> Self {
        Self {
            payload,
            valid: false,
            failure: Some(failure),
        }
    }

    /// Human-readable failure reason, when the card did not validate.
    pub fn failure_reason(&self) -> Option<String> {
        self.failure.as_ref().map(|e| e.to_string())
    }
}

/// Scan a card image already decoded to RGBA pixels.
///
/// `seal_dims` is the expected seal width and height; together with the
/// placement it determines the crop rectangle, computed by the same
/// [`seal_origin`] the compositor used. Fails with
/// [`SigilError::SealNotFound`] if the card cannot contain that rectangle.
pub fn scan<K: TokenKeyProvider>(
    card: &RgbaImage,
    placement: SealPlacement,
    seal_dims: (u32, u32),
    config: &EmbedConfig,
    key: &K,
) -> Result<DecodedResult> {
    let (seal_w, seal_h) = seal_dims;
    let (x0, y0) = seal_origin(card.width(), card.height(), seal_w, seal_h, placement).ok_or_else(
        || {
            SigilError::SealNotFound(format!(
                "{}x{} card cannot contain a {seal_w}x{seal_h} seal at padding {}",
                card.width(),
                card.height(),
                placement.padding
            ))
        },
    )?;

    debug!(x0, y0, seal_w, seal_h, "cropping seal region");
    let region = image::imageops::crop_imm(card, x0, y0, seal_w, seal_h).to_image();

    let stream = match extract(&region, config) {
        Ok(stream) => stream,
        Err(failure) => return Ok(DecodedResult::invalid(None, failure)),
    };

    let decoded = match payload::decode(&stream) {
        Ok(decoded) => decoded,
        Err(failure) => return Ok(DecodedResult::invalid(None, failure)),
    };

    match integrity::verify(key, &decoded) {
        Ok(()) => {
            info!(
                member_id = decoded.member_id_str().unwrap_or("<binary>"),
                tier = decoded.tier,
                version = decoded.version,
                "card validated"
            );
            Ok(DecodedResult::valid(decoded))
        }
        Err(failure) => Ok(DecodedResult::invalid(Some(decoded), failure)),
    }
}

/// Scan a card from raw image bytes, the entry point for external
/// validation workflows.
///
/// Fails with [`SigilError::UnsupportedImageFormat`] if the bytes do not
/// decode to 8-bit RGB(A) pixels.
pub fn scan_card<K: TokenKeyProvider>(
    card_bytes: &[u8],
    placement: SealPlacement,
    seal_dims: (u32, u32),
    config: &EmbedConfig,
    key: &K,
) -> Result<DecodedResult> {
    let card = decode_rgba(card_bytes)?;
    scan(&card, placement, seal_dims, config, key)
}
