//! Card-side pipeline: placing an embedded seal on a base card and locating
//! it again at scan time.
//!
//! Compositor and scanner share one placement computation: the anchor
//! corner plus padding resolve to the seal's top-left pixel through
//! [`seal_origin`], and both sides call it.

pub mod compose;
pub mod scan;

pub use compose::compose;
pub use scan::{scan, scan_card, DecodedResult};

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stego::{decode_rgba, encode_png};

/// Corner of the card the seal is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
    ];
}

/// Placement contract shared by issuance and scanning: which corner the seal
/// sits in and how many pixels of padding separate it from the card edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SealPlacement {
    pub anchor: Anchor,
    pub padding: u32,
}

impl SealPlacement {
    pub fn new(anchor: Anchor, padding: u32) -> Self {
        Self { anchor, padding }
    }
}

/// Top-left pixel of a `seal_w` x `seal_h` seal placed on a
/// `card_w` x `card_h` card, or `None` if anchor + padding + seal dimensions
/// do not fit on the card.
pub fn seal_origin(
    card_w: u32,
    card_h: u32,
    seal_w: u32,
    seal_h: u32,
    placement: SealPlacement,
) -> Option<(u32, u32)> {
    let pad = placement.padding;
    let fits = seal_w > 0
        && seal_h > 0
        && pad.checked_add(seal_w).is_some_and(|edge| edge <= card_w)
        && pad.checked_add(seal_h).is_some_and(|edge| edge <= card_h);
    if !fits {
        return None;
    }
    let x = match placement.anchor {
        Anchor::TopLeft | Anchor::BottomLeft => pad,
        Anchor::TopRight | Anchor::BottomRight => card_w - pad - seal_w,
    };
    let y = match placement.anchor {
        Anchor::TopLeft | Anchor::TopRight => pad,
        Anchor::BottomLeft | Anchor::BottomRight => card_h - pad - seal_h,
    };
    Some((x, y))
}

/// The base card artwork. Loaded once, treated as immutable.
#[derive(Debug, Clone)]
pub struct CardBase {
    pixels: RgbaImage,
}

impl CardBase {
    /// Load base artwork from lossless image bytes (PNG).
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
}

/// The final artifact: a card with an embedded seal composited at its
/// anchor. The only entity persisted long-term, always as lossless PNG.
#[derive(Debug, Clone)]
pub struct CompositeCard {
    pub(crate) pixels: RgbaImage,
}

impl CompositeCard {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// The card as lossless PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.pixels)
    }
}
