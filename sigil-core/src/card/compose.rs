//! Pastes an embedded seal onto a base card.
//!
//! Within the seal's bounding box every channel is copied verbatim: no
//! alpha blending, no resampling. Blending would rewrite the low-order
//! carrier bits and silently destroy the payload, so sigil artwork is
//! authored opaque and composites as an opaque rectangle.

use tracing::debug;

use crate::card::{seal_origin, CardBase, CompositeCard, SealPlacement};
use crate::error::{Result, SigilError};
use crate::stego::EmbeddedSeal;

/// Composite `seal` onto `card` at the placement's anchor corner.
///
/// Fails with [`SigilError::SealOutOfBounds`] if anchor + padding + seal
/// dimensions exceed the card.
pub fn compose(
    card: &CardBase,
    seal: &EmbeddedSeal,
    placement: SealPlacement,
) -> Result<CompositeCard> {
    let (x0, y0) = seal_origin(
        card.width(),
        card.height(),
        seal.width(),
        seal.height(),
        placement,
    )
    .ok_or(SigilError::SealOutOfBounds {
        card_w: card.width(),
        card_h: card.height(),
        seal_w: seal.width(),
        seal_h: seal.height(),
        padding: placement.padding,
    })?;

    debug!(
        x0,
        y0,
        anchor = ?placement.anchor,
        padding = placement.padding,
        "compositing seal onto card"
    );

    let mut pixels = card.pixels().clone();
    for (x, y, pixel) in seal.pixels().enumerate_pixels() {
        pixels.put_pixel(x0 + x, y0 + y, *pixel);
    }

    Ok(CompositeCard { pixels })
}
