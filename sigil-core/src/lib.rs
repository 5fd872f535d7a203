//! Sigil Core - steganographic membership-card sealing library
//!
//! This crate embeds a small authenticated member record (identifier, tier,
//! version, integrity token) invisibly inside the pixels of a card emblem
//! ("sigil"), composites that emblem onto a larger card image, and later
//! recovers and verifies the record from a lossless copy of the card.
//!
//! # Features
//!
//! - Bit-exact payload codec with a fixed, versioned wire layout
//! - Deterministic LSB embedding with a symmetric extraction walk
//! - Truncated SHA3-256 integrity token with explicit key providers
//! - Verbatim compositing that provably preserves carrier bits
//! - Optional Tokio dispatch layer for concurrent issuance and scanning
//!
//! The payload lives in low-order channel bits, so artifacts must stay in a
//! lossless raster format (PNG) end-to-end. Lossy recompression between
//! issuance and scanning destroys the payload.
//!
//! # Example
//!
//! ```no_run
//! use sigil_core::{
//!     Anchor, CardBase, CardIssuer, IssueRequest, SealPlacement, SealTemplate, Tier,
//!     UnkeyedToken, scan_card,
//! };
//!
//! # fn example() -> sigil_core::Result<()> {
//! let template = SealTemplate::from_bytes(&std::fs::read("sigil.png").unwrap())?;
//! let card = CardBase::from_bytes(&std::fs::read("card.png").unwrap())?;
//!
//! let issuer = CardIssuer::new(template, card)
//!     .with_placement(SealPlacement::new(Anchor::BottomLeft, 10));
//!
//! // Issue a card for a member (the PNG bytes are the persisted artifact).
//! let request = IssueRequest::new("M-00042", Tier::Standard.wire_value());
//! let png = issuer.issue_png(&request, &UnkeyedToken)?;
//!
//! // Later: recover and verify the record from a copy of the card.
//! let result = scan_card(
//!     &png,
//!     issuer.placement(),
//!     issuer.seal_dims(),
//!     issuer.config(),
//!     &UnkeyedToken,
//! )?;
//! assert!(result.valid);
//! # Ok(())
//! # }
//! ```

pub mod bits;
pub mod card;
pub mod error;
pub mod integrity;
pub mod issue;
pub mod payload;
pub mod stego;

#[cfg(feature = "dispatch")]
pub mod dispatch;

// Re-export main types for convenience
pub use card::{
    compose, scan, scan_card, Anchor, CardBase, CompositeCard, DecodedResult, SealPlacement,
};
pub use error::{
    Result, SigilError, CURRENT_PAYLOAD_VERSION, MAX_MEMBER_ID_BYTES, PAYLOAD_LEN_BITS,
    SUPPORTED_PAYLOAD_VERSIONS, TOKEN_BITS,
};
pub use integrity::{SecretTokenKey, TokenKeyProvider, UnkeyedToken};
pub use issue::{CardIssuer, IssueRequest};
pub use payload::{MemberPayload, Tier};
pub use stego::{embed, extract, EmbedConfig, EmbeddedSeal, SealTemplate};
