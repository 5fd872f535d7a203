//! Card issuance: the generation path from member record to composite card.
//!
//! Runs capacity validation, payload encoding, embedding, and compositing
//! in one call. This is the interface consumed by external issuance
//! workflows.
//! Capacity and bounds failures surface before any artifact is produced, so
//! callers can treat them as request-time validation.

use tracing::info;

use crate::card::{compose, CardBase, CompositeCard, SealPlacement};
use crate::error::{Result, CURRENT_PAYLOAD_VERSION};
use crate::integrity::TokenKeyProvider;
use crate::payload::{self, MemberPayload};
use crate::stego::{embed, EmbedConfig, SealTemplate};

/// One issuance request: the member record to seal into a card.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub member_id: Vec<u8>,
    pub tier: u8,
    pub version: u8,
}

impl IssueRequest {
    /// A request at the current payload version.
    pub fn new(member_id: impl Into<Vec<u8>>, tier: u8) -> Self {
        Self {
            member_id: member_id.into(),
            tier,
            version: CURRENT_PAYLOAD_VERSION,
        }
    }

    /// Wire size of this record's bitstream, length header included.
    ///
    /// Lets issuance workflows validate fit against a template's capacity
    /// before committing resources.
    pub fn total_bits(&self) -> u64 {
        crate::error::PAYLOAD_LEN_BITS + payload::FIXED_FIELD_BITS + self.member_id.len() as u64 * 8
    }
}

/// Issues composite cards for one template + base-card pairing.
///
/// The template and card are loaded once and reused across requests; each
/// [`issue`](CardIssuer::issue) call is pure with respect to them and safe
/// to run concurrently with others.
pub struct CardIssuer {
    template: SealTemplate,
    card: CardBase,
    placement: SealPlacement,
    config: EmbedConfig,
}

impl CardIssuer {
    pub fn new(template: SealTemplate, card: CardBase) -> Self {
        Self {
            template,
            card,
            placement: SealPlacement::default(),
            config: EmbedConfig::default(),
        }
    }

    /// Override the default placement (bottom-left, no padding offset).
    pub fn with_placement(mut self, placement: SealPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Override the default embedding configuration (3 channels, 1 bit).
    pub fn with_config(mut self, config: EmbedConfig) -> Self {
        self.config = config;
        self
    }

    pub fn placement(&self) -> SealPlacement {
        self.placement
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Seal dimensions scans of issued cards must supply.
    pub fn seal_dims(&self) -> (u32, u32) {
        (self.template.width(), self.template.height())
    }

    /// Issue one composite card for `request`, tokenized with `key`.
    pub fn issue<K: TokenKeyProvider>(
        &self,
        request: &IssueRequest,
        key: &K,
    ) -> Result<CompositeCard> {
        let payload =
            MemberPayload::new(request.version, request.tier, request.member_id.clone(), key)?;
        let stream = payload::encode(&payload, self.template.capacity_bits(&self.config))?;
        let seal = embed(&self.template, &stream, &self.config)?;
        let composite = compose(&self.card, &seal, self.placement)?;

        info!(
            member_id = payload.member_id_str().unwrap_or("<binary>"),
            tier = payload.tier,
            bits = stream.len_bits(),
            "issued card"
        );
        Ok(composite)
    }

    /// Issue one card and return it as the persisted PNG byte buffer.
    pub fn issue_png<K: TokenKeyProvider>(&self, request: &IssueRequest, key: &K) -> Result<Vec<u8>> {
        self.issue(request, key)?.to_png()
    }
}
