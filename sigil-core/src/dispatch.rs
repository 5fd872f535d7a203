//! Concurrency dispatch for the synchronous core.
//!
//! Every core operation is CPU-bound, pure with respect to its inputs, and
//! free of shared mutable state, so concurrent issuance and scan requests
//! need no locking, just a worker thread each. These adapters offload the
//! synchronous calls onto Tokio's blocking pool and nothing more; all logic
//! stays in the core, never duplicated here.

use std::sync::Arc;

use crate::card::{DecodedResult, SealPlacement};
use crate::error::Result;
use crate::integrity::TokenKeyProvider;
use crate::issue::{CardIssuer, IssueRequest};
use crate::stego::EmbedConfig;

/// Issue a card on the blocking pool, returning the PNG byte buffer.
pub async fn issue_card<K>(
    issuer: Arc<CardIssuer>,
    request: IssueRequest,
    key: Arc<K>,
) -> Result<Vec<u8>>
where
    K: TokenKeyProvider + 'static,
{
    tokio::task::spawn_blocking(move || issuer.issue_png(&request, key.as_ref()))
        .await
        .expect("issuance task panicked")
}

/// Scan a card on the blocking pool.
pub async fn scan_card<K>(
    card_bytes: Vec<u8>,
    placement: SealPlacement,
    seal_dims: (u32, u32),
    config: EmbedConfig,
    key: Arc<K>,
) -> Result<DecodedResult>
where
    K: TokenKeyProvider + 'static,
{
    tokio::task::spawn_blocking(move || {
        crate::card::scan_card(&card_bytes, placement, seal_dims, &config, key.as_ref())
    })
    .await
    .expect("scan task panicked")
}
