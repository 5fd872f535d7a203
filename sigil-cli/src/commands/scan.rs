//! Scan command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use sigil_core::{
    dispatch, DecodedResult, EmbedConfig, SealPlacement, TokenKeyProvider, UnkeyedToken,
};
use tracing::{debug, info, warn};

use crate::utils;
use crate::ConfigArgs;

pub struct ScanArgs {
    pub card: PathBuf,
    pub seal_dims: (u32, u32),
    pub key: Option<String>,
    pub placement: SealPlacement,
    pub config: ConfigArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ScanReport {
    valid: bool,
    member_id: Option<String>,
    tier: Option<u8>,
    tier_name: Option<String>,
    version: Option<u8>,
    token: Option<String>,
    failure: Option<String>,
    scanned_at: String,
}

impl ScanReport {
    fn from_result(result: &DecodedResult) -> Self {
        let payload = result.payload.as_ref();
        Self {
            valid: result.valid,
            member_id: payload.and_then(|p| p.member_id_str().map(str::to_owned)),
            tier: payload.map(|p| p.tier),
            tier_name: payload.map(|p| utils::tier_name(p.tier)),
            version: payload.map(|p| p.version),
            token: payload.map(|p| hex::encode(p.token.to_be_bytes())),
            failure: result.failure_reason(),
            scanned_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Execute the scan command.
pub async fn execute(args: ScanArgs) -> Result<()> {
    let config = args.config.config()?;
    let card_bytes = utils::read_file(&args.card, "card image")?;
    info!(path = %args.card.display(), bytes = card_bytes.len(), "Read card");

    debug!(
        seal_w = args.seal_dims.0,
        seal_h = args.seal_dims.1,
        padding = args.placement.padding,
        "Scanning seal region"
    );

    let result = match utils::decode_key(args.key.as_deref())? {
        Some(key) => scan_on_pool(card_bytes, args.placement, args.seal_dims, config, key).await?,
        None => {
            scan_on_pool(card_bytes, args.placement, args.seal_dims, config, UnkeyedToken).await?
        }
    };

    let report = ScanReport::from_result(&result);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if result.valid {
        info!(
            member_id = report.member_id.as_deref().unwrap_or("<binary>"),
            tier = report.tier,
            "Card validated"
        );
        if !args.quiet && !args.json {
            println!();
            println!("{}", "╔════════════════════════════════════════╗".green());
            println!(
                "{}",
                "║                 VALID                  ║".green().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".green());
            println!();
            println!(
                "   {} {}",
                "Member:".dimmed(),
                report.member_id.as_deref().unwrap_or("<binary id>")
            );
            println!(
                "   {} {}",
                "Tier:".dimmed(),
                report.tier_name.as_deref().unwrap_or("-")
            );
            println!(
                "   {} {}",
                "Token:".dimmed(),
                report.token.as_deref().unwrap_or("-")
            );
        }
        Ok(())
    } else {
        let reason = report.failure.clone().unwrap_or_else(|| "unknown".into());
        warn!(%reason, "Card failed validation");
        if !args.quiet && !args.json {
            println!();
            println!("{}", "╔════════════════════════════════════════╗".red());
            println!(
                "{}",
                "║                INVALID                 ║".red().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".red());
            println!();
            println!("   {} {}", "Reason:".dimmed(), reason.red());
            if let Some(member_id) = report.member_id.as_deref() {
                println!("   {} {} {}", "Member:".dimmed(), member_id, "(unverified)".dimmed());
            }
        }
        bail!("card is invalid or tampered: {reason}")
    }
}

async fn scan_on_pool<K>(
    card_bytes: Vec<u8>,
    placement: SealPlacement,
    seal_dims: (u32, u32),
    config: EmbedConfig,
    key: K,
) -> Result<DecodedResult>
where
    K: TokenKeyProvider + 'static,
{
    dispatch::scan_card(card_bytes, placement, seal_dims, config, Arc::new(key))
        .await
        .context("Failed to scan card")
}
