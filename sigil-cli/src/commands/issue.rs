//! Issue command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use sigil_core::{
    dispatch, CardBase, CardIssuer, IssueRequest, SealPlacement, SealTemplate, TokenKeyProvider,
    UnkeyedToken,
};
use tracing::{debug, info};

use crate::utils;
use crate::ConfigArgs;

pub struct IssueArgs {
    pub member_id: String,
    pub tier: String,
    pub template: PathBuf,
    pub card: PathBuf,
    pub output: Option<PathBuf>,
    pub key: Option<String>,
    pub placement: SealPlacement,
    pub config: ConfigArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct IssueReport {
    member_id: String,
    tier: u8,
    tier_name: String,
    output: PathBuf,
    seal_width: u32,
    seal_height: u32,
    payload_bits: u64,
    capacity_bits: u64,
    issued_at: String,
}

/// Execute the issue command.
pub async fn execute(args: IssueArgs) -> Result<()> {
    let config = args.config.config()?;
    let tier = utils::parse_tier(&args.tier)?;

    let template_bytes = utils::read_file(&args.template, "seal template")?;
    let template = SealTemplate::from_bytes(&template_bytes)
        .context("Failed to decode seal template")?;
    info!(
        path = %args.template.display(),
        width = template.width(),
        height = template.height(),
        "Loaded seal template"
    );

    let card_bytes = utils::read_file(&args.card, "card image")?;
    let card = CardBase::from_bytes(&card_bytes).context("Failed to decode card image")?;
    info!(
        path = %args.card.display(),
        width = card.width(),
        height = card.height(),
        "Loaded card image"
    );

    let capacity_bits = template.capacity_bits(&config);
    let issuer = Arc::new(
        CardIssuer::new(template, card)
            .with_placement(args.placement)
            .with_config(config),
    );
    let request = IssueRequest::new(args.member_id.clone(), tier);
    let payload_bits = request.total_bits();
    debug!(payload_bits, capacity_bits, "Validated capacity");

    let png = match utils::decode_key(args.key.as_deref())? {
        Some(key) => issue_on_pool(issuer.clone(), request, key).await?,
        None => issue_on_pool(issuer.clone(), request, UnkeyedToken).await?,
    };

    let output = args.output.unwrap_or_else(|| utils::build_output_path(&args.card));
    std::fs::write(&output, &png)
        .with_context(|| format!("Failed to write composite card: {}", output.display()))?;
    info!(path = %output.display(), bytes = png.len(), "Composite card saved");

    let (seal_width, seal_height) = issuer.seal_dims();
    let report = IssueReport {
        member_id: args.member_id,
        tier,
        tier_name: utils::tier_name(tier),
        output: output.clone(),
        seal_width,
        seal_height,
        payload_bits,
        capacity_bits,
        issued_at: Utc::now().to_rfc3339(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.quiet {
        println!();
        println!("{}", "Card issued with embedded member record".green().bold());
        println!();
        println!("   {} {}", "Member:".dimmed(), report.member_id);
        println!("   {} {}", "Tier:".dimmed(), report.tier_name);
        println!("   {} {}", "Card saved:".dimmed(), output.display());
        println!(
            "   {} {} / {} bits",
            "Payload:".dimmed(),
            report.payload_bits,
            report.capacity_bits
        );
    }

    Ok(())
}

async fn issue_on_pool<K>(issuer: Arc<CardIssuer>, request: IssueRequest, key: K) -> Result<Vec<u8>>
where
    K: TokenKeyProvider + 'static,
{
    dispatch::issue_card(issuer, request, Arc::new(key))
        .await
        .context("Failed to issue card")
}
