//! Capacity command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use sigil_core::{SealTemplate, MAX_MEMBER_ID_BYTES, PAYLOAD_LEN_BITS, TOKEN_BITS};
use tracing::info;

use crate::utils;
use crate::ConfigArgs;

/// Fixed payload overhead besides the member id: version, tier, id length,
/// and the integrity token.
const FIXED_PAYLOAD_BITS: u64 = 8 + 8 + 32 + TOKEN_BITS;

#[derive(Serialize)]
struct CapacityReport {
    width: u32,
    height: u32,
    channels_used: u8,
    bits_per_channel: u8,
    capacity_bits: u64,
    max_payload_bits: u64,
    max_member_id_bytes: u64,
}

/// Execute the capacity command.
pub fn execute(template_path: PathBuf, config_args: ConfigArgs, json: bool) -> Result<()> {
    let config = config_args.config()?;
    let bytes = utils::read_file(&template_path, "seal template")?;
    let template = SealTemplate::from_bytes(&bytes).context("Failed to decode seal template")?;

    let capacity_bits = template.capacity_bits(&config);
    let max_payload_bits = template.max_payload_bits(&config);
    // Ids are whole bytes; a trailing partial byte of capacity is unusable.
    let max_member_id_bytes = (max_payload_bits.saturating_sub(FIXED_PAYLOAD_BITS) / 8)
        .min(MAX_MEMBER_ID_BYTES as u64);

    info!(
        path = %template_path.display(),
        capacity_bits,
        max_payload_bits,
        "Computed template capacity"
    );

    let report = CapacityReport {
        width: template.width(),
        height: template.height(),
        channels_used: config.channels_used,
        bits_per_channel: config.bits_per_channel,
        capacity_bits,
        max_payload_bits,
        max_member_id_bytes,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{}", "Template capacity".green().bold());
        println!();
        println!(
            "   {} {}x{} pixels",
            "Template:".dimmed(),
            report.width,
            report.height
        );
        println!(
            "   {} {} channels x {} bits",
            "Carrier:".dimmed(),
            report.channels_used,
            report.bits_per_channel
        );
        println!("   {} {} bits", "Capacity:".dimmed(), report.capacity_bits);
        println!(
            "   {} {} bits",
            "Max payload:".dimmed(),
            report.max_payload_bits
        );
        println!(
            "   {} {} bytes",
            "Max member id:".dimmed(),
            report.max_member_id_bytes
        );
        println!(
            "   {} {} bits",
            "Length header:".dimmed(),
            PAYLOAD_LEN_BITS
        );
    }

    Ok(())
}
