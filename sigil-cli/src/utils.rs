//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sigil_core::{SecretTokenKey, Tier};

/// Parse a tier given as a canonical name or a raw numeric value.
pub fn parse_tier(input: &str) -> Result<u8> {
    if let Ok(tier) = input.parse::<Tier>() {
        return Ok(tier.wire_value());
    }
    input
        .parse::<u8>()
        .with_context(|| format!("unknown tier: {input} (expected Kids, Standard, Premium, or 0-255)"))
}

/// Display name for a tier wire value.
pub fn tier_name(value: u8) -> String {
    match Tier::from_wire(value) {
        Some(tier) => tier.to_string(),
        None => format!("tier {value}"),
    }
}

/// Decode an optional hex key argument into a token key.
pub fn decode_key(key_hex: Option<&str>) -> Result<Option<SecretTokenKey>> {
    match key_hex {
        None => Ok(None),
        Some(hex_str) => {
            let bytes = hex::decode(hex_str).context("key is not valid hex")?;
            Ok(Some(SecretTokenKey::new(bytes)))
        }
    }
}

/// Build the sealed-card output path from the base card path.
///
/// Transforms `card.png` into `card.sealed.png`.
pub fn build_output_path(card: &Path) -> PathBuf {
    card.with_extension("sealed.png")
}

/// Read a file with path context in the error.
pub fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {what}: {}", path.display()))
}
