//! Member payload record and its fixed-layout bitstream codec.
//!
//! The wire format is bit-exact, MSB-first within each field:
//!
//! ```text
//! [length header: 32 bits]   payload bit length, header excluded
//! [version:        8 bits]
//! [tier:           8 bits]
//! [member_id len: 32 bits]   byte count
//! [member_id:   N*8 bits]    raw bytes
//! [token:         32 bits]   integrity token
//! ```
//!
//! Decoding reads the header first to learn the exact payload length, reads
//! exactly that many further bits, and ignores anything beyond; the carrier
//! may be arbitrarily larger than the payload. Unknown versions fail closed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bits::{BitWriter, Bitstream};
use crate::error::{
    Result, SigilError, MAX_MEMBER_ID_BYTES, PAYLOAD_LEN_BITS, SUPPORTED_PAYLOAD_VERSIONS,
    TOKEN_BITS,
};
use crate::integrity::{self, TokenKeyProvider};

/// Fixed field widths, header excluded: version + tier + id length + token.
pub(crate) const FIXED_FIELD_BITS: u64 = 8 + 8 + 32 + TOKEN_BITS;

/// The authenticated member record carried inside a sigil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPayload {
    /// Payload format version.
    pub version: u8,
    /// Membership tier (see [`Tier`] for the canonical names).
    pub tier: u8,
    /// Member identifier, raw bytes.
    pub member_id: Vec<u8>,
    /// Integrity token over the preceding fields.
    pub token: u32,
}

impl MemberPayload {
    /// Build a payload and compute its integrity token with the given key.
    ///
    /// Fails with [`SigilError::MalformedPayload`] if the member id is empty
    /// or longer than [`MAX_MEMBER_ID_BYTES`].
    pub fn new<K: TokenKeyProvider>(
        version: u8,
        tier: u8,
        member_id: Vec<u8>,
        key: &K,
    ) -> Result<Self> {
        validate_member_id(&member_id)?;
        let token = integrity::token(key, version, tier, &member_id);
        Ok(Self {
            version,
            tier,
            member_id,
            token,
        })
    }

    /// The member id as UTF-8, if it is valid UTF-8.
    pub fn member_id_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.member_id).ok()
    }

    /// Payload bit length on the wire, excluding the length header.
    pub fn encoded_bits(&self) -> u64 {
        FIXED_FIELD_BITS + self.member_id.len() as u64 * 8
    }
}

fn validate_member_id(member_id: &[u8]) -> Result<()> {
    if member_id.is_empty() {
        return Err(SigilError::MalformedPayload("member id is empty".into()));
    }
    if member_id.len() > MAX_MEMBER_ID_BYTES {
        return Err(SigilError::MalformedPayload(format!(
            "member id is {} bytes, maximum is {MAX_MEMBER_ID_BYTES}",
            member_id.len()
        )));
    }
    Ok(())
}

/// Canonical membership tiers and their wire values.
///
/// The codec itself treats tier as an opaque byte; these names exist for
/// presentation. Unknown numeric tiers round-trip untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Kids,
    Standard,
    Premium,
}

impl Tier {
    pub fn wire_value(self) -> u8 {
        match self {
            Self::Kids => 1,
            Self::Standard => 2,
            Self::Premium => 3,
        }
    }

    /// The tier for a wire value, if it is one of the canonical tiers.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Kids),
            2 => Some(Self::Standard),
            3 => Some(Self::Premium),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kids => write!(f, "Kids"),
            Self::Standard => write!(f, "Standard"),
            Self::Premium => write!(f, "Premium"),
        }
    }
}

impl FromStr for Tier {
    type Err = SigilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "kids" => Ok(Self::Kids),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(SigilError::MalformedPayload(format!(
                "unknown tier name: {other}"
            ))),
        }
    }
}

/// Serialize a payload to its wire bitstream, header included.
///
/// `capacity_bits` is the carrier's capacity; encoding fails with
/// [`SigilError::InsufficientCapacity`] if header + payload would not fit.
pub fn encode(payload: &MemberPayload, capacity_bits: u64) -> Result<Bitstream> {
    validate_member_id(&payload.member_id)?;

    let payload_bits = payload.encoded_bits();
    let total_bits = PAYLOAD_LEN_BITS + payload_bits;
    if total_bits > capacity_bits {
        return Err(SigilError::InsufficientCapacity {
            needed: total_bits,
            capacity: capacity_bits,
        });
    }

    let mut w = BitWriter::new();
    w.write_bits(payload_bits as u32, PAYLOAD_LEN_BITS as u8);
    w.write_bits(payload.version as u32, 8);
    w.write_bits(payload.tier as u32, 8);
    w.write_bits(payload.member_id.len() as u32, 32);
    w.write_bytes(&payload.member_id);
    w.write_bits(payload.token, TOKEN_BITS as u8);

    let stream = w.finish();
    debug_assert_eq!(stream.len_bits(), total_bits);
    Ok(stream)
}

/// Deserialize a payload from a carrier bitstream.
///
/// Reads the length header, then exactly that many bits; any remaining
/// carrier bits are ignored. Fails with [`SigilError::TruncatedPayload`] if
/// the carrier is shorter than the header declares, with
/// [`SigilError::UnsupportedVersion`] for an unknown version byte, and with
/// [`SigilError::MalformedPayload`] if the declared length is inconsistent
/// with the member id length field.
pub fn decode(stream: &Bitstream) -> Result<MemberPayload> {
    let mut r = stream.reader();

    if r.remaining() < PAYLOAD_LEN_BITS {
        return Err(SigilError::TruncatedPayload {
            declared: PAYLOAD_LEN_BITS,
            available: r.remaining(),
        });
    }
    let declared = r.read_bits(PAYLOAD_LEN_BITS as u8)? as u64;
    if r.remaining() < declared {
        return Err(SigilError::TruncatedPayload {
            declared,
            available: r.remaining(),
        });
    }

    let version = r.read_bits(8)? as u8;
    if !SUPPORTED_PAYLOAD_VERSIONS.contains(&version) {
        return Err(SigilError::UnsupportedVersion(version));
    }

    let tier = r.read_bits(8)? as u8;
    let id_len = r.read_bits(32)? as usize;

    if id_len > MAX_MEMBER_ID_BYTES {
        return Err(SigilError::MalformedPayload(format!(
            "member id length {id_len} exceeds maximum {MAX_MEMBER_ID_BYTES}"
        )));
    }
    if declared != FIXED_FIELD_BITS + id_len as u64 * 8 {
        return Err(SigilError::MalformedPayload(format!(
            "declared length {declared} does not match member id length {id_len}"
        )));
    }

    let member_id = r.read_bytes(id_len)?;
    let token = r.read_bits(TOKEN_BITS as u8)?;

    Ok(MemberPayload {
        version,
        tier,
        member_id,
        token,
    })
}
