use thiserror::Error;

/// Payload format version produced by this crate.
pub const CURRENT_PAYLOAD_VERSION: u8 = 1;

/// Payload format versions this crate can decode.
///
/// Unknown versions fail closed with [`SigilError::UnsupportedVersion`];
/// there is no best-effort parsing of layouts we do not know.
pub const SUPPORTED_PAYLOAD_VERSIONS: &[u8] = &[1];

/// Width of the payload length header, in bits.
pub const PAYLOAD_LEN_BITS: u64 = 32;

/// Width of the integrity token, in bits.
pub const TOKEN_BITS: u64 = 32;

/// Maximum member identifier length, in bytes.
pub const MAX_MEMBER_ID_BYTES: usize = 255;

#[derive(Error, Debug)]
pub enum SigilError {
    /// The encoded payload does not fit the carrier's capacity.
    #[error("insufficient capacity: payload needs {needed} bits, carrier holds {capacity}")]
    InsufficientCapacity { needed: u64, capacity: u64 },

    /// The member record violates the payload format (empty or oversized id).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The version byte is outside the supported set.
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u8),

    /// The carrier ends before the length the header declares.
    #[error("truncated payload: header declares {declared} bits, carrier holds {available}")]
    TruncatedPayload { declared: u64, available: u64 },

    /// The recomputed integrity token does not match the embedded one.
    /// Signals tampering, a lossy round-trip, or extraction from the wrong
    /// region; the cause is not distinguished here.
    #[error("integrity token mismatch")]
    IntegrityMismatch,

    /// The seal does not fit on the card at the requested placement.
    #[error("seal out of bounds: {seal_w}x{seal_h} seal at padding {padding} exceeds {card_w}x{card_h} card")]
    SealOutOfBounds {
        card_w: u32,
        card_h: u32,
        seal_w: u32,
        seal_h: u32,
        padding: u32,
    },

    /// The card cannot contain a seal region at the expected placement.
    #[error("seal not found: {0}")]
    SealNotFound(String),

    /// The image is not in a representation the codec accepts.
    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),
}

pub type Result<T> = std::result::Result<T, SigilError>;
