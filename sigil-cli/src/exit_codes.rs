//! Exit codes following sysexits.h conventions.
//!
//! These codes give scripts and kiosk integrations a stable way to tell
//! "card is invalid" apart from "card was not scanned correctly".

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (card invalid, tampered, or unsupported version).
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Cannot open or decode an input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write the output artifact).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Classify an error chain into an exit code.
pub fn from_anyhow(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(sigil) = cause.downcast_ref::<sigil_core::SigilError>() {
            use sigil_core::SigilError::*;
            return match sigil {
                IntegrityMismatch | UnsupportedVersion(_) | TruncatedPayload { .. }
                | MalformedPayload(_) => VERIFICATION_FAILED,
                SealNotFound(_) | UnsupportedImageFormat(_) => INPUT_ERROR,
                InsufficientCapacity { .. } | SealOutOfBounds { .. } => GENERAL_ERROR,
            };
        }
    }

    let message = format!("{err:#}");
    if message.contains("card is invalid") || message.contains("verification failed") {
        VERIFICATION_FAILED
    } else if message.contains("Failed to read") || message.contains("Failed to decode") {
        INPUT_ERROR
    } else if message.contains("Failed to write") {
        IO_ERROR
    } else {
        GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn sigil_errors_classified_by_variant() {
        let err = anyhow::Error::new(sigil_core::SigilError::IntegrityMismatch)
            .context("scan failed");
        assert_eq!(from_anyhow(&err), VERIFICATION_FAILED);

        let err = anyhow::Error::new(sigil_core::SigilError::SealNotFound("too small".into()));
        assert_eq!(from_anyhow(&err), INPUT_ERROR);
    }

    #[test]
    fn io_errors_classified_by_message() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = anyhow::Error::new(err).context("Failed to read card: card.png");
        assert_eq!(from_anyhow(&err), INPUT_ERROR);
    }
}
