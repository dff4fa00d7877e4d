use crate::codec::ArgScheme;
use thiserror::Error;

/// A codec rejected a value or a payload.
///
/// Malformed bytes and type mismatches are not transient; callers get the
/// failure back as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed {scheme} headers: {reason}")]
    Headers { scheme: ArgScheme, reason: String },

    #[error("failed to encode {scheme} body: {reason}")]
    Encode { scheme: ArgScheme, reason: String },

    #[error("failed to decode {scheme} body: {reason}")]
    Decode { scheme: ArgScheme, reason: String },
}
